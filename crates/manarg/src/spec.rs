//! Parameter specifications.
//!
//! [`Options`] is what callers hand to the registry; [`ParameterSpec`] is the
//! validated form with every default, const and choice already coerced. File
//! values among them are checked but not opened until a parse uses them.

use std::fmt;
use std::str::FromStr;

use crate::error::{ParameterError, ParseResult};
use crate::value::{ParsedValue, Value, ValueType};

pub const DEFAULT_SECTION: &str = "Others";
pub const REQUIRED_SECTION: &str = "Required";

/// What happens when a parameter is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Store,
    StoreTrue,
    StoreFalse,
    Help,
    Version,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::StoreTrue => "store_true",
            Self::StoreFalse => "store_false",
            Self::Help => "help",
            Self::Version => "version",
        }
    }

    fn is_flag(self) -> bool {
        matches!(self, Self::StoreTrue | Self::StoreFalse)
    }
}

impl FromStr for Action {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Self::Store),
            "store_true" | "store-true" => Ok(Self::StoreTrue),
            "store_false" | "store-false" => Ok(Self::StoreFalse),
            "help" => Ok(Self::Help),
            "version" => Ok(Self::Version),
            other => Err(ParameterError::general(format!(
                "not valid action '{other}'. Valid actions: store, store_true, store_false, help, version"
            ))),
        }
    }
}

/// How many tokens a parameter consumes after its flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `N` tokens (`nargs=N`).
    Exactly(usize),
    /// `+`
    OneOrMore,
    /// `*`
    ZeroOrMore,
    /// `?`: one token if present, otherwise the const value.
    Optional,
}

impl Default for Arity {
    fn default() -> Self {
        Self::Exactly(1)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::OneOrMore => f.write_str("+"),
            Self::ZeroOrMore => f.write_str("*"),
            Self::Optional => f.write_str("?"),
        }
    }
}

impl FromStr for Arity {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::OneOrMore),
            "*" => Ok(Self::ZeroOrMore),
            "?" => Ok(Self::Optional),
            n => n
                .parse::<usize>()
                .map(Self::Exactly)
                .map_err(|_| ParameterError::general("not valid value for nargs")),
        }
    }
}

/// A parameter default in one of its three states.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue<T = String> {
    /// No default; the dest stays absent when not supplied.
    Unset,
    /// Never auto-fill the dest.
    Suppressed,
    Value(T),
}

impl<T> Default for DefaultValue<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> DefaultValue<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for DefaultValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("none"),
            Self::Suppressed => f.write_str("suppressed"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Caller-supplied settings for one parameter.
///
/// Defaults, const and choices are given as text and coerced through
/// `value_type` at registration.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub dest: Option<String>,
    pub value_type: ValueType,
    pub action: Action,
    /// `None` means one value stored as a scalar.
    pub arity: Option<Arity>,
    pub default: DefaultValue,
    pub const_value: Option<String>,
    pub choices: Option<Vec<String>>,
    pub required: bool,
    pub section: Option<String>,
    pub help: Option<String>,
    /// Leave the parameter out of rendered help.
    pub hidden: bool,
}

/// A registered, validated parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    short: char,
    long: Option<String>,
    dest: String,
    value_type: ValueType,
    action: Action,
    arity: Arity,
    arity_is_default: bool,
    default: DefaultValue<Value>,
    const_value: Option<Value>,
    choices: Option<Vec<Value>>,
    required: bool,
    section: String,
    help: String,
    hidden: bool,
}

impl ParameterSpec {
    pub(crate) fn build(
        short: char,
        long: Option<String>,
        dest: String,
        options: Options,
    ) -> ParseResult<Self> {
        let name = short.to_string();
        let value_type = options.value_type;
        let action = options.action;

        let section = if options.required {
            REQUIRED_SECTION.to_string()
        } else {
            options
                .section
                .unwrap_or_else(|| DEFAULT_SECTION.to_string())
        };

        let default = match action {
            Action::StoreTrue => DefaultValue::Value(Value::Bool(false)),
            Action::StoreFalse => DefaultValue::Value(Value::Bool(true)),
            _ => match options.default {
                DefaultValue::Unset => DefaultValue::Unset,
                DefaultValue::Suppressed => DefaultValue::Suppressed,
                DefaultValue::Value(raw) => {
                    DefaultValue::Value(configured(value_type, &raw, "default value", &name)?)
                }
            },
        };

        let const_value = options
            .const_value
            .map(|raw| configured(value_type, &raw, "const value", &name))
            .transpose()?;

        let choices = match options.choices {
            None => None,
            Some(raw) if raw.is_empty() => {
                return Err(ParameterError::parameter(&name, "choices must not be empty"));
            }
            Some(raw) => Some(
                raw.iter()
                    .map(|choice| configured(value_type, choice, "choice", &name))
                    .collect::<ParseResult<Vec<_>>>()?,
            ),
        };

        let arity_is_default = options.arity.is_none();
        let arity = if action.is_flag() || matches!(action, Action::Help | Action::Version) {
            Arity::Exactly(0)
        } else {
            options.arity.unwrap_or_default()
        };

        if arity == Arity::Optional {
            if default.is_unset() {
                return Err(ParameterError::parameter(
                    &name,
                    "default value not set for nargs '?'",
                ));
            }
            if const_value.is_none() {
                return Err(ParameterError::parameter(
                    &name,
                    "const value not set for nargs '?'",
                ));
            }
        }

        Ok(Self {
            short,
            long,
            dest,
            value_type,
            action,
            arity,
            arity_is_default,
            default,
            const_value,
            choices,
            required: options.required,
            section,
            help: options.help.unwrap_or_default(),
            hidden: options.hidden,
        })
    }

    /// The auto-registered `-h/--help` and `-V/--version` parameters.
    pub(crate) fn builtin(short: char, long: &str, action: Action, help: &str) -> Self {
        Self {
            short,
            long: Some(long.to_string()),
            dest: long.to_string(),
            value_type: ValueType::Str,
            action,
            arity: Arity::Exactly(0),
            arity_is_default: false,
            default: DefaultValue::Suppressed,
            const_value: None,
            choices: None,
            required: false,
            section: DEFAULT_SECTION.to_string(),
            help: help.to_string(),
            hidden: false,
        }
    }

    pub fn short(&self) -> char {
        self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Identity used in error messages (the short name without the dash).
    pub fn name(&self) -> String {
        self.short.to_string()
    }

    /// `-x`
    pub fn short_flag(&self) -> String {
        format!("-{}", self.short)
    }

    /// `--long`
    pub fn long_flag(&self) -> Option<String> {
        self.long.as_ref().map(|l| format!("--{l}"))
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Whether the caller left arity unspecified (single value, scalar).
    pub fn arity_is_default(&self) -> bool {
        self.arity_is_default
    }

    pub fn default_value(&self) -> &DefaultValue<Value> {
        &self.default
    }

    pub fn const_value(&self) -> Option<&Value> {
        self.const_value.as_ref()
    }

    pub fn choices(&self) -> Option<&[Value]> {
        self.choices.as_deref()
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// The default as it is written into a result set, with file defaults
    /// opened.
    pub(crate) fn default_entry(&self) -> ParseResult<Option<ParsedValue>> {
        self.default
            .value()
            .map(|value| {
                value
                    .opened()
                    .map(ParsedValue::Scalar)
                    .map_err(|err| err.with_parameter(self.name()))
            })
            .transpose()
    }
}

/// Check a configured default, const or choice. File and directory failures
/// keep their own message.
fn configured(value_type: ValueType, raw: &str, what: &str, name: &str) -> ParseResult<Value> {
    value_type.check(raw).map_err(|err| match value_type {
        ValueType::File(_) | ValueType::Dir { .. } => err.with_parameter(name),
        _ => ParameterError::parameter(name, format!("{what} '{raw}' is not {value_type}")),
    })
}
