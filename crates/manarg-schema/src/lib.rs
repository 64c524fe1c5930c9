//! JSON data model for declaring a whole parser.
//!
//! A schema lists program settings, parameters and constraints. The data
//! types here mirror the `manarg` registration API one to one, so that a
//! parser can be described in a file and built without writing Rust:
//! - `ParserSchema::from_json` reads a schema
//! - `ParserSchema::build` registers everything and returns a `manarg::Parser`

use manarg::{
    Action, Arity, DefaultValue, FileMode, Options, ParameterError, ParseResult, Parser,
    ParserSettings, ValueType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParserSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_true")]
    pub add_help: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incompatibilities: Vec<IncompatibilitySchema>,
}

impl Default for ParserSchema {
    fn default() -> Self {
        Self {
            prog: None,
            short_description: None,
            description: None,
            bugs: None,
            epilog: None,
            version: None,
            add_help: true,
            parameters: Vec::new(),
            dependencies: Vec::new(),
            incompatibilities: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterSchema {
    /// `-x`
    pub short: String,
    /// `--name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// `str`, `int`, `float`, `bool`, `file` or `dir`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// File open mode for `file`: `r` or `w`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Require an existing directory for `dir`.
    #[serde(default)]
    pub check: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<Nargs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(default)]
    pub suppress_default: bool,
    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

/// `nargs` as a count or one of `+`, `*`, `?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nargs {
    Count(usize),
    Symbol(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct DependencySchema {
    pub params: Vec<String>,
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct IncompatibilitySchema {
    pub params: Vec<String>,
    pub excludes: Vec<String>,
}

impl ParserSchema {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn settings(&self) -> ParserSettings {
        ParserSettings {
            prog: self.prog.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
            bugs: self.bugs.clone(),
            epilog: self.epilog.clone(),
            add_help: self.add_help,
            version: self.version.clone(),
        }
    }

    /// Register every parameter and constraint, in file order.
    pub fn build(&self) -> ParseResult<Parser> {
        let mut parser = Parser::new(self.settings());
        for param in &self.parameters {
            parser.add_parameter(&param.short, param.long.as_deref(), param.options()?)?;
        }
        for dep in &self.dependencies {
            parser.dependency_params(&dep.params, &dep.requires)?;
        }
        for inc in &self.incompatibilities {
            parser.incompatible_params(&inc.params, &inc.excludes)?;
        }
        Ok(parser)
    }
}

impl ParameterSchema {
    /// Translate the textual fields into registration options.
    ///
    /// Errors name the parameter by its short flag.
    pub fn options(&self) -> ParseResult<Options> {
        let name = self.short.trim_start_matches('-').to_string();
        let scoped = |err: ParameterError| err.with_parameter(name.as_str());

        let value_type = match self.value_type.as_deref() {
            None => ValueType::Str,
            Some(raw) => match raw.parse::<ValueType>().map_err(scoped)? {
                ValueType::File(_) => {
                    let mode = self.mode.as_deref().unwrap_or("r");
                    ValueType::File(mode.parse::<FileMode>().map_err(scoped)?)
                }
                ValueType::Dir { .. } => ValueType::Dir { check: self.check },
                other => other,
            },
        };

        let action = self
            .action
            .as_deref()
            .map(str::parse::<Action>)
            .transpose()
            .map_err(scoped)?
            .unwrap_or_default();

        let arity = match &self.nargs {
            None => None,
            Some(Nargs::Count(n)) => Some(Arity::Exactly(*n)),
            Some(Nargs::Symbol(s)) => Some(s.parse::<Arity>().map_err(scoped)?),
        };

        let default = if self.suppress_default {
            DefaultValue::Suppressed
        } else {
            match &self.default {
                None => DefaultValue::Unset,
                Some(v) => DefaultValue::Value(scalar_text(v, "default").map_err(scoped)?),
            }
        };

        let const_value = self
            .const_value
            .as_ref()
            .map(|v| scalar_text(v, "const"))
            .transpose()
            .map_err(scoped)?;

        let choices = self
            .choices
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(|v| scalar_text(v, "choices"))
                    .collect::<ParseResult<Vec<_>>>()
            })
            .transpose()
            .map_err(scoped)?;

        Ok(Options {
            dest: self.dest.clone(),
            value_type,
            action,
            arity,
            default,
            const_value,
            choices,
            required: self.required,
            section: self.section.clone(),
            help: self.help.clone(),
            hidden: self.hidden,
        })
    }
}

/// Text form of a scalar JSON value, as it would appear on the command line.
fn scalar_text(value: &JsonValue, field: &str) -> ParseResult<String> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        other => Err(ParameterError::general(format!(
            "{field} value '{other}' must be a string, number or boolean"
        ))),
    }
}
