//! Arity-driven value consumption.
//!
//! Given a resolved parameter and the position of the last token already
//! consumed, decide how many of the following tokens belong to it, coerce
//! them, check choices and store the result.

use tracing::trace;

use crate::error::{ParameterError, ParseResult};
use crate::matches::Matches;
use crate::spec::{Action, Arity, ParameterSpec};
use crate::value::{ParsedValue, Value, format_list};

/// What the scanner should do after a parameter has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Tokens used, counting the flag itself.
    Consumed(usize),
    Help,
    Version,
}

/// Whether `token` may be taken as a value rather than the next flag.
///
/// Any integer literal counts, whatever its magnitude, so `-5` is a value.
/// Other dash-prefixed tokens, negative floats and a lone `-` included, are
/// not.
pub fn is_candidate_value(token: &str) -> bool {
    is_integer_literal(token) || !token.starts_with('-')
}

fn is_integer_literal(token: &str) -> bool {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn consume<S: AsRef<str>>(
    spec: &ParameterSpec,
    tokens: &[S],
    cursor: usize,
    matches: &mut Matches,
) -> ParseResult<Step> {
    match spec.action() {
        Action::Help => return Ok(Step::Help),
        Action::Version => return Ok(Step::Version),
        _ => {}
    }

    if matches.contains(spec.dest()) {
        return Err(ParameterError::parameter(
            spec.name(),
            "passed more than one time",
        ));
    }

    match spec.action() {
        Action::StoreTrue => {
            matches.push_explicit(spec.dest(), ParsedValue::Scalar(Value::Bool(true)));
            return Ok(Step::Consumed(1));
        }
        Action::StoreFalse => {
            matches.push_explicit(spec.dest(), ParsedValue::Scalar(Value::Bool(false)));
            return Ok(Step::Consumed(1));
        }
        _ => {}
    }

    let rest: Vec<&str> = tokens
        .get(cursor + 1..)
        .unwrap_or_default()
        .iter()
        .map(AsRef::as_ref)
        .collect();

    let (value, taken) = match spec.arity() {
        Arity::Exactly(n) => {
            if rest.len() < n {
                return Err(ParameterError::parameter(
                    spec.name(),
                    format!("needs {n} values"),
                ));
            }
            let mut values = rest[..n]
                .iter()
                .map(|token| accept(spec, token))
                .collect::<ParseResult<Vec<_>>>()?;
            let value = if spec.arity_is_default() && values.len() == 1 {
                ParsedValue::Scalar(values.remove(0))
            } else {
                ParsedValue::List(values)
            };
            (value, n)
        }
        Arity::Optional => match rest.first().filter(|token| is_candidate_value(token)) {
            Some(token) => (ParsedValue::Scalar(accept(spec, token)?), 1),
            None => {
                let Some(value) = spec.const_value() else {
                    return Err(ParameterError::parameter(
                        spec.name(),
                        "const value not set for nargs '?'",
                    ));
                };
                check_choices(spec, value)?;
                let value = value
                    .opened()
                    .map_err(|err| err.with_parameter(spec.name()))?;
                (ParsedValue::Scalar(value), 0)
            }
        },
        arity @ (Arity::OneOrMore | Arity::ZeroOrMore) => {
            let candidates: Vec<&str> = rest
                .iter()
                .copied()
                .take_while(|token| is_candidate_value(token))
                .collect();
            if arity == Arity::OneOrMore && candidates.is_empty() {
                return Err(ParameterError::parameter(
                    spec.name(),
                    "need at least one value",
                ));
            }
            let values = candidates
                .iter()
                .map(|token| accept(spec, token))
                .collect::<ParseResult<Vec<_>>>()?;
            (ParsedValue::List(values), candidates.len())
        }
    };

    trace!(dest = spec.dest(), value = %value, taken, "stored value");
    matches.push_explicit(spec.dest(), value);
    Ok(Step::Consumed(taken + 1))
}

/// Validate, coerce and choice-check one token.
fn accept(spec: &ParameterSpec, token: &str) -> ParseResult<Value> {
    if !is_candidate_value(token) {
        return Err(ParameterError::parameter(
            spec.name(),
            format!("'{token}' is not a valid value"),
        ));
    }
    let value = spec
        .value_type()
        .coerce(token)
        .map_err(|err| err.with_parameter(spec.name()))?;
    check_choices(spec, &value)?;
    Ok(value)
}

fn check_choices(spec: &ParameterSpec, value: &Value) -> ParseResult<()> {
    match spec.choices() {
        Some(choices) if !choices.contains(value) => Err(ParameterError::parameter(
            spec.name(),
            format!("'{value}' not in choices {}", format_list(choices)),
        )),
        _ => Ok(()),
    }
}
