//! The error type shared by registration, constraint declaration and parsing.

use thiserror::Error;

/// Exit status used when parsing or configuration fails.
pub const EXIT_ERROR: i32 = 2;

/// Any failure raised while configuring a parser or parsing tokens.
///
/// Errors optionally name the parameter (its short name) they relate to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("{message}")]
    General { message: String },
    #[error("parameter {parameter}: {message}")]
    Parameter { parameter: String, message: String },
}

impl ParameterError {
    pub fn general(message: impl Into<String>) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    pub fn parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::General { message } | Self::Parameter { message, .. } => message.as_str(),
        }
    }

    /// Short name of the parameter this error is scoped to, if any.
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::General { .. } => None,
            Self::Parameter { parameter, .. } => Some(parameter.as_str()),
        }
    }

    /// Attach `parameter` unless the error already names one.
    pub fn with_parameter(self, parameter: impl Into<String>) -> Self {
        match self {
            Self::General { message } => Self::Parameter {
                parameter: parameter.into(),
                message,
            },
            scoped => scoped,
        }
    }

    pub fn exit_code(&self) -> i32 {
        EXIT_ERROR
    }
}

pub type ParseResult<T> = Result<T, ParameterError>;
