//! Value types and token coercion.
//!
//! Every parameter carries one [`ValueType`]. The type decides how a raw token
//! becomes a [`Value`]: numbers are parsed, booleans accept a small fixed
//! vocabulary, file types open a stream and directory types can check that the
//! path exists. Configured defaults, consts and choices go through
//! [`ValueType::check`] instead, which leaves files unopened until they are used.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::{ParameterError, ParseResult};

/// How a file value is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    Read,
    Write,
}

impl FileMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
        }
    }
}

impl FromStr for FileMode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            other => Err(ParameterError::general(format!(
                "'{other}' is not a valid mode for file. Valid modes: 'r', 'w'"
            ))),
        }
    }
}

/// The closed set of value types a parameter may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
    /// Opens the token as a file; `-` maps to stdin/stdout.
    File(FileMode),
    /// Keeps the token as a path, optionally checking it is a directory.
    Dir { check: bool },
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::File(_) => "file",
            Self::Dir { .. } => "dir",
        }
    }

    /// Convert one token into a value of this type.
    ///
    /// The returned error is not scoped to a parameter; callers attach the
    /// parameter identity.
    pub fn coerce(&self, token: &str) -> ParseResult<Value> {
        match *self {
            Self::Str => Ok(Value::Str(token.to_string())),
            Self::Int => token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.mismatch(token)),
            Self::Float => token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.mismatch(token)),
            Self::Bool => parse_bool(token)
                .map(Value::Bool)
                .ok_or_else(|| self.mismatch(token)),
            Self::File(mode) => FileValue::open(token, mode).map(Value::File),
            Self::Dir { check } => {
                if check && !Path::new(token).is_dir() {
                    return Err(ParameterError::general(format!(
                        "{token} is not an actual directory"
                    )));
                }
                Ok(Value::Str(token.to_string()))
            }
        }
    }

    /// Like [`coerce`](Self::coerce), but file values are only checked, not
    /// opened. Used for configured defaults, consts and choices.
    pub fn check(&self, token: &str) -> ParseResult<Value> {
        match *self {
            Self::File(mode) => FileValue::unopened(token, mode).map(Value::File),
            _ => self.coerce(token),
        }
    }

    fn mismatch(&self, token: &str) -> ParameterError {
        ParameterError::general(format!("'{token}' is not {}", self.name()))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = ParameterError;

    /// File types default to read mode and directory types to no check; the
    /// schema layer refines both.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" | "string" => Ok(Self::Str),
            "int" | "integer" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "file" => Ok(Self::File(FileMode::Read)),
            "dir" | "directory" => Ok(Self::Dir { check: false }),
            other => Err(ParameterError::general(format!(
                "not valid type '{other}'. Valid types: str, int, float, bool, file, dir"
            ))),
        }
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Stream {
    Stdin,
    Stdout,
    File(Arc<File>),
    Pending,
}

/// A file parameter, opened when parsing hands it out.
///
/// Equality compares path and mode only.
#[derive(Debug, Clone)]
pub struct FileValue {
    path: String,
    mode: FileMode,
    stream: Stream,
}

impl FileValue {
    /// Open `path` in `mode`. The literal `-` selects stdin (read) or stdout
    /// (write).
    pub fn open(path: &str, mode: FileMode) -> ParseResult<Self> {
        let stream = if path == "-" {
            match mode {
                FileMode::Read => Stream::Stdin,
                FileMode::Write => Stream::Stdout,
            }
        } else {
            let file = match mode {
                FileMode::Read => File::open(path),
                FileMode::Write => OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path),
            }
            .map_err(|err| ParameterError::general(format!("cannot open '{path}': {err}")))?;
            Stream::File(Arc::new(file))
        };
        Ok(Self {
            path: path.to_string(),
            mode,
            stream,
        })
    }

    /// Check that `path` can be opened in `mode` without touching it: read
    /// mode needs an existing path, write mode an existing parent directory.
    pub fn unopened(path: &str, mode: FileMode) -> ParseResult<Self> {
        if path == "-" {
            return Self::open(path, mode);
        }
        let cannot =
            |reason: String| ParameterError::general(format!("cannot open '{path}': {reason}"));
        let target = Path::new(path);
        match mode {
            FileMode::Read => {
                fs::metadata(target).map_err(|err| cannot(err.to_string()))?;
            }
            FileMode::Write => {
                if target.is_dir() {
                    return Err(cannot("is a directory".to_string()));
                }
                let parent = match target.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => Path::new("."),
                };
                if !parent.is_dir() {
                    return Err(cannot("parent directory does not exist".to_string()));
                }
            }
        }
        Ok(Self {
            path: path.to_string(),
            mode,
            stream: Stream::Pending,
        })
    }

    /// This value with its stream open; a no-op for values already open.
    pub fn opened(&self) -> ParseResult<Self> {
        match self.stream {
            Stream::Pending => Self::open(&self.path, self.mode),
            _ => Ok(self.clone()),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.stream, Stream::Pending)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Whether this value is bound to stdin or stdout.
    pub fn is_std(&self) -> bool {
        matches!(self.stream, Stream::Stdin | Stream::Stdout)
    }

    pub fn reader(&self) -> io::Result<Box<dyn Read + '_>> {
        match &self.stream {
            Stream::Stdin => Ok(Box::new(io::stdin().lock())),
            Stream::File(file) if self.mode == FileMode::Read => Ok(Box::new(&**file)),
            _ => Err(io::Error::other(format!(
                "'{}' was not opened for reading",
                self.path
            ))),
        }
    }

    pub fn writer(&self) -> io::Result<Box<dyn Write + '_>> {
        match &self.stream {
            Stream::Stdout => Ok(Box::new(io::stdout().lock())),
            Stream::File(file) if self.mode == FileMode::Write => Ok(Box::new(&**file)),
            _ => Err(io::Error::other(format!(
                "'{}' was not opened for writing",
                self.path
            ))),
        }
    }
}

impl PartialEq for FileValue {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.mode == other.mode
    }
}

/// A single coerced value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    File(FileValue),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value ready to hand to a caller, with any file stream opened.
    pub(crate) fn opened(&self) -> ParseResult<Value> {
        match self {
            Self::File(file) => file.opened().map(Self::File),
            other => Ok(other.clone()),
        }
    }

    pub fn as_file(&self) -> Option<&FileValue> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::File(file) => f.write_str(file.path()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::File(file) => serializer.serialize_str(file.path()),
        }
    }
}

/// What a parameter stores: one value, or an ordered list of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedValue {
    Scalar(Value),
    List(Vec<Value>),
}

impl ParsedValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::List(_) => None,
        }
    }

    /// All values; a scalar is seen as a one-element slice.
    pub fn as_slice(&self) -> &[Value] {
        match self {
            Self::Scalar(v) => std::slice::from_ref(v),
            Self::List(values) => values.as_slice(),
        }
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::List(values) => write!(f, "{}", format_list(values)),
        }
    }
}

/// Render values as `[a, b, c]`.
pub(crate) fn format_list<T: fmt::Display>(items: &[T]) -> String {
    let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}
