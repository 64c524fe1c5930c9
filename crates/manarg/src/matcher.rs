//! Flag grammar and token resolution.
//!
//! Short flags are `-` plus one ASCII letter and may be bundled (`-abc`).
//! Long flags are `--` plus at least two characters, starting and ending with
//! a letter, with letters or underscores in between. Nothing else is a flag:
//! there is no `--flag=value` form and no abbreviation.

use crate::error::{ParameterError, ParseResult};
use crate::registry::Registry;
use crate::spec::ParameterSpec;

/// `-x` => `x`
pub fn short_name(token: &str) -> Option<char> {
    let mut chars = token.strip_prefix('-')?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}

/// `--name` => `name`
pub fn long_name(token: &str) -> Option<&str> {
    let name = token.strip_prefix("--")?;
    let bytes = name.as_bytes();
    let (first, last) = (bytes.first()?, bytes.last()?);
    if bytes.len() < 2 || !first.is_ascii_alphabetic() || !last.is_ascii_alphabetic() {
        return None;
    }
    if bytes.iter().all(|b| b.is_ascii_alphabetic() || *b == b'_') {
        Some(name)
    } else {
        None
    }
}

/// `-abc` => `abc`
pub fn short_bundle(token: &str) -> Option<&str> {
    let letters = token.strip_prefix('-')?;
    if !letters.is_empty() && letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(letters)
    } else {
        None
    }
}

/// Resolve one token to the parameters it names, in order.
pub fn resolve<'r>(registry: &'r Registry, token: &str) -> ParseResult<Vec<&'r ParameterSpec>> {
    if let Some(letters) = short_bundle(token) {
        return letters
            .chars()
            .map(|c| {
                registry.by_short(c).ok_or_else(|| {
                    ParameterError::general(format!("'-{c}' not a valid parameter"))
                })
            })
            .collect();
    }

    if let Some(name) = long_name(token) {
        return registry
            .by_long(name)
            .map(|spec| vec![spec])
            .ok_or_else(|| ParameterError::general(format!("'{token}' not a valid parameter")));
    }

    Err(ParameterError::general(format!(
        "'{token}' not a valid parameter format"
    )))
}
