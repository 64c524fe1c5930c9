//! Ordered store of registered parameters.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{ParameterError, ParseResult};
use crate::matcher::{long_name, short_name};
use crate::spec::{Options, ParameterSpec};

/// Registered parameters in insertion order, with lookups by short and long
/// name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    params: Vec<ParameterSpec>,
    by_short: IndexMap<char, usize>,
    by_long: IndexMap<String, usize>,
    dests: IndexSet<String>,
}

impl Registry {
    /// Validate and append a parameter.
    ///
    /// `short` must be `-x`; `long`, when given, must follow the long flag
    /// grammar. Short name, long name and dest must all be unused.
    pub fn register(
        &mut self,
        short: &str,
        long: Option<&str>,
        mut options: Options,
    ) -> ParseResult<&ParameterSpec> {
        let short_char = short_name(short).ok_or_else(|| {
            ParameterError::general(format!("'{short}' is not valid as short command"))
        })?;
        if self.by_short.contains_key(&short_char) {
            return Err(ParameterError::general(format!(
                "'{short_char}' duplicated as short command"
            )));
        }

        let long = match long {
            None => None,
            Some(raw) => {
                let name = long_name(raw).ok_or_else(|| {
                    ParameterError::general(format!("'{raw}' is not valid as long command"))
                })?;
                if self.by_long.contains_key(name) {
                    return Err(ParameterError::general(format!(
                        "'{name}' duplicated as long command"
                    )));
                }
                Some(name.to_string())
            }
        };

        let dest = options
            .dest
            .take()
            .or_else(|| long.clone())
            .unwrap_or_else(|| short_char.to_string());
        if self.dests.contains(&dest) {
            return Err(ParameterError::general(format!("'{dest}' duplicated as dest")));
        }

        let spec = ParameterSpec::build(short_char, long, dest, options)?;
        debug!(
            short = %spec.short_flag(),
            dest = spec.dest(),
            arity = %spec.arity(),
            "registered parameter"
        );
        Ok(self.insert(spec))
    }

    pub(crate) fn insert(&mut self, spec: ParameterSpec) -> &ParameterSpec {
        let idx = self.params.len();
        self.by_short.insert(spec.short(), idx);
        if let Some(long) = spec.long() {
            self.by_long.insert(long.to_string(), idx);
        }
        self.dests.insert(spec.dest().to_string());
        self.params.push(spec);
        &self.params[idx]
    }

    pub fn by_short(&self, short: char) -> Option<&ParameterSpec> {
        self.by_short.get(&short).map(|&idx| &self.params[idx])
    }

    pub fn by_long(&self, long: &str) -> Option<&ParameterSpec> {
        self.by_long.get(long).map(|&idx| &self.params[idx])
    }

    /// Look up `-x` or `--name`.
    pub fn by_flag(&self, flag: &str) -> Option<&ParameterSpec> {
        if let Some(c) = short_name(flag) {
            return self.by_short(c);
        }
        long_name(flag).and_then(|name| self.by_long(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterSpec> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ParameterSpec;
    type IntoIter = std::slice::Iter<'a, ParameterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
