//! The result set produced by one parse.

use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::{FileValue, ParsedValue, Value};

/// Where a stored value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Supplied on the command line.
    Explicit,
    /// Filled from the parameter default after the scan.
    Defaulted,
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    value: ParsedValue,
    origin: Origin,
}

/// Parsed values keyed by dest, in the order they were written.
///
/// A dest that is not present was neither supplied nor defaulted (its default
/// was unset or suppressed).
#[derive(Debug, Clone, Default)]
pub struct Matches {
    values: IndexMap<String, Slot>,
    resolved: IndexSet<char>,
}

impl Matches {
    pub fn get(&self, dest: &str) -> Option<&ParsedValue> {
        self.values.get(dest).map(|slot| &slot.value)
    }

    /// The value of a single-value dest.
    pub fn value(&self, dest: &str) -> Option<&Value> {
        self.get(dest).and_then(ParsedValue::as_scalar)
    }

    /// All values of a dest; a scalar is returned as a one-element slice.
    pub fn values(&self, dest: &str) -> Option<&[Value]> {
        self.get(dest).map(ParsedValue::as_slice)
    }

    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.value(dest).and_then(Value::as_str)
    }

    pub fn get_int(&self, dest: &str) -> Option<i64> {
        self.value(dest).and_then(Value::as_int)
    }

    pub fn get_float(&self, dest: &str) -> Option<f64> {
        self.value(dest).and_then(Value::as_float)
    }

    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.value(dest).and_then(Value::as_bool)
    }

    pub fn get_file(&self, dest: &str) -> Option<&FileValue> {
        self.value(dest).and_then(Value::as_file)
    }

    /// Integer list values; `None` if absent or any value is not an integer.
    pub fn get_ints(&self, dest: &str) -> Option<Vec<i64>> {
        self.values(dest)?.iter().map(Value::as_int).collect()
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    pub fn origin(&self, dest: &str) -> Option<Origin> {
        self.values.get(dest).map(|slot| slot.origin)
    }

    pub fn is_explicit(&self, dest: &str) -> bool {
        self.origin(dest) == Some(Origin::Explicit)
    }

    pub fn is_defaulted(&self, dest: &str) -> bool {
        self.origin(dest) == Some(Origin::Defaulted)
    }

    /// Whether the parameter with this short name was named on the command
    /// line.
    pub fn was_resolved(&self, short: char) -> bool {
        self.resolved.contains(&short)
    }

    /// Short names resolved during the parse, in order of first appearance.
    pub fn resolved(&self) -> impl Iterator<Item = char> + '_ {
        self.resolved.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParsedValue)> {
        self.values.iter().map(|(k, slot)| (k.as_str(), &slot.value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Matches {
    pub(crate) fn push_explicit(&mut self, dest: &str, value: ParsedValue) {
        self.values.insert(
            dest.to_string(),
            Slot {
                value,
                origin: Origin::Explicit,
            },
        );
    }

    pub(crate) fn push_default(&mut self, dest: &str, value: ParsedValue) {
        self.values.entry(dest.to_string()).or_insert(Slot {
            value,
            origin: Origin::Defaulted,
        });
    }

    pub(crate) fn push_resolved(&mut self, short: char) {
        self.resolved.insert(short);
    }
}

impl Serialize for Matches {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (dest, slot) in &self.values {
            map.serialize_entry(dest, &slot.value)?;
        }
        map.end()
    }
}
