//! Flat form parameters for CRM remote calls.
//!
//! The CRM expects nested structures flattened into bracketed paths,
//! e.g. `fields[PHONE][0][VALUE]=+7999...`. [`CrmParams`] keeps the
//! pairs in insertion order and serializes them with `reqwest`'s form
//! encoder.

use std::fmt;

use crate::domain::{ContactId, DealId};

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum CrmValue {
    /// Free text.
    Text(String),
    /// Unsigned integer (ids, type codes).
    Int(u64),
    /// Decimal number (areas, budgets).
    Number(f64),
}

impl fmt::Display for CrmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CrmValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CrmValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for CrmValue {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for CrmValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<ContactId> for CrmValue {
    fn from(id: ContactId) -> Self {
        Self::Int(id.get())
    }
}

impl From<DealId> for CrmValue {
    fn from(id: DealId) -> Self {
        Self::Int(id.get())
    }
}

/// Ordered set of form parameters for one remote call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrmParams {
    pairs: Vec<(String, String)>,
}

impl CrmParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level parameter, e.g. `id` or `entity_type`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<CrmValue>) -> Self {
        self.pairs.push((key.to_string(), value.into().to_string()));
        self
    }

    /// Adds a nested parameter under `root`: root `fields` with path
    /// `["A", "0"]` becomes `fields[A][0]`.
    #[must_use]
    pub fn with_path(mut self, root: &str, path: &[&str], value: impl Into<CrmValue>) -> Self {
        self.pairs
            .push((bracket_path(root, path), value.into().to_string()));
        self
    }

    /// Shorthand for a `fields[...]` parameter.
    #[must_use]
    pub fn field(self, name: &str, value: impl Into<CrmValue>) -> Self {
        self.with_path("fields", &[name], value)
    }

    /// Returns the encoded value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of `fields[name]`, if present.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.get(&bracket_path("fields", &[name]))
    }

    /// Key/value pairs in insertion order, ready for form encoding.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` when no parameter has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Joins `root` and `path` into bracket notation.
#[must_use]
pub fn bracket_path(root: &str, path: &[&str]) -> String {
    path.iter().fold(root.to_string(), |mut acc, segment| {
        acc.push('[');
        acc.push_str(segment);
        acc.push(']');
        acc
    })
}
