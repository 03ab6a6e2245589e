use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Execution times per method, keyed in first-seen order.
///
/// Each value sequence lines up positionally with the configured categories.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionTimes(IndexMap<String, Vec<i64>>);

/// A method whose value count did not match the category count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthMismatch {
    pub method: String,
    pub found: usize,
    pub expected: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has {} values instead of {}",
            self.method, self.found, self.expected
        )
    }
}

impl ExecutionTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated method keeps its original position, only the values are replaced.
    pub(crate) fn insert(&mut self, method: impl Into<String>, times: Vec<i64>) {
        self.0.insert(method.into(), times);
    }

    pub fn get(&self, method: &str) -> Option<&[i64]> {
        self.0.get(method).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Right-pads (or truncates) every value sequence to `expected` entries.
    ///
    /// Returns the adjusted copy along with one [`LengthMismatch`] per method that had to change.
    pub fn normalize(&self, expected: usize) -> (Self, Vec<LengthMismatch>) {
        let mut mismatches = Vec::new();
        let normalized = self
            .0
            .iter()
            .map(|(method, values)| {
                let mut values = values.clone();
                if values.len() != expected {
                    mismatches.push(LengthMismatch {
                        method: method.clone(),
                        found: values.len(),
                        expected,
                    });
                    fit_values(&mut values, expected);
                }
                (method.clone(), values)
            })
            .collect();
        (Self(normalized), mismatches)
    }
}

impl FromIterator<(String, Vec<i64>)> for ExecutionTimes {
    fn from_iter<T: IntoIterator<Item = (String, Vec<i64>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub(crate) fn fit_values(values: &mut Vec<i64>, expected: usize) {
    values.resize(expected, 0);
}
