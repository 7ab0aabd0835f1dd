//! Mismatch records produced by a comparison.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single divergence between expected and actual content at one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub actual: Option<Value>,
    #[serde(rename = "mismatch")]
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diff: Option<String>,
}

impl Mismatch {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expected: None,
            actual: None,
            message: message.into(),
            path: path.into(),
            diff: None,
        }
    }

    pub fn with_expected(mut self, expected: Value) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_actual(mut self, actual: Value) -> Self {
        self.actual = Some(actual);
        self
    }

    pub fn with_values(self, expected: &Value, actual: &Value) -> Self {
        self.with_expected(expected.clone())
            .with_actual(actual.clone())
    }

    pub fn with_diff(mut self, diff: Option<String>) -> Self {
        self.diff = diff;
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The mismatches recorded at one path. An empty list means the path was
/// checked and matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyItemMatchResult {
    #[serde(rename = "path")]
    pub key: String,
    #[serde(rename = "mismatches")]
    pub result: Vec<Mismatch>,
}

impl BodyItemMatchResult {
    pub fn new(key: impl Into<String>, result: Vec<Mismatch>) -> Self {
        Self {
            key: key.into(),
            result,
        }
    }

    /// A pass record for a path that was checked.
    pub fn passed(key: impl Into<String>) -> Self {
        Self::new(key, Vec::new())
    }

    pub fn matched(&self) -> bool {
        self.result.is_empty()
    }
}

/// Root aggregate of a body comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyMatchResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub type_mismatch: Option<Mismatch>,
    pub body_results: Vec<BodyItemMatchResult>,
}

impl BodyMatchResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn from_results(body_results: Vec<BodyItemMatchResult>) -> Self {
        Self {
            type_mismatch: None,
            body_results,
        }
    }

    /// A result holding one mismatch at the root path.
    pub fn root_mismatch(mismatch: Mismatch) -> Self {
        Self::from_results(vec![BodyItemMatchResult::new("$", vec![mismatch])])
    }

    pub fn content_type_mismatch(mismatch: Mismatch) -> Self {
        Self {
            type_mismatch: Some(mismatch),
            body_results: Vec::new(),
        }
    }

    pub fn matched(&self) -> bool {
        self.type_mismatch.is_none() && self.body_results.iter().all(|item| item.matched())
    }

    pub fn all_mismatches(&self) -> Vec<Mismatch> {
        self.type_mismatch
            .iter()
            .cloned()
            .chain(
                self.body_results
                    .iter()
                    .flat_map(|item| item.result.iter().cloned()),
            )
            .collect()
    }

    pub fn mismatch_count(&self) -> usize {
        usize::from(self.type_mismatch.is_some())
            + self
                .body_results
                .iter()
                .map(|item| item.result.len())
                .sum::<usize>()
    }

    /// Only the paths that recorded mismatches.
    pub fn failures(&self) -> impl Iterator<Item = &BodyItemMatchResult> {
        self.body_results.iter().filter(|item| !item.matched())
    }
}
