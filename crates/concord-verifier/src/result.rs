//! Verification outcomes and the "worse result wins" merge.

use concord_matching::BodyMatchResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One failed check, attributed to an interaction when known.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
    pub path: String,
    pub message: String,
}

impl VerificationFailure {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            interaction_id: None,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn for_interaction(mut self, interaction_id: impl Into<String>) -> Self {
        self.interaction_id = Some(interaction_id.into());
        self
    }
}

/// Accumulated result for one or more interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum TestResult {
    /// Interactions that verified successfully
    Ok { interaction_ids: BTreeSet<String> },
    Failed {
        /// Sorted, without duplicates
        failures: Vec<VerificationFailure>,
        descriptions: BTreeSet<String>,
    },
}

impl Default for TestResult {
    fn default() -> Self {
        TestResult::Ok {
            interaction_ids: BTreeSet::new(),
        }
    }
}

impl TestResult {
    pub fn ok(interaction_id: Option<&str>) -> Self {
        TestResult::Ok {
            interaction_ids: interaction_id.map(str::to_string).into_iter().collect(),
        }
    }

    pub fn failed(failures: Vec<VerificationFailure>, description: impl Into<String>) -> Self {
        let mut failures = failures;
        failures.sort();
        failures.dedup();
        let description = description.into();
        TestResult::Failed {
            failures,
            descriptions: Some(description).filter(|d| !d.is_empty()).into_iter().collect(),
        }
    }

    /// Convert a body comparison for `interaction_id` into a test result.
    pub fn from_body_result(interaction_id: &str, result: &BodyMatchResult) -> Self {
        if result.matched() {
            return Self::ok(Some(interaction_id));
        }
        let failures = result
            .all_mismatches()
            .into_iter()
            .map(|m| VerificationFailure::new(m.path, m.message).for_interaction(interaction_id))
            .collect();
        Self::failed(failures, "Body mismatches")
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TestResult::Ok { .. })
    }

    /// Descriptions joined in sorted order.
    pub fn description(&self) -> String {
        match self {
            TestResult::Ok { .. } => String::new(),
            TestResult::Failed { descriptions, .. } => descriptions.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }

    /// Combine two results. The worse result wins.
    pub fn merge(self, other: TestResult) -> TestResult {
        match (self, other) {
            (TestResult::Ok { mut interaction_ids }, TestResult::Ok { interaction_ids: more }) => {
                interaction_ids.extend(more);
                TestResult::Ok { interaction_ids }
            }
            (failed @ TestResult::Failed { .. }, TestResult::Ok { .. })
            | (TestResult::Ok { .. }, failed @ TestResult::Failed { .. }) => failed,
            (
                TestResult::Failed {
                    mut failures,
                    mut descriptions,
                },
                TestResult::Failed {
                    failures: more_failures,
                    descriptions: more_descriptions,
                },
            ) => {
                failures.extend(more_failures);
                failures.sort();
                failures.dedup();
                descriptions.extend(more_descriptions);
                TestResult::Failed { failures, descriptions }
            }
        }
    }
}

/// The outcome of verifying one aspect of an interaction, as produced by a
/// provider test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Ok {
        interaction_id: Option<String>,
    },
    Failed {
        description: String,
        interaction_id: Option<String>,
        failures: Vec<VerificationFailure>,
    },
}

impl VerificationResult {
    pub fn to_test_result(&self) -> TestResult {
        match self {
            VerificationResult::Ok { interaction_id } => TestResult::ok(interaction_id.as_deref()),
            VerificationResult::Failed {
                description,
                interaction_id,
                failures,
            } => {
                let failures = failures
                    .iter()
                    .cloned()
                    .map(|failure| match (&failure.interaction_id, interaction_id) {
                        (None, Some(id)) => failure.for_interaction(id.clone()),
                        _ => failure,
                    })
                    .collect();
                TestResult::failed(failures, description.clone())
            }
        }
    }
}
