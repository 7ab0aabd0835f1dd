//! Publishing of verification results.

use crate::pact::PactSummary;
use crate::result::TestResult;
use chrono::Utc;
use tracing::{info, warn};

/// Publishes the final result of verifying a pact.
pub trait VerificationReporter: Send + Sync {
    /// Report `result` for `pact`. Returns `Ok(true)` when the result was
    /// published, or the errors the publisher ran into.
    fn report_results(
        &self,
        pact: &PactSummary,
        result: &TestResult,
        provider_version: &str,
        tags: &[String],
        branch: Option<&str>,
    ) -> Result<bool, Vec<String>>;
}

/// Writes verification results to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter;

impl VerificationReporter for LoggingReporter {
    fn report_results(
        &self,
        pact: &PactSummary,
        result: &TestResult,
        provider_version: &str,
        tags: &[String],
        branch: Option<&str>,
    ) -> Result<bool, Vec<String>> {
        let verified_at = Utc::now().to_rfc3339();
        match result {
            TestResult::Ok { interaction_ids } => info!(
                consumer = %pact.consumer,
                provider = %pact.provider,
                provider_version,
                ?tags,
                ?branch,
                %verified_at,
                "Verification passed for {} interaction(s)",
                interaction_ids.len()
            ),
            TestResult::Failed { failures, .. } => {
                warn!(
                    consumer = %pact.consumer,
                    provider = %pact.provider,
                    provider_version,
                    ?tags,
                    ?branch,
                    %verified_at,
                    "Verification failed: {}",
                    result.description()
                );
                for failure in failures {
                    warn!(
                        "    {} {}: {}",
                        failure.interaction_id.as_deref().unwrap_or("-"),
                        failure.path,
                        failure.message
                    );
                }
            }
        }
        Ok(true)
    }
}
