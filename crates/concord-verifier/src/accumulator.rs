//! Accumulation of per-interaction results until a pact is fully verified.
//!
//! Results are keyed by a hash of the pact (consumer, provider and broker
//! URL) and then by a hash of the interaction (description and provider
//! state names). Once every interaction of a pact has a result, the merged
//! result is handed to the [`VerificationReporter`] and the entry is removed.

use crate::config::{VerifierConfig, ENV_PUBLISH_RESULTS};
use crate::pact::{InteractionSummary, PactSource, PactSummary};
use crate::reporter::VerificationReporter;
use crate::result::{TestResult, VerificationResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};

type InteractionResults = HashMap<u64, TestResult>;

/// Shared store of in-flight verification results.
pub struct TestResultAccumulator {
    results: Mutex<HashMap<u64, InteractionResults>>,
    reporter: Arc<dyn VerificationReporter>,
    config: VerifierConfig,
}

impl TestResultAccumulator {
    pub fn new(reporter: Arc<dyn VerificationReporter>, config: VerifierConfig) -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
            reporter,
            config,
        }
    }

    /// Record `result` for `interaction`. Returns `Ok(true)` while some
    /// interactions of the pact are still unverified.
    pub fn update_test_result(
        &self,
        pact: &PactSummary,
        interaction: &InteractionSummary,
        result: TestResult,
        source: &PactSource,
    ) -> Result<bool, Vec<String>> {
        debug!(
            "Received test result '{:?}' for Pact {}-{} and {} ({})",
            result,
            pact.provider,
            pact.consumer,
            interaction.description,
            source.description()
        );

        let pact_hash = pact_hash(pact, source);
        let completed = {
            let mut results = self.results.lock();
            let interaction_results = results.entry(pact_hash).or_default();
            let interaction_hash = interaction_hash(interaction);
            let merged = match interaction_results.remove(&interaction_hash) {
                Some(existing) => existing.merge(result),
                None => result,
            };
            interaction_results.insert(interaction_hash, merged);

            let unverified: Vec<&str> = unverified_interactions(pact, interaction_results)
                .into_iter()
                .map(|interaction| interaction.description.as_str())
                .collect();
            if unverified.is_empty() {
                Ok(results.remove(&pact_hash).unwrap_or_default())
            } else {
                Err(unverified)
            }
        };

        let completed = match completed {
            Ok(completed) => completed,
            Err(unverified) => {
                warn!(
                    "Not all of the {} interactions were verified. The following were missing:",
                    pact.interactions.len()
                );
                for description in unverified {
                    warn!("    {}", description);
                }
                return Ok(true);
            }
        };
        debug!(
            "All interactions for Pact {}-{} have a verification result",
            pact.provider, pact.consumer
        );

        if !self.config.publish_results {
            warn!(
                "Skipping publishing of verification results as it has been disabled ({} is not 'true')",
                ENV_PUBLISH_RESULTS
            );
            return Ok(false);
        }

        let merged = completed
            .into_values()
            .reduce(TestResult::merge)
            .unwrap_or_default();
        self.reporter.report_results(
            pact,
            &merged,
            &self.config.provider_version(),
            &self.config.provider.tags,
            self.config.provider.branch.as_deref(),
        )
    }

    /// Fold a run's verification results into one test result, then record it.
    pub fn update_test_results(
        &self,
        pact: &PactSummary,
        interaction: &InteractionSummary,
        results: &[VerificationResult],
        source: &PactSource,
    ) -> Result<bool, Vec<String>> {
        let initial = TestResult::ok(interaction.interaction_id.as_deref());
        let folded = results
            .iter()
            .fold(initial, |acc, result| acc.merge(result.to_test_result()));
        self.update_test_result(pact, interaction, folded, source)
    }

    pub fn clear_test_result(&self, pact: &PactSummary, source: &PactSource) {
        self.results.lock().remove(&pact_hash(pact, source));
    }

    /// Number of pacts with results still pending.
    pub fn pending_pacts(&self) -> usize {
        self.results.lock().len()
    }
}

/// Interactions of `pact` that have no entry in `results`.
pub fn unverified_interactions<'a>(
    pact: &'a PactSummary,
    results: &InteractionResults,
) -> Vec<&'a InteractionSummary> {
    pact.interactions
        .iter()
        .filter(|interaction| !results.contains_key(&interaction_hash(interaction)))
        .collect()
}

// Hashes key the in-memory store only. `DefaultHasher` output may change
// between Rust releases, so they are never persisted or reported.

pub fn interaction_hash(interaction: &InteractionSummary) -> u64 {
    let mut hasher = DefaultHasher::new();
    interaction.description.hash(&mut hasher);
    for state in &interaction.provider_states {
        state.hash(&mut hasher);
    }
    hasher.finish()
}

pub fn pact_hash(pact: &PactSummary, source: &PactSource) -> u64 {
    let mut hasher = DefaultHasher::new();
    pact.consumer.hash(&mut hasher);
    pact.provider.hash(&mut hasher);
    if let PactSource::BrokerUrl(url) = source {
        if !url.is_empty() {
            url.hash(&mut hasher);
        }
    }
    hasher.finish()
}
