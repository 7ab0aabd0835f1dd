//! Provider-side verification support: per-interaction result accumulation,
//! result publishing and verifier configuration.

pub mod accumulator;
pub mod config;
pub mod pact;
pub mod reporter;
pub mod result;

pub use accumulator::TestResultAccumulator;
pub use config::VerifierConfig;
pub use pact::{InteractionSummary, PactSource, PactSummary};
pub use reporter::{LoggingReporter, VerificationReporter};
pub use result::{TestResult, VerificationFailure, VerificationResult};
