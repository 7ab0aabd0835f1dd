//! Content matching for consumer-driven contract tests.
//!
//! Compares an expected body annotated with path-scoped matching rules
//! against an actual body and reports every divergence as a [`Mismatch`].

// ===== Data model =====
pub mod body;
pub mod error;
pub mod mismatch;
pub mod path;

// ===== Rules and matching =====
pub mod context;
pub mod generators;
pub mod json;
pub mod matchers;
pub mod rules;

// ===== Content-type dispatch =====
pub mod content;

// Don't export internal modules
mod diff;
mod render;

pub use body::{Body, BodyContents, ContentType};
pub use content::{ContentMatcher, ContentMatcherPlugin, ContentMatcherRegistry, InteractionContents};
pub use context::MatchingContext;
pub use diff::generate_diff;
pub use error::{ContentError, GeneratorError, PathError, RuleError};
pub use json::JsonContentMatcher;
pub use mismatch::{BodyItemMatchResult, BodyMatchResult, Mismatch};
pub use path::{DocPath, PathExpression};
pub use rules::{MatchingRule, MatchingRuleCategory, RuleLogic, SpecVersion};
