//! Error types for the matching engine.
//!
//! Comparison itself never fails: malformed payloads and divergences are
//! reported as [`Mismatch`](crate::Mismatch) records. These errors cover
//! construction of rules, paths and content, where a bad definition must be
//! rejected rather than silently ignored.

use thiserror::Error;

/// Failure to parse a path expression such as `$.items[*].id`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path expression '{0}' must start with '$'")]
    MissingRoot(String),
    #[error("Path expression '{expression}' has an empty field name at position {position}")]
    EmptyField { expression: String, position: usize },
    #[error("Path expression '{expression}' has an unterminated bracket at position {position}")]
    UnterminatedBracket { expression: String, position: usize },
    #[error("Path expression '{expression}' has an invalid index '{index}'")]
    InvalidIndex { expression: String, index: String },
    #[error("Path expression '{expression}' has an unexpected character '{found}' at position {position}")]
    UnexpectedCharacter {
        expression: String,
        found: char,
        position: usize,
    },
}

/// Failure to build a matching rule or rule category.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("Unknown matcher type '{0}'")]
    UnknownMatcher(String),
    #[error("Invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
    #[error("Invalid matcher definition: {0}")]
    InvalidDefinition(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Failure to build or configure body contents.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Body configuration is missing the 'body' key")]
    MissingBody,
    #[error("Invalid content type '{0}'")]
    InvalidContentType(String),
    #[error("Failed to serialise body: {0}")]
    Serialise(#[from] serde_json::Error),
    #[error("Plugin failed to configure content for '{content_type}': {message}")]
    Plugin {
        content_type: String,
        message: String,
    },
}

/// Failure to generate a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("Unknown generator type '{0}'")]
    UnknownGenerator(String),
    #[error("Invalid generator definition: {0}")]
    InvalidDefinition(String),
    #[error("Invalid date/time format '{0}'")]
    InvalidFormat(String),
    #[error("ArrayContains generator can only be applied to lists")]
    NotAList,
    #[error("No provider state value for '{0}'")]
    MissingProviderState(String),
    #[error(transparent)]
    Path(#[from] PathError),
}
