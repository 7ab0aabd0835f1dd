//! Selection of a content matcher by content type.

use super::{ContentMatcher, ContentMatcherPlugin, KafkaJsonSchemaContentMatcher, PluginContentMatcher};
use crate::body::{Body, ContentType};
use crate::context::MatchingContext;
use crate::json::JsonContentMatcher;
use crate::mismatch::{BodyMatchResult, Mismatch};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which content types a registered matcher handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherSelector {
    /// Exact `type/subtype`, attributes ignored
    BaseType(String),
    KafkaSchemaRegistryJson,
    /// Any JSON type, including `+json` suffixes
    Json,
}

impl MatcherSelector {
    pub fn applies_to(&self, content_type: &ContentType) -> bool {
        match self {
            MatcherSelector::BaseType(base) => content_type.base_type() == *base,
            MatcherSelector::KafkaSchemaRegistryJson => content_type.is_kafka_schema_registry_json(),
            MatcherSelector::Json => content_type.is_json(),
        }
    }
}

struct Registration {
    selector: MatcherSelector,
    matcher: Arc<dyn ContentMatcher>,
}

/// Ordered set of content matchers. Plugins take precedence over built-ins;
/// within each group the first registration wins.
#[derive(Default)]
pub struct ContentMatcherRegistry {
    plugins: Vec<Registration>,
    builtins: Vec<Registration>,
}

impl ContentMatcherRegistry {
    /// An empty registry. Every body falls back to text equality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the schema-registry JSON and plain JSON matchers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.builtins.push(Registration {
            selector: MatcherSelector::KafkaSchemaRegistryJson,
            matcher: Arc::new(KafkaJsonSchemaContentMatcher),
        });
        registry.builtins.push(Registration {
            selector: MatcherSelector::Json,
            matcher: Arc::new(JsonContentMatcher),
        });
        registry
    }

    /// Route bodies of `content_type` to an external plugin.
    pub fn register_plugin(&mut self, content_type: ContentType, plugin: Arc<dyn ContentMatcherPlugin>) {
        debug!("Registering plugin content matcher for '{}'", content_type.base_type());
        self.plugins.push(Registration {
            selector: MatcherSelector::BaseType(content_type.base_type()),
            matcher: Arc::new(PluginContentMatcher::new(plugin, content_type)),
        });
    }

    pub fn lookup(&self, content_type: &ContentType) -> Option<Arc<dyn ContentMatcher>> {
        self.plugins
            .iter()
            .chain(self.builtins.iter())
            .find(|registration| registration.selector.applies_to(content_type))
            .map(|registration| Arc::clone(&registration.matcher))
    }

    /// Compare two bodies with the matcher for their content type.
    pub fn match_body(&self, expected: &Body, actual: &Body, context: &MatchingContext) -> BodyMatchResult {
        if let (Some(expected_type), Some(actual_type)) = (&expected.content_type, &actual.content_type) {
            if expected.is_present() && actual.is_present() && !expected_type.is_equivalent(actual_type) {
                return BodyMatchResult::content_type_mismatch(
                    Mismatch::new(
                        "$",
                        format!(
                            "Expected a body of '{expected_type}' but the actual content type was '{actual_type}'"
                        ),
                    )
                    .with_expected(Value::String(expected_type.to_string()))
                    .with_actual(Value::String(actual_type.to_string())),
                );
            }
        }

        let content_type = expected.content_type.as_ref().or(actual.content_type.as_ref());
        match content_type.and_then(|content_type| self.lookup(content_type)) {
            Some(matcher) => matcher.match_body(expected, actual, context),
            None => {
                debug!("No content matcher for {:?}, comparing bodies as text", content_type);
                match_text(expected, actual)
            }
        }
    }
}

impl fmt::Debug for ContentMatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selectors = |group: &[Registration]| group.iter().map(|r| r.selector.clone()).collect::<Vec<_>>();
        f.debug_struct("ContentMatcherRegistry")
            .field("plugins", &selectors(&self.plugins))
            .field("builtins", &selectors(&self.builtins))
            .finish()
    }
}

fn match_text(expected: &Body, actual: &Body) -> BodyMatchResult {
    if expected.is_missing() || expected.value() == actual.value() {
        return BodyMatchResult::ok();
    }
    let e = expected.value_as_string();
    let a = actual.value_as_string();
    BodyMatchResult::root_mismatch(
        Mismatch::new(
            "$",
            format!("Expected body '{e}' to match '{a}' using equality but did not match"),
        )
        .with_expected(Value::String(e))
        .with_actual(Value::String(a)),
    )
}
