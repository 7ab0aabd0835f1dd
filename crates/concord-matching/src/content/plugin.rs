//! Adapter for content matchers supplied by an external plugin.

use super::{ContentMatcher, InteractionContents};
use crate::body::{Body, ContentType};
use crate::context::MatchingContext;
use crate::error::ContentError;
use crate::mismatch::{BodyItemMatchResult, BodyMatchResult, Mismatch};
use crate::rules::MatchingRuleCategory;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration a plugin attached to an interaction and to the pact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfiguration {
    #[serde(default)]
    pub interaction_configuration: Map<String, Value>,
    #[serde(default)]
    pub pact_configuration: Map<String, Value>,
}

/// A mismatch as reported by a plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginMismatch {
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    pub mismatch: String,
    pub path: String,
    pub diff: Option<String>,
}

/// Capability provided by a content-matcher plugin.
pub trait ContentMatcherPlugin: Send + Sync {
    /// Compare two bodies, returning mismatches keyed by path. A path with an
    /// empty list matched.
    fn match_contents(
        &self,
        expected: &Body,
        actual: &Body,
        allow_unexpected_keys: bool,
        rules: &MatchingRuleCategory,
        plugin_configuration: &HashMap<String, PluginConfiguration>,
    ) -> Result<BTreeMap<String, Vec<PluginMismatch>>, String>;

    /// Build interaction contents for `content_type` from a configuration map.
    fn configure_content(
        &self,
        content_type: &str,
        config: &Map<String, Value>,
    ) -> Result<Vec<InteractionContents>, String>;
}

/// [`ContentMatcher`] backed by a plugin.
#[derive(Clone)]
pub struct PluginContentMatcher {
    plugin: Arc<dyn ContentMatcherPlugin>,
    content_type: ContentType,
}

impl PluginContentMatcher {
    pub fn new(plugin: Arc<dyn ContentMatcherPlugin>, content_type: ContentType) -> Self {
        Self { plugin, content_type }
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }
}

impl fmt::Debug for PluginContentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContentMatcher")
            .field("content_type", &self.content_type.to_string())
            .finish_non_exhaustive()
    }
}

impl From<PluginMismatch> for Mismatch {
    fn from(m: PluginMismatch) -> Self {
        Mismatch {
            expected: m.expected,
            actual: m.actual,
            message: m.mismatch,
            path: m.path,
            diff: m.diff,
        }
    }
}

impl ContentMatcher for PluginContentMatcher {
    fn match_body(&self, expected: &Body, actual: &Body, context: &MatchingContext) -> BodyMatchResult {
        debug!("Invoking plugin content matcher for '{}'", self.content_type);
        let outcome = self.plugin.match_contents(
            expected,
            actual,
            context.allow_unexpected_keys,
            &context.matchers,
            &context.plugin_configuration,
        );

        match outcome {
            Ok(results) => BodyMatchResult::from_results(
                results
                    .into_iter()
                    .map(|(path, mismatches)| {
                        BodyItemMatchResult::new(path, mismatches.into_iter().map(Mismatch::from).collect())
                    })
                    .collect(),
            ),
            Err(error) => {
                warn!("Plugin content matcher for '{}' failed: {}", self.content_type, error);
                BodyMatchResult::root_mismatch(Mismatch::new(
                    "$",
                    format!("Plugin content matcher failed: {error}"),
                ))
            }
        }
    }

    fn setup_body_from_config(&self, config: &Map<String, Value>) -> Result<Vec<InteractionContents>, ContentError> {
        self.plugin
            .configure_content(&self.content_type.to_string(), config)
            .map_err(|message| ContentError::Plugin {
                content_type: self.content_type.to_string(),
                message,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MatchingRule;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingPlugin {
        fail: bool,
        seen: Mutex<Vec<(bool, usize, usize)>>,
    }

    impl ContentMatcherPlugin for RecordingPlugin {
        fn match_contents(
            &self,
            expected: &Body,
            actual: &Body,
            allow_unexpected_keys: bool,
            rules: &MatchingRuleCategory,
            plugin_configuration: &HashMap<String, PluginConfiguration>,
        ) -> Result<BTreeMap<String, Vec<PluginMismatch>>, String> {
            if self.fail {
                return Err("connection refused".to_string());
            }
            self.seen
                .lock()
                .push((allow_unexpected_keys, rules.len(), plugin_configuration.len()));

            let mut results = BTreeMap::new();
            results.insert("$.ok".to_string(), vec![]);
            if expected.value() != actual.value() {
                results.insert(
                    "$.value".to_string(),
                    vec![PluginMismatch {
                        mismatch: "protobuf field differs".to_string(),
                        path: "$.value".to_string(),
                        ..PluginMismatch::default()
                    }],
                );
            }
            Ok(results)
        }

        fn configure_content(
            &self,
            content_type: &str,
            config: &Map<String, Value>,
        ) -> Result<Vec<InteractionContents>, String> {
            if self.fail {
                return Err(format!("cannot configure {content_type}"));
            }
            let text = config.get("message").and_then(Value::as_str).unwrap_or_default();
            Ok(vec![InteractionContents::new(Body::present(
                text.to_string(),
                Some(content_type.parse().map_err(|e: ContentError| e.to_string())?),
            ))])
        }
    }

    fn protobuf() -> ContentType {
        ContentType::new("application", "protobuf")
    }

    fn body(text: &str) -> Body {
        Body::present(text.to_string(), Some(protobuf()))
    }

    #[test]
    fn test_plugin_results_are_normalised() {
        let plugin = Arc::new(RecordingPlugin::default());
        let matcher = PluginContentMatcher::new(plugin.clone(), protobuf());

        let mut rules = MatchingRuleCategory::body();
        rules.add_rule("$.value", MatchingRule::Type).unwrap();
        let mut context = MatchingContext::new(rules, false);
        context
            .plugin_configuration
            .insert("protobuf".to_string(), PluginConfiguration::default());

        let result = matcher.match_body(&body("a"), &body("b"), &context);
        assert_eq!(result.body_results.len(), 2);
        assert_eq!(result.mismatch_count(), 1);
        assert_eq!(result.all_mismatches()[0].message, "protobuf field differs");
        assert_eq!(*plugin.seen.lock(), vec![(false, 1, 1)]);

        assert!(matcher.match_body(&body("a"), &body("a"), &context).matched());
    }

    #[test]
    fn test_plugin_failure_becomes_root_mismatch() {
        let plugin = Arc::new(RecordingPlugin {
            fail: true,
            ..RecordingPlugin::default()
        });
        let matcher = PluginContentMatcher::new(plugin, protobuf());
        let context = MatchingContext::new(MatchingRuleCategory::body(), true);

        let result = matcher.match_body(&body("a"), &body("a"), &context);
        let mismatches = result.all_mismatches();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "$");
        assert_eq!(mismatches[0].message, "Plugin content matcher failed: connection refused");
    }

    #[test]
    fn test_configure_content() {
        let matcher = PluginContentMatcher::new(Arc::new(RecordingPlugin::default()), protobuf());
        let mut config = Map::new();
        config.insert("message".to_string(), json!("hello"));
        let contents = matcher.setup_body_from_config(&config).unwrap();
        assert_eq!(contents[0].body.value_as_string(), "hello");
        assert_eq!(contents[0].body.content_type, Some(protobuf()));

        let failing = PluginContentMatcher::new(
            Arc::new(RecordingPlugin {
                fail: true,
                ..RecordingPlugin::default()
            }),
            protobuf(),
        );
        match failing.setup_body_from_config(&config) {
            Err(ContentError::Plugin { content_type, message }) => {
                assert_eq!(content_type, "application/protobuf");
                assert_eq!(message, "cannot configure application/protobuf");
            }
            other => panic!("expected plugin error, got {other:?}"),
        }
    }
}
