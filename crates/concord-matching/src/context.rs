//! Rule resolution.
//!
//! A [`MatchingContext`] answers, for a concrete path, whether a rule group
//! applies and which one is the most specific. Candidate expressions are
//! ranked by weight (the product of their segment weights), then by length,
//! then by registration order.
//!
//! An expression shorter than the path is an ancestor. Its group only
//! reaches the path through its cascading rules; container rules such as
//! `EachValue` stay at the path they are declared on.

use crate::content::PluginConfiguration;
use crate::diff::LazyDiff;
use crate::mismatch::{BodyItemMatchResult, Mismatch};
use crate::path::{DocPath, PathExpression, PathMatch, PathSegment};
use crate::render::value_of;
use crate::rules::{MatchingRule, MatchingRuleCategory, RuleGroup, RuleLogic};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::debug;

/// Everything a comparison reads besides the two payloads.
#[derive(Debug, Clone, Default)]
pub struct MatchingContext {
    pub matchers: MatchingRuleCategory,
    pub allow_unexpected_keys: bool,
    /// Opaque configuration handed to content-type plugins, keyed by plugin name
    pub plugin_configuration: HashMap<String, PluginConfiguration>,
}

impl MatchingContext {
    pub fn new(matchers: MatchingRuleCategory, allow_unexpected_keys: bool) -> Self {
        Self {
            matchers,
            allow_unexpected_keys,
            plugin_configuration: HashMap::new(),
        }
    }

    pub fn with_plugin_configuration(mut self, plugin_configuration: HashMap<String, PluginConfiguration>) -> Self {
        self.plugin_configuration = plugin_configuration;
        self
    }

    pub fn matcher_defined(&self, path: &DocPath) -> bool {
        self.select_best_matcher(path).is_some()
    }

    /// The single most specific group applying at `path`. Inherited groups
    /// come back with `cascaded` set.
    pub fn select_best_matcher(&self, path: &DocPath) -> Option<RuleGroup> {
        let mut best: Option<((u64, usize, Reverse<usize>), RuleGroup)> = None;

        for (position, entry) in self.matchers.entries().iter().enumerate() {
            let Some(PathMatch {
                weight,
                segments,
                direct,
            }) = entry.path.matches(path)
            else {
                continue;
            };

            let group = if direct {
                entry.group.clone()
            } else {
                entry.group.cascaded_part()
            };
            if group.is_empty() {
                continue;
            }

            let rank = (weight, segments, Reverse(position));
            if best.as_ref().map_or(true, |(current, _)| rank > *current) {
                best = Some((rank, group));
            }
        }

        if let Some(((weight, _, _), group)) = &best {
            debug!(
                "Selected matcher at {} with weight {} (cascaded: {})",
                path, weight, group.cascaded
            );
        }
        best.map(|(_, group)| group)
    }

    /// Whether a group is declared at exactly this path.
    #[cfg(test)]
    fn direct_matcher_defined(&self, path: &DocPath) -> bool {
        self.matchers.entries().iter().any(|entry| {
            !entry.group.is_empty() && entry.path.matches(path).is_some_and(|m| m.direct)
        })
    }

    fn direct_rules(&self, path: &DocPath) -> impl Iterator<Item = &MatchingRule> + '_ {
        let path = path.clone();
        self.matchers
            .entries()
            .iter()
            .filter(move |entry| entry.path.matches(&path).is_some_and(|m| m.direct))
            .flat_map(|entry| entry.group.rules.iter())
    }

    /// A context for the children of `path` with `rules` registered at every
    /// immediate child. The rules form their own AND group, which takes
    /// precedence over a user group declared at the same expression.
    pub fn with_nested_rules(&self, path: &DocPath, rules: &[MatchingRule]) -> MatchingContext {
        let mut context = self.clone();
        let expression = PathExpression::from(path).child(PathSegment::Star);
        context
            .matchers
            .prepend_rules_at(expression, rules.to_vec(), RuleLogic::And);
        context
    }

    /// A context for comparing an array-contains variant. Unexpected keys are
    /// always allowed there.
    pub fn for_variant(&self, rules: &MatchingRuleCategory) -> MatchingContext {
        MatchingContext {
            matchers: rules.clone(),
            allow_unexpected_keys: true,
            plugin_configuration: self.plugin_configuration.clone(),
        }
    }

    /// Key-set policy for a map. Missing expected keys are always reported;
    /// unexpected actual keys only when they are not allowed. Maps whose keys
    /// are driven by a container rule are not checked.
    pub fn match_keys(
        &self,
        path: &DocPath,
        expected: &Map<String, Value>,
        actual: &Map<String, Value>,
        diff: &LazyDiff<'_>,
    ) -> Vec<BodyItemMatchResult> {
        let key_agnostic = self.direct_rules(path).any(|rule| {
            matches!(
                rule,
                MatchingRule::EachKey(_) | MatchingRule::EachValue(_) | MatchingRule::Values
            )
        });
        if key_agnostic {
            return Vec::new();
        }

        let mut results = Vec::new();
        for (key, value) in expected {
            if !actual.contains_key(key) {
                let child = path.join(key.as_str()).to_string();
                results.push(BodyItemMatchResult::new(
                    child.clone(),
                    vec![Mismatch::new(child, format!("Expected {}={} but was missing", key, value_of(value)))
                        .with_expected(value.clone())
                        .with_diff(Some(diff.render()))],
                ));
            }
        }

        if !self.allow_unexpected_keys {
            for (key, value) in actual {
                if !expected.contains_key(key) {
                    let child = path.join(key.as_str()).to_string();
                    results.push(BodyItemMatchResult::new(
                        child.clone(),
                        vec![Mismatch::new(child, format!("Unexpected key '{}' with value {}", key, value_of(value)))
                            .with_actual(value.clone())
                            .with_diff(Some(diff.render()))],
                    ));
                }
            }
        }
        results
    }
}
