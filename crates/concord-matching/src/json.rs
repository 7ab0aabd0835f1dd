//! Recursive comparison of JSON bodies.
//!
//! [`JsonContentMatcher::match_body`] first settles the body presence states
//! (missing, empty, null) and only then parses both sides and walks the two
//! trees from `$`. At each path the [`MatchingContext`] selects the most
//! specific rule group:
//!
//! - with no group, values are compared for equality and containers
//!   recursively, with key-set and length checks;
//! - a group without container rules is evaluated at the path, and the walk
//!   continues into the children, which resolve their own (possibly
//!   inherited) groups;
//! - a group with a container rule (`Values`, `EachKey`, `EachValue`,
//!   `ArrayContains`) lets that rule drive the traversal of the subtree.

use crate::body::{Body, ContentType};
use crate::content::{ContentMatcher, InteractionContents};
use crate::context::MatchingContext;
use crate::diff::{generate_diff, LazyDiff};
use crate::error::ContentError;
use crate::matchers::{match_group, match_rule};
use crate::mismatch::{BodyItemMatchResult, BodyMatchResult, Mismatch};
use crate::path::DocPath;
use crate::render::{type_of, value_of};
use crate::rules::{ArrayContainsVariant, MatchingRule, MatchingRuleCategory, MatchingRuleDefinition, RuleGroup};
use serde_json::{Map, Value};
use tracing::debug;

/// Content matcher for `application/json` and `+json` media types.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContentMatcher;

fn root_mismatch(message: String) -> BodyMatchResult {
    BodyMatchResult::root_mismatch(Mismatch::new("$", message))
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

impl JsonContentMatcher {
    /// Compare two parsed trees at `path`.
    pub fn compare(
        path: &DocPath,
        expected: &Value,
        actual: &Value,
        context: &MatchingContext,
    ) -> Vec<BodyItemMatchResult> {
        match (expected, actual) {
            (Value::Object(expected_map), Value::Object(actual_map)) => {
                compare_maps(path, expected_map, actual_map, expected, actual, context)
            }
            (Value::Array(expected_list), Value::Array(actual_list)) => {
                compare_lists(path, expected_list, actual_list, expected, actual, context)
            }
            _ if is_container(expected) || is_container(actual) => {
                let message = format!(
                    "Type mismatch: Expected {} {} to be equal to {} {}",
                    type_of(actual),
                    value_of(actual),
                    type_of(expected),
                    value_of(expected)
                );
                vec![BodyItemMatchResult::new(
                    path.to_string(),
                    vec![Mismatch::new(path.to_string(), message)
                        .with_values(expected, actual)
                        .with_diff(Some(generate_diff(expected, actual)))],
                )]
            }
            _ => compare_values(path, expected, actual, context),
        }
    }
}

fn compare_maps(
    path: &DocPath,
    expected: &Map<String, Value>,
    actual: &Map<String, Value>,
    expected_value: &Value,
    actual_value: &Value,
    context: &MatchingContext,
) -> Vec<BodyItemMatchResult> {
    let group = context.select_best_matcher(path);
    let container_driven = group.as_ref().is_some_and(RuleGroup::has_container_rule);
    let diff = LazyDiff::new(expected_value, actual_value);

    if expected.is_empty() && !actual.is_empty() && !context.allow_unexpected_keys && !container_driven {
        return vec![BodyItemMatchResult::new(
            path.to_string(),
            vec![Mismatch::new(
                path.to_string(),
                format!("Expected an empty Map but received {}", value_of(actual_value)),
            )
            .with_values(expected_value, actual_value)
            .with_diff(Some(diff.render()))],
        )];
    }

    let mut results = Vec::new();
    let Some(group) = group else {
        results.extend(context.match_keys(path, expected, actual, &diff));
        results.extend(compare_common_keys(path, expected, actual, context));
        return results;
    };

    debug!("compare_maps: Matcher defined for path {}", path);
    results.push(BodyItemMatchResult::new(
        path.to_string(),
        match_group(path, &group, expected_value, actual_value),
    ));

    if !container_driven {
        results.extend(context.match_keys(path, expected, actual, &diff));
        results.extend(compare_common_keys(path, expected, actual, context));
        return results;
    }

    let value_driven = group
        .rules
        .iter()
        .any(|rule| matches!(rule, MatchingRule::EachValue(_) | MatchingRule::Values));
    for rule in &group.rules {
        match rule {
            MatchingRule::EachKey(definition) => {
                results.extend(each_key(path, definition, actual));
                if !value_driven {
                    results.extend(compare_common_keys(path, expected, actual, context));
                }
            }
            MatchingRule::EachValue(definition) => {
                let nested = context.with_nested_rules(path, &definition.rules);
                for (key, actual_child) in actual {
                    let example = expected
                        .get(key)
                        .or(definition.value.as_ref())
                        .or_else(|| expected.values().next())
                        .unwrap_or(&Value::Null);
                    results.extend(JsonContentMatcher::compare(
                        &path.join(key.as_str()),
                        example,
                        actual_child,
                        &nested,
                    ));
                }
            }
            MatchingRule::Values => {
                for (key, actual_child) in actual {
                    let example = expected
                        .get(key)
                        .or_else(|| expected.values().next())
                        .unwrap_or(&Value::Null);
                    results.extend(JsonContentMatcher::compare(
                        &path.join(key.as_str()),
                        example,
                        actual_child,
                        context,
                    ));
                }
            }
            _ => {}
        }
    }
    results
}

fn compare_common_keys(
    path: &DocPath,
    expected: &Map<String, Value>,
    actual: &Map<String, Value>,
    context: &MatchingContext,
) -> Vec<BodyItemMatchResult> {
    expected
        .iter()
        .filter_map(|(key, expected_child)| {
            actual
                .get(key)
                .map(|actual_child| JsonContentMatcher::compare(&path.join(key.as_str()), expected_child, actual_child, context))
        })
        .flatten()
        .collect()
}

/// Apply each-key rules to every actual key, as a string value at the key's
/// own path.
fn each_key(path: &DocPath, definition: &MatchingRuleDefinition, actual: &Map<String, Value>) -> Vec<BodyItemMatchResult> {
    actual
        .keys()
        .filter_map(|key| {
            let child = path.join(key.as_str());
            let key_value = Value::String(key.clone());
            let mismatches: Vec<Mismatch> = definition
                .rules
                .iter()
                .flat_map(|rule| match_rule(&child, rule, &key_value, &key_value, false))
                .collect();
            (!mismatches.is_empty()).then(|| BodyItemMatchResult::new(child.to_string(), mismatches))
        })
        .collect()
}

fn compare_lists(
    path: &DocPath,
    expected: &[Value],
    actual: &[Value],
    expected_value: &Value,
    actual_value: &Value,
    context: &MatchingContext,
) -> Vec<BodyItemMatchResult> {
    let diff = LazyDiff::new(expected_value, actual_value);
    let mut results = Vec::new();

    let Some(group) = context.select_best_matcher(path) else {
        if expected.is_empty() && !actual.is_empty() {
            results.push(BodyItemMatchResult::new(
                path.to_string(),
                vec![Mismatch::new(
                    path.to_string(),
                    format!("Expected an empty List but received {}", value_of(actual_value)),
                )
                .with_values(expected_value, actual_value)
                .with_diff(Some(diff.render()))],
            ));
        } else {
            results.extend(compare_list_content(path, expected, actual, context));
            results.extend(length_mismatch(path, expected, actual, expected_value, actual_value, &diff));
        }
        return results;
    };

    debug!("compare_lists: Matcher defined for path {}", path);
    results.push(BodyItemMatchResult::new(
        path.to_string(),
        match_group(path, &group, expected_value, actual_value),
    ));

    if group.has_container_rule() {
        for rule in &group.rules {
            match rule {
                MatchingRule::EachValue(definition) => {
                    let nested = context.with_nested_rules(path, &definition.rules);
                    for (index, actual_child) in actual.iter().enumerate() {
                        let example = expected
                            .get(index)
                            .or(definition.value.as_ref())
                            .or_else(|| expected.first())
                            .unwrap_or(&Value::Null);
                        results.extend(JsonContentMatcher::compare(
                            &path.join_index(index),
                            example,
                            actual_child,
                            &nested,
                        ));
                    }
                }
                MatchingRule::Values => results.extend(compare_padded(path, expected, actual, context)),
                MatchingRule::ArrayContains(variants) => {
                    results.push(BodyItemMatchResult::new(
                        path.to_string(),
                        array_contains(path, variants, expected, actual, context),
                    ));
                }
                _ => {}
            }
        }
    } else if group.rules.iter().any(|rule| matches!(rule, MatchingRule::Equality)) {
        results.extend(compare_list_content(path, expected, actual, context));
        results.extend(length_mismatch(path, expected, actual, expected_value, actual_value, &diff));
    } else {
        results.extend(compare_padded(path, expected, actual, context));
    }
    results
}

/// Pairwise comparison up to the shorter length.
fn compare_list_content(
    path: &DocPath,
    expected: &[Value],
    actual: &[Value],
    context: &MatchingContext,
) -> Vec<BodyItemMatchResult> {
    expected
        .iter()
        .zip(actual)
        .enumerate()
        .flat_map(|(index, (expected_child, actual_child))| {
            JsonContentMatcher::compare(&path.join_index(index), expected_child, actual_child, context)
        })
        .collect()
}

/// Size-insensitive comparison: every actual element is compared against the
/// expected element at its index, or the first expected element when the
/// actual list is longer.
fn compare_padded(
    path: &DocPath,
    expected: &[Value],
    actual: &[Value],
    context: &MatchingContext,
) -> Vec<BodyItemMatchResult> {
    let Some(first) = expected.first() else {
        return Vec::new();
    };
    actual
        .iter()
        .enumerate()
        .flat_map(|(index, actual_child)| {
            let example = expected.get(index).unwrap_or(first);
            JsonContentMatcher::compare(&path.join_index(index), example, actual_child, context)
        })
        .collect()
}

fn length_mismatch(
    path: &DocPath,
    expected: &[Value],
    actual: &[Value],
    expected_value: &Value,
    actual_value: &Value,
    diff: &LazyDiff<'_>,
) -> Option<BodyItemMatchResult> {
    (expected.len() != actual.len()).then(|| {
        BodyItemMatchResult::new(
            path.to_string(),
            vec![Mismatch::new(
                path.to_string(),
                format!(
                    "Expected a List with {} elements but received {} elements",
                    expected.len(),
                    actual.len()
                ),
            )
            .with_values(expected_value, actual_value)
            .with_diff(Some(diff.render()))],
        )
    })
}

/// Every actual element must conform to some variant, and every variant must
/// be found among the actual elements. With no declared variants, each
/// expected element is a variant without rules.
fn array_contains(
    path: &DocPath,
    variants: &[ArrayContainsVariant],
    expected: &[Value],
    actual: &[Value],
    context: &MatchingContext,
) -> Vec<Mismatch> {
    let defaults: Vec<ArrayContainsVariant>;
    let variants = if variants.is_empty() {
        defaults = (0..expected.len())
            .map(|index| ArrayContainsVariant::new(index, MatchingRuleCategory::body()))
            .collect();
        &defaults[..]
    } else {
        variants
    };

    let mut mismatches = Vec::new();
    let mut examples = Vec::with_capacity(variants.len());
    for variant in variants {
        match expected.get(variant.index) {
            Some(example) => examples.push(Some((variant, context.for_variant(&variant.rules), example))),
            None => {
                mismatches.push(Mismatch::new(
                    path.to_string(),
                    format!("Variant at index {} has no example in the expected list", variant.index),
                ));
                examples.push(None);
            }
        }
    }

    let mut found = vec![false; examples.len()];
    for (index, element) in actual.iter().enumerate() {
        let mut matched = false;
        for (position, candidate) in examples.iter().enumerate() {
            let Some((variant, variant_context, example)) = candidate else {
                continue;
            };
            if conforms(example, element, variant_context) {
                debug!("Element {} of {} matched variant {}", index, path, variant.index);
                found[position] = true;
                matched = true;
            }
        }
        if !matched {
            mismatches.push(
                Mismatch::new(
                    path.to_string(),
                    format!(
                        "Element at index {} ({}) did not match any of the declared variants",
                        index,
                        value_of(element)
                    ),
                )
                .with_actual(element.clone()),
            );
        }
    }

    for (candidate, was_found) in examples.iter().zip(&found) {
        if let (Some((variant, _, example)), false) = (candidate, *was_found) {
            mismatches.push(
                Mismatch::new(
                    path.to_string(),
                    format!(
                        "Variant at index {} ({}) was not found in the actual list",
                        variant.index,
                        value_of(example)
                    ),
                )
                .with_expected((*example).clone()),
            );
        }
    }
    mismatches
}

/// A variant example accepts an element when comparing them under the
/// variant's own rules, rooted at `$`, yields no mismatches.
fn conforms(example: &Value, element: &Value, variant_context: &MatchingContext) -> bool {
    JsonContentMatcher::compare(&DocPath::root(), example, element, variant_context)
        .iter()
        .all(BodyItemMatchResult::matched)
}

fn compare_values(path: &DocPath, expected: &Value, actual: &Value, context: &MatchingContext) -> Vec<BodyItemMatchResult> {
    if let Some(group) = context.select_best_matcher(path) {
        debug!("compare_values: Matcher defined for path {}", path);
        return vec![BodyItemMatchResult::new(
            path.to_string(),
            match_group(path, &group, expected, actual),
        )];
    }

    debug!("compare_values: No matcher defined for path {}, using equality", path);
    if expected == actual {
        return vec![BodyItemMatchResult::passed(path.to_string())];
    }
    vec![BodyItemMatchResult::new(
        path.to_string(),
        vec![Mismatch::new(
            path.to_string(),
            format!(
                "Expected {} ({}) to be equal to {} ({})",
                value_of(actual),
                type_of(actual),
                value_of(expected),
                type_of(expected)
            ),
        )
        .with_values(expected, actual)],
    )]
}

impl ContentMatcher for JsonContentMatcher {
    fn match_body(&self, expected: &Body, actual: &Body, context: &MatchingContext) -> BodyMatchResult {
        if expected.is_missing() {
            return BodyMatchResult::ok();
        }
        if expected.is_empty() && actual.is_empty() {
            return BodyMatchResult::ok();
        }
        if actual.is_empty() {
            return root_mismatch(format!(
                "Expected empty body but received '{}'",
                actual.value_as_string()
            ));
        }
        if expected.is_null() && actual.is_present() {
            return root_mismatch(format!(
                "Expected null body but received '{}'",
                actual.value_as_string()
            ));
        }
        if expected.is_null() {
            return BodyMatchResult::ok();
        }
        if actual.is_missing() {
            return BodyMatchResult::root_mismatch(
                Mismatch::new(
                    "$",
                    format!("Expected body '{}' but was missing", expected.value_as_string()),
                )
                .with_expected(Value::String(expected.value_as_string())),
            );
        }

        let expected_tree = match expected.parse_json() {
            Ok(tree) => tree,
            Err(e) => return root_mismatch(format!("Failed to parse the expected body: {e}")),
        };
        let actual_tree = match actual.parse_json() {
            Ok(tree) => tree,
            Err(e) => {
                return root_mismatch(format!(
                    "Failed to parse the actual body '{}': {e}",
                    actual.value_as_string()
                ))
            }
        };

        BodyMatchResult::from_results(Self::compare(&DocPath::root(), &expected_tree, &actual_tree, context))
    }

    fn setup_body_from_config(&self, config: &Map<String, Value>) -> Result<Vec<InteractionContents>, ContentError> {
        let body = config.get("body").ok_or(ContentError::MissingBody)?;
        let bytes = serde_json::to_vec(body)?;
        Ok(vec![InteractionContents::new(Body::present(
            bytes,
            Some(ContentType::json()),
        ))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleLogic;
    use serde_json::json;

    fn ctx(rules: &[(&str, MatchingRule)], allow_unexpected_keys: bool) -> MatchingContext {
        let mut category = MatchingRuleCategory::body();
        for (expression, rule) in rules {
            category.add_rule(expression, rule.clone()).unwrap();
        }
        MatchingContext::new(category, allow_unexpected_keys)
    }

    fn mismatches(expected: Value, actual: Value, context: &MatchingContext) -> Vec<Mismatch> {
        JsonContentMatcher::compare(&DocPath::root(), &expected, &actual, context)
            .into_iter()
            .flat_map(|item| item.result)
            .collect()
    }

    fn body(text: &str) -> Body {
        Body::present(text.to_string(), Some(ContentType::json()))
    }

    // ============================================================
    // Body presence
    // ============================================================

    #[test]
    fn test_missing_expected_always_passes() {
        let context = ctx(&[], false);
        let matcher = JsonContentMatcher;
        assert!(matcher.match_body(&Body::missing(), &body("{}"), &context).matched());
        assert!(matcher.match_body(&Body::missing(), &Body::missing(), &context).matched());
        assert!(matcher.match_body(&Body::missing(), &body("not json"), &context).matched());
    }

    #[test]
    fn test_empty_bodies() {
        let context = ctx(&[], false);
        let matcher = JsonContentMatcher;
        assert!(matcher.match_body(&Body::empty(), &Body::empty(), &context).matched());

        let result = matcher.match_body(&body("{}"), &Body::empty(), &context);
        assert_eq!(
            result.all_mismatches()[0].message,
            "Expected empty body but received ''"
        );
    }

    #[test]
    fn test_null_bodies() {
        let context = ctx(&[], false);
        let matcher = JsonContentMatcher;
        let result = matcher.match_body(&Body::null(), &body("{\"a\":1}"), &context);
        assert_eq!(
            result.all_mismatches()[0].message,
            "Expected null body but received '{\"a\":1}'"
        );
        assert!(matcher.match_body(&Body::null(), &Body::null(), &context).matched());
        assert!(matcher.match_body(&Body::null(), &Body::missing(), &context).matched());
    }

    #[test]
    fn test_missing_actual() {
        let result = JsonContentMatcher.match_body(&body("{\"a\":1}"), &Body::missing(), &ctx(&[], false));
        let mismatch = &result.all_mismatches()[0];
        assert_eq!(mismatch.message, "Expected body '{\"a\":1}' but was missing");
        assert_eq!(mismatch.path, "$");
    }

    #[test]
    fn test_parse_failures_are_mismatches() {
        let context = ctx(&[], false);
        let result = JsonContentMatcher.match_body(&body("{"), &body("{}"), &context);
        assert!(result.all_mismatches()[0]
            .message
            .starts_with("Failed to parse the expected body"));

        let result = JsonContentMatcher.match_body(&body("{}"), &body("nope"), &context);
        assert!(result.all_mismatches()[0]
            .message
            .starts_with("Failed to parse the actual body 'nope'"));
    }

    // ============================================================
    // Structural comparison
    // ============================================================

    #[test]
    fn test_equal_values_record_passes() {
        let results = JsonContentMatcher::compare(
            &DocPath::root(),
            &json!({"a": 1, "b": [true]}),
            &json!({"a": 1, "b": [true]}),
            &ctx(&[], false),
        );
        let paths: Vec<&str> = results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(paths, vec!["$.a", "$.b[0]"]);
        assert!(results.iter().all(BodyItemMatchResult::matched));
    }

    #[test]
    fn test_value_mismatch_message() {
        let found = mismatches(json!({"a": 1}), json!({"a": "1"}), &ctx(&[], false));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$.a");
        assert_eq!(found[0].message, "Expected '1' (String) to be equal to 1 (Integer)");
    }

    #[test]
    fn test_type_mismatch_between_container_and_scalar() {
        let found = mismatches(json!({"a": {"b": 1}}), json!({"a": 5}), &ctx(&[], true));
        assert_eq!(found[0].message, "Type mismatch: Expected Integer 5 to be equal to Map {\"b\":1}");
        assert!(found[0].diff.is_some());

        let found = mismatches(json!({"a": 5}), json!({"a": [5]}), &ctx(&[], true));
        assert_eq!(found[0].message, "Type mismatch: Expected List [5] to be equal to Integer 5");
    }

    #[test]
    fn test_unexpected_keys() {
        let strict = ctx(&[], false);
        let found = mismatches(json!({"a": 1}), json!({"a": 1, "b": 2}), &strict);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$.b");

        let lenient = ctx(&[], true);
        assert!(mismatches(json!({"a": 1}), json!({"a": 1, "b": 2}), &lenient).is_empty());
    }

    #[test]
    fn test_empty_map_expected() {
        let found = mismatches(json!({}), json!({"a": 1}), &ctx(&[], false));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Expected an empty Map but received {\"a\":1}");
        assert!(mismatches(json!({}), json!({"a": 1}), &ctx(&[], true)).is_empty());
    }

    #[test]
    fn test_list_length_mismatch() {
        let found = mismatches(json!([1, 2]), json!([1, 2, 3]), &ctx(&[], false));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Expected a List with 2 elements but received 3 elements");

        let found = mismatches(json!([1, 2]), json!([1, 3]), &ctx(&[], false));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$[1]");
    }

    // ============================================================
    // Rule driven comparison
    // ============================================================

    #[test]
    fn test_type_rule_is_size_insensitive() {
        let context = ctx(&[("$.items", MatchingRule::Type)], false);
        assert!(mismatches(json!({"items": [1]}), json!({"items": [2, 3, 4]}), &context).is_empty());
        assert!(mismatches(json!({"items": [1, 2]}), json!({"items": []}), &context).is_empty());

        let found = mismatches(json!({"items": [1]}), json!({"items": [2, "x"]}), &context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$.items[1]");
    }

    #[test]
    fn test_min_max_bounds_on_lists() {
        let context = ctx(
            &[(
                "$.items",
                MatchingRule::MinMaxType {
                    min: Some(2),
                    max: Some(3),
                },
            )],
            false,
        );
        assert!(mismatches(json!({"items": [1]}), json!({"items": [1, 2]}), &context).is_empty());
        let found = mismatches(json!({"items": [1]}), json!({"items": [1]}), &context);
        assert_eq!(found[0].message, "Expected [1] (size 1) to have minimum size 2");
        let found = mismatches(json!({"items": [1]}), json!({"items": [1, 2, 3, 4]}), &context);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_equality_rule_on_lists_checks_length() {
        let context = ctx(&[("$.items", MatchingRule::Equality)], false);
        let found = mismatches(json!({"items": [1, 2]}), json!({"items": [1, 3, 4]}), &context);
        let messages: Vec<&str> = found.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Expected 3 (Integer) to be equal to 2 (Integer)",
                "Expected a List with 2 elements but received 3 elements",
            ]
        );
    }

    #[test]
    fn test_rules_cascade_to_descendants() {
        let context = ctx(&[("$.user", MatchingRule::Type)], false);
        assert!(mismatches(
            json!({"user": {"name": "a", "age": 1}}),
            json!({"user": {"name": "b", "age": 2}}),
            &context
        )
        .is_empty());
        let found = mismatches(json!({"user": {"age": 1}}), json!({"user": {"age": "1"}}), &context);
        assert_eq!(found[0].path, "$.user.age");
    }

    #[test]
    fn test_type_rule_still_reports_missing_keys() {
        let context = ctx(&[("$.user", MatchingRule::Type)], true);
        let found = mismatches(json!({"user": {"name": "a"}}), json!({"user": {}}), &context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Expected name='a' but was missing");
    }

    #[test]
    fn test_or_rules() {
        let mut category = MatchingRuleCategory::body();
        category
            .add_rules("$.id", vec![MatchingRule::Integer, MatchingRule::Null], RuleLogic::Or)
            .unwrap();
        let context = MatchingContext::new(category, false);
        assert!(mismatches(json!({"id": 1}), json!({"id": null}), &context).is_empty());
        assert_eq!(mismatches(json!({"id": 1}), json!({"id": "x"}), &context).len(), 2);
    }

    #[test]
    fn test_each_key() {
        let context = ctx(
            &[("$", MatchingRule::each_key(vec![MatchingRule::regex("[a-z]+").unwrap()]))],
            false,
        );
        let found = mismatches(json!({"a": 1}), json!({"abc": 1, "X1": 1}), &context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$.X1");
        assert_eq!(found[0].message, "Expected 'X1' to match '[a-z]+'");
    }

    #[test]
    fn test_each_key_and_each_value_together() {
        let mut category = MatchingRuleCategory::body();
        category
            .add_rules(
                "$",
                vec![
                    MatchingRule::each_key(vec![MatchingRule::regex("[a-z]+").unwrap()]),
                    MatchingRule::each_value(vec![MatchingRule::Integer]),
                ],
                RuleLogic::And,
            )
            .unwrap();
        let context = MatchingContext::new(category, false);
        assert!(mismatches(json!({"a": 1}), json!({"x": 5, "y": 6}), &context).is_empty());
        let found = mismatches(json!({"a": 1}), json!({"x": "five", "Y": 6}), &context);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_each_value_on_map() {
        let context = ctx(&[("$", MatchingRule::each_value(vec![MatchingRule::Type]))], false);
        assert!(mismatches(json!({"a": 1}), json!({"x": 2, "y": 3}), &context).is_empty());
        let found = mismatches(json!({"a": 1}), json!({"x": 2, "y": "3"}), &context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$.y");
    }

    #[test]
    fn test_each_value_example_falls_back_to_null() {
        let context = ctx(&[("$", MatchingRule::each_value(vec![MatchingRule::Type]))], false);
        let found = mismatches(json!({}), json!({"x": 2}), &context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Expected 2 (Integer) to be the same type as null (Null)");
    }

    #[test]
    fn test_each_value_literal_example() {
        let rule = MatchingRule::EachValue(
            MatchingRuleDefinition::new(vec![MatchingRule::Type]).with_value(json!("seed")),
        );
        let context = ctx(&[("$.tags", rule)], false);
        assert!(mismatches(json!({"tags": []}), json!({"tags": ["a", "b"]}), &context).is_empty());
        assert_eq!(mismatches(json!({"tags": []}), json!({"tags": ["a", 1]}), &context).len(), 1);
    }

    #[test]
    fn test_values_rule_ignores_keys() {
        let context = ctx(&[("$", MatchingRule::Values)], false);
        assert!(mismatches(json!({"a": 1}), json!({"b": 1, "c": 1}), &context).is_empty());
        let found = mismatches(json!({"a": 1}), json!({"b": 2}), &context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "$.b");
    }

    #[test]
    fn test_container_rule_on_scalar_is_mismatch() {
        let context = ctx(&[("$.a", MatchingRule::each_value(vec![MatchingRule::Type]))], false);
        let found = mismatches(json!({"a": 1}), json!({"a": 1}), &context);
        assert_eq!(found[0].message, "each-value can only be applied to a Map or List, got 1");
    }

    // ============================================================
    // Array contains
    // ============================================================

    fn variant(index: usize, rules: &[(&str, MatchingRule)]) -> ArrayContainsVariant {
        let mut category = MatchingRuleCategory::body();
        for (expression, rule) in rules {
            category.add_rule(expression, rule.clone()).unwrap();
        }
        ArrayContainsVariant::new(index, category)
    }

    #[test]
    fn test_array_contains_default_variants() {
        let context = ctx(&[("$", MatchingRule::ArrayContains(vec![]))], false);
        assert!(mismatches(json!([1, 2]), json!([2, 1]), &context).is_empty());

        let found = mismatches(json!([1, 2]), json!([2, 3]), &context);
        let messages: Vec<&str> = found.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Element at index 1 (3) did not match any of the declared variants",
                "Variant at index 0 (1) was not found in the actual list",
            ]
        );
    }

    #[test]
    fn test_array_contains_selects_by_content() {
        let variants = vec![
            variant(0, &[("$.id", MatchingRule::Integer)]),
            variant(1, &[("$.name", MatchingRule::Type)]),
        ];
        let expected = json!([{"id": 1}, {"name": "a"}]);
        let actual = json!([{"name": "zed"}, {"id": 99}]);

        let context = ctx(&[("$", MatchingRule::ArrayContains(variants.clone()))], false);
        assert!(mismatches(expected.clone(), actual.clone(), &context).is_empty());

        let reversed: Vec<ArrayContainsVariant> = variants.into_iter().rev().collect();
        let context = ctx(&[("$", MatchingRule::ArrayContains(reversed))], false);
        assert!(mismatches(expected, actual, &context).is_empty());
    }

    #[test]
    fn test_array_contains_on_map_is_mismatch() {
        let context = ctx(&[("$", MatchingRule::ArrayContains(vec![]))], false);
        let found = mismatches(json!({"a": 1}), json!({"a": 1}), &context);
        assert_eq!(
            found[0].message,
            "array-contains can only be applied to a Map or List, got {\"a\":1}"
        );
    }

    #[test]
    fn test_setup_body_from_config() {
        let mut config = Map::new();
        config.insert("body".to_string(), json!({"a": [1, 2]}));
        let contents = JsonContentMatcher.setup_body_from_config(&config).unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].body.value_as_string(), r#"{"a":[1,2]}"#);
        assert_eq!(contents[0].body.content_type, Some(ContentType::json()));

        assert!(matches!(
            JsonContentMatcher.setup_body_from_config(&Map::new()),
            Err(ContentError::MissingBody)
        ));
    }
}
