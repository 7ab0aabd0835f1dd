//! Matcher algebra: one evaluation arm per [`MatchingRule`] variant.
//!
//! Evaluation is value-level only. Container rules (`Values`, `EachKey`,
//! `EachValue`, `ArrayContains`) drive the traversal in [`crate::json`] and
//! contribute nothing here unless they meet a value of the wrong shape.
//!
//! Scalar-kind rules such as regex or integer are not applicable to a
//! container; they reach its leaves by cascading instead.

mod equality;
mod number;
mod string;
pub mod temporal;

use crate::mismatch::Mismatch;
use crate::path::DocPath;
use crate::render::value_of;
use crate::rules::{MatchingRule, RuleGroup, RuleLogic};
use serde_json::Value;

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Evaluate a rule group. `And` reports every failure; `Or` passes as soon
/// as one rule passes and otherwise reports every failure.
pub fn match_group(path: &DocPath, group: &RuleGroup, expected: &Value, actual: &Value) -> Vec<Mismatch> {
    match group.logic {
        RuleLogic::And => group
            .rules
            .iter()
            .flat_map(|rule| match_rule(path, rule, expected, actual, group.cascaded))
            .collect(),
        RuleLogic::Or => {
            let mut mismatches = Vec::new();
            for rule in &group.rules {
                let result = match_rule(path, rule, expected, actual, group.cascaded);
                if result.is_empty() {
                    return Vec::new();
                }
                mismatches.extend(result);
            }
            mismatches
        }
    }
}

/// Evaluate one rule at `path`. `cascaded` is set when the rule was
/// inherited from an ancestor path.
pub fn match_rule(
    path: &DocPath,
    rule: &MatchingRule,
    expected: &Value,
    actual: &Value,
    cascaded: bool,
) -> Vec<Mismatch> {
    let at_container = is_container(expected) && is_container(actual);
    let mismatch = match rule {
        MatchingRule::Equality if at_container => None,
        MatchingRule::Equality => equality::equality(path, expected, actual),
        MatchingRule::Type => equality::same_type(path, expected, actual),
        MatchingRule::MinMaxType { min, max } => equality::same_type(path, expected, actual).or_else(|| {
            if cascaded {
                None
            } else {
                equality::size_bounds(path, actual, *min, *max)
            }
        }),
        MatchingRule::Null => equality::null(path, actual),
        MatchingRule::NotEmpty => equality::not_empty(path, actual),
        _ if at_container && !rule.is_container_rule() => None,
        MatchingRule::Regex(pattern) => string::regex(path, pattern, actual),
        MatchingRule::Include(substring) => string::include(path, substring, actual),
        MatchingRule::Number => number::number(path, actual),
        MatchingRule::Integer => number::integer(path, actual),
        MatchingRule::Decimal => number::decimal(path, actual),
        MatchingRule::Boolean => number::boolean(path, actual),
        MatchingRule::Date(format) => temporal::date(path, format.as_deref(), actual),
        MatchingRule::Time(format) => temporal::time(path, format.as_deref(), actual),
        MatchingRule::Timestamp(format) => temporal::timestamp(path, format.as_deref(), actual),
        MatchingRule::Values
        | MatchingRule::EachKey(_)
        | MatchingRule::EachValue(_)
        | MatchingRule::ArrayContains(_) => {
            if at_container && shape_supported(rule, actual) {
                None
            } else {
                Some(
                    Mismatch::new(
                        path.to_string(),
                        format!("{} can only be applied to a Map or List, got {}", rule.name(), value_of(actual)),
                    )
                    .with_values(expected, actual),
                )
            }
        }
    };
    mismatch.into_iter().collect()
}

/// Container rules that only make sense for one container shape.
fn shape_supported(rule: &MatchingRule, actual: &Value) -> bool {
    match rule {
        MatchingRule::EachKey(_) => actual.is_object(),
        MatchingRule::ArrayContains(_) => actual.is_array(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> DocPath {
        DocPath::root().join("a")
    }

    #[test]
    fn test_and_group_reports_all_failures() {
        let group = RuleGroup::and(vec![MatchingRule::Integer, MatchingRule::Include("x".to_string())]);
        let mismatches = match_group(&root(), &group, &json!(1), &json!("abc"));
        assert_eq!(mismatches.len(), 2);
    }

    #[test]
    fn test_or_group_passes_on_any_rule() {
        let group = RuleGroup::or(vec![MatchingRule::Integer, MatchingRule::Null]);
        assert!(match_group(&root(), &group, &json!(1), &Value::Null).is_empty());
        assert!(match_group(&root(), &group, &json!(1), &json!(5)).is_empty());
        assert_eq!(match_group(&root(), &group, &json!(1), &json!("x")).len(), 2);
    }

    #[test]
    fn test_equality_not_applied_at_containers() {
        let result = match_rule(&root(), &MatchingRule::Equality, &json!([1]), &json!([2]), false);
        assert!(result.is_empty());
        let result = match_rule(&root(), &MatchingRule::Equality, &json!(1), &json!(2), false);
        assert_eq!(result[0].message, "Expected 2 (Integer) to be equal to 1 (Integer)");
    }

    #[test]
    fn test_scalar_rules_skip_containers() {
        let pattern = MatchingRule::regex("\\d+").unwrap();
        assert!(match_rule(&root(), &pattern, &json!(["1"]), &json!(["x"]), false).is_empty());
        assert_eq!(match_rule(&root(), &pattern, &json!("1"), &json!("x"), false).len(), 1);
    }

    #[test]
    fn test_container_rule_on_scalar() {
        let rule = MatchingRule::each_value(vec![MatchingRule::Type]);
        let result = match_rule(&root(), &rule, &json!([1]), &json!(5), false);
        assert_eq!(result[0].message, "each-value can only be applied to a Map or List, got 5");

        let each_key = MatchingRule::each_key(vec![]);
        let result = match_rule(&root(), &each_key, &json!({}), &json!([]), false);
        assert_eq!(result.len(), 1);
        assert!(match_rule(&root(), &each_key, &json!({}), &json!({}), false).is_empty());
    }

    #[test]
    fn test_min_max_only_applies_directly() {
        let rule = MatchingRule::MinMaxType {
            min: Some(2),
            max: None,
        };
        let result = match_rule(&root(), &rule, &json!([1]), &json!([1]), false);
        assert_eq!(result[0].message, "Expected [1] (size 1) to have minimum size 2");
        assert!(match_rule(&root(), &rule, &json!([1]), &json!([1]), true).is_empty());
    }
}
