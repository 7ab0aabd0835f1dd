//! Text matchers. Numbers and booleans are matched on their JSON rendering;
//! null and containers never match.

use crate::mismatch::Mismatch;
use crate::path::DocPath;
use crate::render::value_of;
use crate::rules::RegexPattern;
use serde_json::Value;

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(super) fn regex(path: &DocPath, pattern: &RegexPattern, actual: &Value) -> Option<Mismatch> {
    if text(actual).is_some_and(|s| pattern.is_match(&s)) {
        return None;
    }
    Some(
        Mismatch::new(
            path.to_string(),
            format!("Expected {} to match '{}'", value_of(actual), pattern.as_str()),
        )
        .with_actual(actual.clone()),
    )
}

pub(super) fn include(path: &DocPath, substring: &str, actual: &Value) -> Option<Mismatch> {
    if text(actual).is_some_and(|s| s.contains(substring)) {
        return None;
    }
    Some(
        Mismatch::new(
            path.to_string(),
            format!("Expected {} to include '{}'", value_of(actual), substring),
        )
        .with_expected(Value::String(substring.to_string()))
        .with_actual(actual.clone()),
    )
}
