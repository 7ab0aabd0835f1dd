//! Numeric and boolean matchers. Each also accepts a string holding a value
//! of the right kind.

use crate::mismatch::Mismatch;
use crate::path::DocPath;
use crate::render::{type_of, value_of};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").expect("integer regex"));
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d*\.\d+$").expect("decimal regex"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("number regex"));

fn failure(path: &DocPath, actual: &Value, kind: &str) -> Option<Mismatch> {
    Some(
        Mismatch::new(
            path.to_string(),
            format!("Expected {} ({}) to be {}", value_of(actual), type_of(actual), kind),
        )
        .with_actual(actual.clone()),
    )
}

pub(super) fn number(path: &DocPath, actual: &Value) -> Option<Mismatch> {
    match actual {
        Value::Number(_) => None,
        Value::String(s) if NUMBER.is_match(s) => None,
        _ => failure(path, actual, "a number"),
    }
}

pub(super) fn integer(path: &DocPath, actual: &Value) -> Option<Mismatch> {
    match actual {
        Value::Number(n) if n.is_i64() || n.is_u64() => None,
        Value::String(s) if INTEGER.is_match(s) => None,
        _ => failure(path, actual, "an integer"),
    }
}

pub(super) fn decimal(path: &DocPath, actual: &Value) -> Option<Mismatch> {
    match actual {
        Value::Number(n) if n.is_f64() => None,
        Value::String(s) if DECIMAL.is_match(s) => None,
        _ => failure(path, actual, "a decimal number"),
    }
}

pub(super) fn boolean(path: &DocPath, actual: &Value) -> Option<Mismatch> {
    match actual {
        Value::Bool(_) => None,
        Value::String(s) if s == "true" || s == "false" => None,
        _ => failure(path, actual, "a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> DocPath {
        DocPath::root().join("n")
    }

    #[test]
    fn test_number() {
        assert!(number(&path(), &json!(1)).is_none());
        assert!(number(&path(), &json!(-1.5)).is_none());
        assert!(number(&path(), &json!("1e10")).is_none());
        assert!(number(&path(), &json!("NaN")).is_some());
        assert!(number(&path(), &json!(true)).is_some());
    }

    #[test]
    fn test_integer() {
        assert!(integer(&path(), &json!(42)).is_none());
        assert!(integer(&path(), &json!("-42")).is_none());
        assert!(integer(&path(), &json!(u64::MAX)).is_none());
        assert_eq!(
            integer(&path(), &json!(4.2)).unwrap().message,
            "Expected 4.2 (Decimal) to be an integer"
        );
        assert!(integer(&path(), &json!("4.2")).is_some());
    }

    #[test]
    fn test_decimal() {
        assert!(decimal(&path(), &json!(1.25)).is_none());
        assert!(decimal(&path(), &json!("1.25")).is_none());
        assert!(decimal(&path(), &json!(".5")).is_none());
        assert_eq!(
            decimal(&path(), &json!(1)).unwrap().message,
            "Expected 1 (Integer) to be a decimal number"
        );
        assert!(decimal(&path(), &json!("1")).is_some());
    }

    #[test]
    fn test_boolean() {
        assert!(boolean(&path(), &json!(false)).is_none());
        assert!(boolean(&path(), &json!("true")).is_none());
        assert_eq!(
            boolean(&path(), &json!("yes")).unwrap().message,
            "Expected 'yes' (String) to be a boolean"
        );
    }
}
