//! Rendering of tree values inside mismatch messages.

use serde_json::Value;

/// Strings are single-quoted, everything else is compact JSON.
pub fn value_of(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/// Runtime type name used in messages.
pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "Map",
        Value::Array(_) => "List",
        Value::Null => "Null",
        Value::String(_) => "String",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_f64() => "Decimal",
        Value::Number(_) => "Integer",
    }
}

/// The string form of a scalar used by text-oriented matchers such as regex.
/// Strings are taken verbatim without quotes.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether two values are of the same shape class. Integers and decimals
/// are both numbers.
pub fn same_type(expected: &Value, actual: &Value) -> bool {
    matches!(
        (expected, actual),
        (Value::Object(_), Value::Object(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Null, Value::Null)
            | (Value::String(_), Value::String(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_of() {
        assert_eq!(value_of(&json!("abc")), "'abc'");
        assert_eq!(value_of(&json!(null)), "null");
        assert_eq!(value_of(&json!([1, 2])), "[1,2]");
        assert_eq!(value_of(&json!({"a": true})), r#"{"a":true}"#);
    }

    #[test]
    fn test_type_of() {
        assert_eq!(type_of(&json!(1)), "Integer");
        assert_eq!(type_of(&json!(1.5)), "Decimal");
        assert_eq!(type_of(&json!({})), "Map");
        assert_eq!(type_of(&json!([])), "List");
        assert_eq!(type_of(&json!(false)), "Boolean");
    }

    #[test]
    fn test_same_type_treats_numbers_alike() {
        assert!(same_type(&json!(1), &json!(2.5)));
        assert!(!same_type(&json!("1"), &json!(1)));
    }
}
