//! Equality and shape matchers.

use crate::diff::generate_diff;
use crate::mismatch::Mismatch;
use crate::path::DocPath;
use crate::render::{type_of, value_of};
use serde_json::Value;

pub(super) fn equality(path: &DocPath, expected: &Value, actual: &Value) -> Option<Mismatch> {
    if expected == actual {
        return None;
    }
    Some(
        Mismatch::new(
            path.to_string(),
            format!(
                "Expected {} ({}) to be equal to {} ({})",
                value_of(actual),
                type_of(actual),
                value_of(expected),
                type_of(expected)
            ),
        )
        .with_values(expected, actual),
    )
}

pub(super) fn same_type(path: &DocPath, expected: &Value, actual: &Value) -> Option<Mismatch> {
    if crate::render::same_type(expected, actual) {
        return None;
    }
    Some(
        Mismatch::new(
            path.to_string(),
            format!(
                "Expected {} ({}) to be the same type as {} ({})",
                value_of(actual),
                type_of(actual),
                value_of(expected),
                type_of(expected)
            ),
        )
        .with_values(expected, actual)
        .with_diff(Some(generate_diff(expected, actual))),
    )
}

/// Size bounds apply to lists only.
pub(super) fn size_bounds(path: &DocPath, actual: &Value, min: Option<usize>, max: Option<usize>) -> Option<Mismatch> {
    let Value::Array(items) = actual else {
        return None;
    };
    let size = items.len();
    let message = match (min, max) {
        (Some(min), _) if size < min => format!(
            "Expected {} (size {}) to have minimum size {}",
            value_of(actual),
            size,
            min
        ),
        (_, Some(max)) if size > max => format!(
            "Expected {} (size {}) to have maximum size {}",
            value_of(actual),
            size,
            max
        ),
        _ => return None,
    };
    Some(Mismatch::new(path.to_string(), message).with_actual(actual.clone()))
}

pub(super) fn null(path: &DocPath, actual: &Value) -> Option<Mismatch> {
    if actual.is_null() {
        return None;
    }
    Some(
        Mismatch::new(
            path.to_string(),
            format!("Expected {} ({}) to be a null value", value_of(actual), type_of(actual)),
        )
        .with_actual(actual.clone()),
    )
}

pub(super) fn not_empty(path: &DocPath, actual: &Value) -> Option<Mismatch> {
    let empty = match actual {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    };
    if !empty {
        return None;
    }
    Some(
        Mismatch::new(
            path.to_string(),
            format!("Expected {} ({}) to not be empty", value_of(actual), type_of(actual)),
        )
        .with_actual(actual.clone()),
    )
}
