//! JSON representation of matching rules.
//!
//! V3 and later use the `{"match": "<kind>", ...}` form. The legacy V2 form
//! (`{"regex": "..."}`, `{"min": 1}`) is still accepted when parsing.

use super::{ArrayContainsVariant, MatchingRule, MatchingRuleCategory, MatchingRuleDefinition, SpecVersion};
use crate::error::RuleError;
use crate::generators::Generator;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

fn bound(map: &Map<String, Value>, key: &str) -> Result<Option<usize>, RuleError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| RuleError::InvalidDefinition(format!("'{key}' must be a non-negative integer, got {value}"))),
    }
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &str, kind: &str) -> Result<&'a str, RuleError> {
    map.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RuleError::InvalidDefinition(format!("{kind} matcher requires a '{key}' attribute")))
}

/// `format` is the current attribute name; the older form keyed the format
/// by the matcher kind.
fn temporal_format(map: &Map<String, Value>, legacy_key: &str) -> Option<String> {
    map.get("format")
        .or_else(|| map.get(legacy_key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn definition_from_json(map: &Map<String, Value>) -> Result<MatchingRuleDefinition, RuleError> {
    let rules = match map.get("rules") {
        None => Vec::new(),
        Some(Value::Array(rules)) => rules
            .iter()
            .map(MatchingRule::from_json)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(RuleError::InvalidDefinition(format!(
                "'rules' must be a list, got {other}"
            )))
        }
    };
    let generator = map.get("generator").map(Generator::from_json).transpose()?;
    Ok(MatchingRuleDefinition {
        value: map.get("value").cloned(),
        rules,
        generator,
    })
}

fn definition_to_json(kind: &str, definition: &MatchingRuleDefinition, spec: SpecVersion) -> Value {
    let mut map = Map::new();
    map.insert("match".to_string(), json!(kind));
    map.insert(
        "rules".to_string(),
        Value::Array(definition.rules.iter().map(|rule| rule.to_json(spec)).collect()),
    );
    if let Some(value) = &definition.value {
        map.insert("value".to_string(), value.clone());
    }
    if let Some(generator) = &definition.generator {
        map.insert("generator".to_string(), generator.to_json());
    }
    Value::Object(map)
}

fn variant_from_json(value: &Value) -> Result<ArrayContainsVariant, RuleError> {
    let map = value
        .as_object()
        .ok_or_else(|| RuleError::InvalidDefinition(format!("array-contains variant must be an object, got {value}")))?;
    let index = bound(map, "index")?.ok_or_else(|| {
        RuleError::InvalidDefinition("array-contains variant requires an 'index'".to_string())
    })?;
    let rules = match map.get("rules") {
        Some(rules) => MatchingRuleCategory::from_json("body", rules)?,
        None => MatchingRuleCategory::body(),
    };
    let mut generators = BTreeMap::new();
    if let Some(defined) = map.get("generators") {
        let defined = defined.as_object().ok_or_else(|| {
            RuleError::InvalidDefinition(format!("array-contains generators must be an object, got {defined}"))
        })?;
        for (path, generator) in defined {
            generators.insert(path.clone(), Generator::from_json(generator)?);
        }
    }
    Ok(ArrayContainsVariant {
        index,
        rules,
        generators,
    })
}

impl MatchingRule {
    /// Parse a single matcher definition.
    pub fn from_json(value: &Value) -> Result<Self, RuleError> {
        let map = value
            .as_object()
            .ok_or_else(|| RuleError::InvalidDefinition(format!("matcher must be a JSON object, got {value}")))?;

        let Some(kind) = map.get("match").and_then(Value::as_str) else {
            return Self::from_legacy_json(map);
        };

        let rule = match kind {
            "equality" => MatchingRule::Equality,
            "type" | "min" | "max" => {
                let min = bound(map, "min")?;
                let max = bound(map, "max")?;
                if min.is_none() && max.is_none() {
                    MatchingRule::Type
                } else {
                    MatchingRule::MinMaxType { min, max }
                }
            }
            "regex" => MatchingRule::regex(required_str(map, "regex", kind)?)?,
            "include" => MatchingRule::Include(required_str(map, "value", kind)?.to_string()),
            "number" => MatchingRule::Number,
            "integer" => MatchingRule::Integer,
            "decimal" | "real" => MatchingRule::Decimal,
            "boolean" => MatchingRule::Boolean,
            "null" => MatchingRule::Null,
            "notEmpty" | "not-empty" => MatchingRule::NotEmpty,
            "date" => MatchingRule::Date(temporal_format(map, "date")),
            "time" => MatchingRule::Time(temporal_format(map, "time")),
            "timestamp" | "datetime" => MatchingRule::Timestamp(
                temporal_format(map, "timestamp").or_else(|| temporal_format(map, "datetime")),
            ),
            "values" => MatchingRule::Values,
            "eachKey" | "each-key" => MatchingRule::EachKey(definition_from_json(map)?),
            "eachValue" | "each-value" => MatchingRule::EachValue(definition_from_json(map)?),
            "arrayContains" | "array-contains" => {
                let variants = match map.get("variants") {
                    Some(Value::Array(variants)) => variants
                        .iter()
                        .map(variant_from_json)
                        .collect::<Result<Vec<_>, _>>()?,
                    None => Vec::new(),
                    Some(other) => {
                        return Err(RuleError::InvalidDefinition(format!(
                            "'variants' must be a list, got {other}"
                        )))
                    }
                };
                MatchingRule::ArrayContains(variants)
            }
            other => return Err(RuleError::UnknownMatcher(other.to_string())),
        };
        Ok(rule)
    }

    fn from_legacy_json(map: &Map<String, Value>) -> Result<Self, RuleError> {
        if let Some(pattern) = map.get("regex").and_then(Value::as_str) {
            return MatchingRule::regex(pattern);
        }
        if map.contains_key("min") || map.contains_key("max") {
            return Ok(MatchingRule::MinMaxType {
                min: bound(map, "min")?,
                max: bound(map, "max")?,
            });
        }
        if let Some(format) = map.get("timestamp").and_then(Value::as_str) {
            return Ok(MatchingRule::Timestamp(Some(format.to_string())));
        }
        if let Some(format) = map.get("date").and_then(Value::as_str) {
            return Ok(MatchingRule::Date(Some(format.to_string())));
        }
        if let Some(format) = map.get("time").and_then(Value::as_str) {
            return Ok(MatchingRule::Time(Some(format.to_string())));
        }
        Err(RuleError::InvalidDefinition(format!(
            "matcher has no 'match' attribute: {}",
            Value::Object(map.clone())
        )))
    }

    pub fn to_json(&self, spec: SpecVersion) -> Value {
        match self {
            MatchingRule::MinMaxType { min, max } => {
                let mut map = Map::new();
                if spec >= SpecVersion::V3 {
                    map.insert("match".to_string(), json!("type"));
                }
                if let Some(min) = min {
                    map.insert("min".to_string(), json!(min));
                }
                if let Some(max) = max {
                    map.insert("max".to_string(), json!(max));
                }
                Value::Object(map)
            }
            MatchingRule::Regex(pattern) => json!({"match": "regex", "regex": pattern.as_str()}),
            MatchingRule::Include(value) => json!({"match": "include", "value": value}),
            MatchingRule::NotEmpty => json!({"match": "notEmpty"}),
            MatchingRule::Date(format) | MatchingRule::Time(format) | MatchingRule::Timestamp(format) => {
                let mut map = Map::new();
                map.insert("match".to_string(), json!(self.name()));
                if let Some(format) = format {
                    map.insert("format".to_string(), json!(format));
                }
                Value::Object(map)
            }
            MatchingRule::EachKey(definition) => definition_to_json("eachKey", definition, spec),
            MatchingRule::EachValue(definition) => definition_to_json("eachValue", definition, spec),
            MatchingRule::ArrayContains(variants) => {
                let variants: Vec<Value> = variants
                    .iter()
                    .map(|variant| {
                        let generators: Map<String, Value> = variant
                            .generators
                            .iter()
                            .map(|(path, generator)| (path.clone(), generator.to_json()))
                            .collect();
                        json!({
                            "index": variant.index,
                            "rules": variant.rules.to_json(spec),
                            "generators": generators,
                        })
                    })
                    .collect();
                json!({"match": "arrayContains", "variants": variants})
            }
            MatchingRule::Equality
            | MatchingRule::Type
            | MatchingRule::Number
            | MatchingRule::Integer
            | MatchingRule::Decimal
            | MatchingRule::Boolean
            | MatchingRule::Null
            | MatchingRule::Values => json!({"match": self.name()}),
        }
    }
}
