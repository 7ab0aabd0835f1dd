//! Value generators.
//!
//! Generators synthesise example data after matching: random numbers and
//! strings, UUIDs, the current date or time, or values injected from provider
//! state. They are attached to paths the same way matching rules are, and are
//! carried by `EachValue` and `ArrayContains` rule metadata.

mod array_contains;

pub use array_contains::ArrayContainsGenerator;

use crate::error::GeneratorError;
use crate::matchers::temporal::to_chrono_format;
use crate::path::{DocPath, PathExpression};
use crate::rules::{ArrayContainsVariant, MatchingRuleDefinition};
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

static PROVIDER_STATE_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("provider state regex"));

const HEX_DIGITS: &[u8] = b"0123456789abcdef";

/// Significant decimal digits an `f64` holds exactly.
pub const MAX_DECIMAL_DIGITS: usize = 15;

/// A value synthesis function.
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    RandomInt { min: i64, max: i64 },
    RandomDecimal { digits: usize },
    RandomHexadecimal { digits: usize },
    RandomString { size: usize },
    RandomBoolean,
    Uuid,
    Date { format: Option<String> },
    Time { format: Option<String> },
    DateTime { format: Option<String> },
    /// Value looked up from provider state, e.g. `${id}`
    ProviderState { expression: String },
}

/// Inputs available to generators while generating.
#[derive(Debug, Clone, Default)]
pub struct GeneratorContext {
    /// Values supplied by the provider state setup
    pub provider_state: Map<String, Value>,
    /// Variants of the array-contains rule being generated for
    pub array_contains_variants: Vec<ArrayContainsVariant>,
}

impl GeneratorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_state(mut self, provider_state: Map<String, Value>) -> Self {
        self.provider_state = provider_state;
        self
    }

    pub fn with_variants(mut self, variants: Vec<ArrayContainsVariant>) -> Self {
        self.array_contains_variants = variants;
        self
    }
}

fn usize_field(map: &Map<String, Value>, key: &str, default: usize) -> Result<usize, GeneratorError> {
    match map.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| GeneratorError::InvalidDefinition(format!("'{key}' must be a positive integer, got {value}"))),
    }
}

fn i64_field(map: &Map<String, Value>, key: &str, default: i64) -> Result<i64, GeneratorError> {
    match map.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| GeneratorError::InvalidDefinition(format!("'{key}' must be an integer, got {value}"))),
    }
}

fn format_field(map: &Map<String, Value>) -> Option<String> {
    map.get("format").and_then(Value::as_str).map(str::to_string)
}

fn now_formatted(format: Option<&str>, default: &str) -> Result<Value, GeneratorError> {
    let pattern = match format {
        Some(java) => to_chrono_format(java).ok_or_else(|| GeneratorError::InvalidFormat(java.to_string()))?,
        None => default.to_string(),
    };
    Ok(Value::String(chrono::Local::now().format(&pattern).to_string()))
}

impl Generator {
    /// Type name used in serialised form.
    pub fn type_name(&self) -> &'static str {
        match self {
            Generator::RandomInt { .. } => "RandomInt",
            Generator::RandomDecimal { .. } => "RandomDecimal",
            Generator::RandomHexadecimal { .. } => "RandomHexadecimal",
            Generator::RandomString { .. } => "RandomString",
            Generator::RandomBoolean => "RandomBoolean",
            Generator::Uuid => "Uuid",
            Generator::Date { .. } => "Date",
            Generator::Time { .. } => "Time",
            Generator::DateTime { .. } => "DateTime",
            Generator::ProviderState { .. } => "ProviderState",
        }
    }

    /// Parse a generator from `{"type": "RandomInt", "min": 0, "max": 10}` form.
    pub fn from_json(value: &Value) -> Result<Self, GeneratorError> {
        let map = value
            .as_object()
            .ok_or_else(|| GeneratorError::InvalidDefinition(format!("expected a JSON object, got {value}")))?;
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeneratorError::InvalidDefinition("missing 'type' attribute".to_string()))?;

        let generator = match kind {
            "RandomInt" => {
                let min = i64_field(map, "min", 0)?;
                let max = i64_field(map, "max", i64::from(i32::MAX))?;
                if min > max {
                    return Err(GeneratorError::InvalidDefinition(format!(
                        "RandomInt min {min} is greater than max {max}"
                    )));
                }
                Generator::RandomInt { min, max }
            }
            "RandomDecimal" => {
                let digits = usize_field(map, "digits", 10)?;
                check_decimal_digits(digits)?;
                Generator::RandomDecimal { digits }
            }
            "RandomHexadecimal" => Generator::RandomHexadecimal {
                digits: usize_field(map, "digits", 10)?,
            },
            "RandomString" => Generator::RandomString {
                size: usize_field(map, "size", 20)?,
            },
            "RandomBoolean" => Generator::RandomBoolean,
            "Uuid" => Generator::Uuid,
            "Date" => Generator::Date {
                format: format_field(map),
            },
            "Time" => Generator::Time {
                format: format_field(map),
            },
            "DateTime" | "Timestamp" => Generator::DateTime {
                format: format_field(map),
            },
            "ProviderState" => Generator::ProviderState {
                expression: map
                    .get("expression")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        GeneratorError::InvalidDefinition("ProviderState requires an 'expression'".to_string())
                    })?
                    .to_string(),
            },
            other => return Err(GeneratorError::UnknownGenerator(other.to_string())),
        };
        Ok(generator)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), json!(self.type_name()));
        match self {
            Generator::RandomInt { min, max } => {
                map.insert("min".to_string(), json!(min));
                map.insert("max".to_string(), json!(max));
            }
            Generator::RandomDecimal { digits } | Generator::RandomHexadecimal { digits } => {
                map.insert("digits".to_string(), json!(digits));
            }
            Generator::RandomString { size } => {
                map.insert("size".to_string(), json!(size));
            }
            Generator::Date { format } | Generator::Time { format } | Generator::DateTime { format } => {
                if let Some(format) = format {
                    map.insert("format".to_string(), json!(format));
                }
            }
            Generator::ProviderState { expression } => {
                map.insert("expression".to_string(), json!(expression));
            }
            Generator::RandomBoolean | Generator::Uuid => {}
        }
        Value::Object(map)
    }

    /// Produce a value. The example is the value currently at the location
    /// being generated for. A provider-state generator whose state value is
    /// missing falls back to a non-null example.
    pub fn generate(&self, context: &GeneratorContext, example: &Value) -> Result<Value, GeneratorError> {
        let mut rng = rand::thread_rng();
        let value = match self {
            Generator::RandomInt { min, max } => {
                if min > max {
                    return Err(GeneratorError::InvalidDefinition(format!(
                        "RandomInt min {min} is greater than max {max}"
                    )));
                }
                json!(rng.gen_range(*min..=*max))
            }
            Generator::RandomDecimal { digits } => random_decimal(&mut rng, *digits)?,
            Generator::RandomHexadecimal { digits } => Value::String(
                (0..*digits)
                    .map(|_| char::from(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())]))
                    .collect(),
            ),
            Generator::RandomString { size } => Value::String(
                (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(*size)
                    .map(char::from)
                    .collect(),
            ),
            Generator::RandomBoolean => Value::Bool(rng.gen()),
            Generator::Uuid => Value::String(uuid::Uuid::new_v4().to_string()),
            Generator::Date { format } => now_formatted(format.as_deref(), "%Y-%m-%d")?,
            Generator::Time { format } => now_formatted(format.as_deref(), "%H:%M:%S")?,
            Generator::DateTime { format } => now_formatted(format.as_deref(), "%Y-%m-%dT%H:%M:%S%:z")?,
            Generator::ProviderState { expression } => {
                match provider_state_value(expression, &context.provider_state) {
                    Err(GeneratorError::MissingProviderState(key)) if !example.is_null() => {
                        warn!("No provider state value for '{}', keeping the example value", key);
                        example.clone()
                    }
                    result => result?,
                }
            }
        };
        Ok(value)
    }
}

fn check_decimal_digits(digits: usize) -> Result<(), GeneratorError> {
    if digits > MAX_DECIMAL_DIGITS {
        return Err(GeneratorError::InvalidDefinition(format!(
            "RandomDecimal supports at most {MAX_DECIMAL_DIGITS} digits, got {digits}"
        )));
    }
    Ok(())
}

fn random_decimal(rng: &mut impl Rng, digits: usize) -> Result<Value, GeneratorError> {
    check_decimal_digits(digits)?;
    let digits = digits.max(2);
    let mut text: String = (0..digits)
        .map(|i| {
            let low = if i == 0 { 1 } else { 0 };
            char::from(b'0' + rng.gen_range(low..10u8))
        })
        .collect();
    let point = rng.gen_range(1..digits);
    text.insert(point, '.');
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| GeneratorError::InvalidDefinition(format!("'{text}' is not a valid decimal")))
}

/// Resolve a provider state expression. An expression that is exactly one
/// `${name}` reference yields the state value with its type intact; anything
/// else is string interpolation.
fn provider_state_value(expression: &str, state: &Map<String, Value>) -> Result<Value, GeneratorError> {
    if let Some(captures) = PROVIDER_STATE_EXPRESSION.captures(expression) {
        if let Some(whole) = captures.get(0) {
            if whole.as_str() == expression {
                let key = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                return state
                    .get(key)
                    .cloned()
                    .ok_or_else(|| GeneratorError::MissingProviderState(key.to_string()));
            }
        }
    }

    let mut output = String::new();
    let mut last = 0;
    for captures in PROVIDER_STATE_EXPRESSION.captures_iter(expression) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = state
            .get(key.as_str())
            .ok_or_else(|| GeneratorError::MissingProviderState(key.as_str().to_string()))?;
        output.push_str(&expression[last..whole.start()]);
        output.push_str(&crate::render::as_text(value));
        last = whole.end();
    }
    output.push_str(&expression[last..]);
    Ok(Value::String(output))
}

fn apply_at(
    value: &mut Value,
    path: &DocPath,
    expression: &PathExpression,
    generator: &Generator,
    context: &GeneratorContext,
) -> Result<(), GeneratorError> {
    let prefix_matches = path.len() <= expression.len()
        && expression
            .segments()
            .iter()
            .zip(path.tokens())
            .all(|(segment, token)| segment.matches(token));
    if !prefix_matches {
        return Ok(());
    }
    if path.len() == expression.len() {
        *value = generator.generate(context, value)?;
        return Ok(());
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                apply_at(child, &path.join(key.as_str()), expression, generator, context)?;
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                apply_at(child, &path.join_index(index), expression, generator, context)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Apply each generator at every location of `value` its path expression
/// addresses. Expressions are rooted at `$`.
pub fn apply_generators(
    value: &mut Value,
    generators: &BTreeMap<String, Generator>,
    context: &GeneratorContext,
) -> Result<(), GeneratorError> {
    for (key, generator) in generators {
        let expression = PathExpression::parse(key)?;
        debug!("Applying generator {} at {}", generator.type_name(), key);
        apply_at(value, &DocPath::root(), &expression, generator, context)?;
    }
    Ok(())
}

/// Run an each-value generator over every child of an object or array. The
/// seed passed to the generator is the definition's literal value when
/// present, and the child otherwise. Scalars are returned unchanged.
pub fn generate_each_value(
    definition: &MatchingRuleDefinition,
    value: &Value,
    context: &GeneratorContext,
) -> Result<Value, GeneratorError> {
    let Some(generator) = &definition.generator else {
        return Ok(value.clone());
    };

    let mut generated = value.clone();
    match &mut generated {
        Value::Object(map) => {
            for child in map.values_mut() {
                let seed = definition.value.as_ref().unwrap_or(child);
                *child = generator.generate(context, seed)?;
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                let seed = definition.value.as_ref().unwrap_or(child);
                *child = generator.generate(context, seed)?;
            }
        }
        _ => {}
    }
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_json_forms() {
        let generator = Generator::from_json(&json!({"type": "RandomInt", "min": 1, "max": 5})).unwrap();
        assert_eq!(generator, Generator::RandomInt { min: 1, max: 5 });
        assert_eq!(generator.to_json(), json!({"type": "RandomInt", "min": 1, "max": 5}));

        let date = Generator::from_json(&json!({"type": "Date", "format": "yyyy-MM-dd"})).unwrap();
        assert_eq!(
            date,
            Generator::Date {
                format: Some("yyyy-MM-dd".to_string())
            }
        );

        assert!(matches!(
            Generator::from_json(&json!({"type": "Mystery"})),
            Err(GeneratorError::UnknownGenerator(_))
        ));
        assert!(Generator::from_json(&json!({"type": "RandomInt", "min": 9, "max": 1})).is_err());
        assert!(Generator::from_json(&json!("RandomInt")).is_err());
    }

    #[test]
    fn test_random_values_respect_parameters() {
        let ctx = GeneratorContext::new();
        for _ in 0..20 {
            let n = Generator::RandomInt { min: 3, max: 4 }
                .generate(&ctx, &Value::Null)
                .unwrap();
            let n = n.as_i64().unwrap();
            assert!((3..=4).contains(&n));
        }

        let s = Generator::RandomString { size: 12 }.generate(&ctx, &Value::Null).unwrap();
        assert_eq!(s.as_str().unwrap().len(), 12);

        let hex = Generator::RandomHexadecimal { digits: 8 }
            .generate(&ctx, &Value::Null)
            .unwrap();
        assert!(hex.as_str().unwrap().chars().all(|c| c.is_ascii_hexdigit()));

        let decimal = Generator::RandomDecimal { digits: 6 }
            .generate(&ctx, &Value::Null)
            .unwrap();
        assert!(decimal.is_f64());

        let uuid = Generator::Uuid.generate(&ctx, &Value::Null).unwrap();
        assert!(uuid::Uuid::parse_str(uuid.as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_random_decimal_digit_limit() {
        let ctx = GeneratorContext::new();
        let result = Generator::RandomDecimal { digits: 1000 }.generate(&ctx, &Value::Null);
        assert!(matches!(result, Err(GeneratorError::InvalidDefinition(_))));
        assert!(Generator::from_json(&json!({"type": "RandomDecimal", "digits": 1000})).is_err());

        for _ in 0..50 {
            let decimal = Generator::RandomDecimal {
                digits: MAX_DECIMAL_DIGITS,
            }
            .generate(&ctx, &Value::Null)
            .unwrap();
            assert!(decimal.is_f64());
        }
    }

    #[test]
    fn test_random_int_with_inverted_bounds() {
        let result = Generator::RandomInt { min: 5, max: 1 }.generate(&GeneratorContext::new(), &Value::Null);
        assert!(matches!(result, Err(GeneratorError::InvalidDefinition(_))));
    }

    #[test]
    fn test_date_generator_uses_format() {
        let ctx = GeneratorContext::new();
        let date = Generator::Date {
            format: Some("yyyy/MM/dd".to_string()),
        }
        .generate(&ctx, &Value::Null)
        .unwrap();
        assert!(chrono::NaiveDate::parse_from_str(date.as_str().unwrap(), "%Y/%m/%d").is_ok());
    }

    #[test]
    fn test_provider_state_generator() {
        let mut state = Map::new();
        state.insert("id".to_string(), json!(42));
        state.insert("name".to_string(), json!("widget"));
        let ctx = GeneratorContext::new().with_provider_state(state);

        let typed = Generator::ProviderState {
            expression: "${id}".to_string(),
        };
        assert_eq!(typed.generate(&ctx, &Value::Null).unwrap(), json!(42));

        let interpolated = Generator::ProviderState {
            expression: "/items/${id}/${name}".to_string(),
        };
        assert_eq!(
            interpolated.generate(&ctx, &Value::Null).unwrap(),
            json!("/items/42/widget")
        );

        let missing = Generator::ProviderState {
            expression: "${nope}".to_string(),
        };
        assert_eq!(
            missing.generate(&ctx, &Value::Null),
            Err(GeneratorError::MissingProviderState("nope".to_string()))
        );
        assert_eq!(missing.generate(&ctx, &json!(7)).unwrap(), json!(7));

        let partly_missing = Generator::ProviderState {
            expression: "/items/${nope}".to_string(),
        };
        assert_eq!(
            partly_missing.generate(&ctx, &json!("/items/1")).unwrap(),
            json!("/items/1")
        );
    }

    #[test]
    fn test_apply_generators_at_wildcard_paths() {
        let mut value = json!({"items": [{"id": 1}, {"id": 2}], "other": 0});
        let mut generators = BTreeMap::new();
        generators.insert("$.items[*].id".to_string(), Generator::RandomInt { min: 100, max: 100 });

        apply_generators(&mut value, &generators, &GeneratorContext::new()).unwrap();
        assert_eq!(value, json!({"items": [{"id": 100}, {"id": 100}], "other": 0}));
    }

    #[test]
    fn test_generate_each_value() {
        let definition = MatchingRuleDefinition {
            value: None,
            rules: Vec::new(),
            generator: Some(Generator::RandomInt { min: 7, max: 7 }),
        };
        let generated =
            generate_each_value(&definition, &json!({"a": 1, "b": 2}), &GeneratorContext::new()).unwrap();
        assert_eq!(generated, json!({"a": 7, "b": 7}));

        let generated = generate_each_value(&definition, &json!([0, 0, 0]), &GeneratorContext::new()).unwrap();
        assert_eq!(generated, json!([7, 7, 7]));

        let scalar = generate_each_value(&definition, &json!("x"), &GeneratorContext::new()).unwrap();
        assert_eq!(scalar, json!("x"));
    }

    #[test]
    fn test_generate_each_value_seed() {
        let generator = Generator::ProviderState {
            expression: "${status}".to_string(),
        };
        let seeded = MatchingRuleDefinition {
            value: Some(json!("unknown")),
            rules: Vec::new(),
            generator: Some(generator.clone()),
        };
        let unseeded = MatchingRuleDefinition {
            value: None,
            rules: Vec::new(),
            generator: Some(generator),
        };
        let actual = json!({"a": "open", "b": "closed"});
        let ctx = GeneratorContext::new();

        assert_eq!(
            generate_each_value(&seeded, &actual, &ctx).unwrap(),
            json!({"a": "unknown", "b": "unknown"})
        );
        assert_eq!(generate_each_value(&unseeded, &actual, &ctx).unwrap(), actual);

        let mut state = Map::new();
        state.insert("status".to_string(), json!("shipped"));
        let ctx = GeneratorContext::new().with_provider_state(state);
        assert_eq!(
            generate_each_value(&seeded, &actual, &ctx).unwrap(),
            json!({"a": "shipped", "b": "shipped"})
        );
    }
}
