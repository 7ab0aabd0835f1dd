//! Generation for array-contains rules.

use super::{apply_generators, GeneratorContext};
use crate::context::MatchingContext;
use crate::error::GeneratorError;
use crate::json::JsonContentMatcher;
use crate::path::DocPath;
use crate::rules::ArrayContainsVariant;
use serde_json::Value;
use tracing::debug;

/// Applies the generators of the variant each array element conforms to.
///
/// Variants are chosen by structure: an element belongs to the first variant
/// whose rules accept the element compared against itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayContainsGenerator;

impl ArrayContainsGenerator {
    pub fn generate(&self, context: &GeneratorContext, example: &Value) -> Result<Value, GeneratorError> {
        let Value::Array(items) = example else {
            return Err(GeneratorError::NotAList);
        };

        let mut generated = Vec::with_capacity(items.len());
        for item in items {
            match find_matching_variant(item, &context.array_contains_variants) {
                Some(variant) => {
                    debug!("Generating values for variant {} and value {}", variant.index, item);
                    let mut value = item.clone();
                    apply_generators(&mut value, &variant.generators, context)?;
                    debug!("Generated value {}", value);
                    generated.push(value);
                }
                None => generated.push(item.clone()),
            }
        }
        Ok(Value::Array(generated))
    }
}

fn find_matching_variant<'a>(
    example: &Value,
    variants: &'a [ArrayContainsVariant],
) -> Option<&'a ArrayContainsVariant> {
    variants.iter().find(|variant| {
        debug!("Comparing variant {} with value '{}'", variant.index, example);
        let context = MatchingContext::new(variant.rules.clone(), true);
        let results = JsonContentMatcher::compare(&DocPath::root(), example, example, &context);
        results.iter().all(|item| item.result.is_empty())
    })
}
