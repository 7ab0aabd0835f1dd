//! Matching rules.
//!
//! A [`MatchingRule`] is a declarative comparison policy that overrides
//! default equality at a path. Rules are grouped per path expression into a
//! [`RuleGroup`], and groups are collected into a [`MatchingRuleCategory`]
//! (usually the `body` category).
//!
//! The rule set is closed: every variant has exactly one evaluation arm in
//! [`crate::matchers`].

mod category;
mod json;
mod version;

pub use category::{MatchingRuleCategory, RuleEntry};
pub use version::SpecVersion;

use crate::error::RuleError;
use crate::generators::Generator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A regular expression compiled once at construction.
///
/// The compiled form is anchored at both ends, so a match always covers the
/// whole input.
#[derive(Clone)]
pub struct RegexPattern {
    source: String,
    compiled: Arc<Regex>,
}

impl RegexPattern {
    pub fn new(source: impl Into<String>) -> Result<Self, RuleError> {
        let source = source.into();
        let compiled = Regex::new(&format!("^(?:{source})$")).map_err(|e| RuleError::InvalidRegex {
            pattern: source.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source,
            compiled: Arc::new(compiled),
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegexPattern").field(&self.source).finish()
    }
}

/// Nested rules carried by `EachKey` and `EachValue`, with an optional
/// example value and generator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchingRuleDefinition {
    pub value: Option<Value>,
    pub rules: Vec<MatchingRule>,
    pub generator: Option<Generator>,
}

impl MatchingRuleDefinition {
    pub fn new(rules: Vec<MatchingRule>) -> Self {
        Self {
            value: None,
            rules,
            generator: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }
}

/// One allowed element shape of an array-contains rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayContainsVariant {
    /// Index of the example element in the expected array
    pub index: usize,
    /// Rules applied to an element, rooted at `$`
    pub rules: MatchingRuleCategory,
    /// Generators applied to an element of this shape, rooted at `$`
    pub generators: BTreeMap<String, Generator>,
}

impl ArrayContainsVariant {
    pub fn new(index: usize, rules: MatchingRuleCategory) -> Self {
        Self {
            index,
            rules,
            generators: BTreeMap::new(),
        }
    }
}

/// A declarative comparison policy.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchingRule {
    Equality,
    Type,
    MinMaxType {
        min: Option<usize>,
        max: Option<usize>,
    },
    Regex(RegexPattern),
    Include(String),
    Number,
    Integer,
    Decimal,
    Boolean,
    Null,
    NotEmpty,
    Date(Option<String>),
    Time(Option<String>),
    Timestamp(Option<String>),
    Values,
    EachKey(MatchingRuleDefinition),
    EachValue(MatchingRuleDefinition),
    ArrayContains(Vec<ArrayContainsVariant>),
}

impl MatchingRule {
    pub fn regex(pattern: impl Into<String>) -> Result<Self, RuleError> {
        RegexPattern::new(pattern).map(MatchingRule::Regex)
    }

    pub fn min(min: usize) -> Self {
        MatchingRule::MinMaxType {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: usize) -> Self {
        MatchingRule::MinMaxType {
            min: None,
            max: Some(max),
        }
    }

    pub fn each_value(rules: Vec<MatchingRule>) -> Self {
        MatchingRule::EachValue(MatchingRuleDefinition::new(rules))
    }

    pub fn each_key(rules: Vec<MatchingRule>) -> Self {
        MatchingRule::EachKey(MatchingRuleDefinition::new(rules))
    }

    /// Kind name, e.g. `each-value`.
    pub fn name(&self) -> &'static str {
        match self {
            MatchingRule::Equality => "equality",
            MatchingRule::Type | MatchingRule::MinMaxType { .. } => "type",
            MatchingRule::Regex(_) => "regex",
            MatchingRule::Include(_) => "include",
            MatchingRule::Number => "number",
            MatchingRule::Integer => "integer",
            MatchingRule::Decimal => "decimal",
            MatchingRule::Boolean => "boolean",
            MatchingRule::Null => "null",
            MatchingRule::NotEmpty => "not-empty",
            MatchingRule::Date(_) => "date",
            MatchingRule::Time(_) => "time",
            MatchingRule::Timestamp(_) => "timestamp",
            MatchingRule::Values => "values",
            MatchingRule::EachKey(_) => "each-key",
            MatchingRule::EachValue(_) => "each-value",
            MatchingRule::ArrayContains(_) => "array-contains",
        }
    }

    /// Rules that drive the traversal of the container they are defined on.
    /// They never reach descendants.
    pub fn is_container_rule(&self) -> bool {
        matches!(
            self,
            MatchingRule::Values
                | MatchingRule::EachKey(_)
                | MatchingRule::EachValue(_)
                | MatchingRule::ArrayContains(_)
        )
    }

    /// The form of this rule inherited by descendant paths, if any.
    /// Size bounds only apply where they are declared.
    pub fn cascaded(&self) -> Option<MatchingRule> {
        match self {
            rule if rule.is_container_rule() => None,
            MatchingRule::MinMaxType { .. } => Some(MatchingRule::Type),
            rule => Some(rule.clone()),
        }
    }

    /// Earliest specification version in which this rule is legal.
    pub fn min_version(&self) -> SpecVersion {
        match self {
            MatchingRule::Equality => SpecVersion::V1,
            MatchingRule::Regex(_) | MatchingRule::Type | MatchingRule::MinMaxType { .. } => SpecVersion::V2,
            MatchingRule::Values
            | MatchingRule::Include(_)
            | MatchingRule::Number
            | MatchingRule::Integer
            | MatchingRule::Decimal
            | MatchingRule::Null
            | MatchingRule::Date(_)
            | MatchingRule::Time(_)
            | MatchingRule::Timestamp(_) => SpecVersion::V3,
            MatchingRule::EachKey(_)
            | MatchingRule::EachValue(_)
            | MatchingRule::ArrayContains(_)
            | MatchingRule::NotEmpty
            | MatchingRule::Boolean => SpecVersion::V4,
        }
    }

    /// Version compatibility errors for this rule and any rules nested in it.
    pub fn validate_for_version(&self, spec: SpecVersion) -> Vec<String> {
        let mut errors = Vec::new();
        let required = self.min_version();
        if spec < required {
            errors.push(format!(
                "{} matchers can only be used with specification versions >= {}",
                self.name(),
                required
            ));
        }

        match self {
            MatchingRule::EachKey(definition) | MatchingRule::EachValue(definition) => {
                for rule in &definition.rules {
                    errors.extend(rule.validate_for_version(spec));
                }
            }
            MatchingRule::ArrayContains(variants) => {
                for variant in variants {
                    errors.extend(variant.rules.validate_for_version(spec));
                }
            }
            _ => {}
        }
        errors
    }
}

/// How the rules of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleLogic {
    /// Every rule must pass
    #[default]
    And,
    /// One passing rule is enough
    Or,
}

/// The rules active at one path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleGroup {
    pub rules: Vec<MatchingRule>,
    pub logic: RuleLogic,
    /// The group was inherited from an ancestor path
    pub cascaded: bool,
}

impl RuleGroup {
    pub fn new(rules: Vec<MatchingRule>, logic: RuleLogic) -> Self {
        Self {
            rules,
            logic,
            cascaded: false,
        }
    }

    pub fn and(rules: Vec<MatchingRule>) -> Self {
        Self::new(rules, RuleLogic::And)
    }

    pub fn or(rules: Vec<MatchingRule>) -> Self {
        Self::new(rules, RuleLogic::Or)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn has_container_rule(&self) -> bool {
        self.rules.iter().any(MatchingRule::is_container_rule)
    }

    /// The part of this group inherited by descendants.
    pub fn cascaded_part(&self) -> RuleGroup {
        RuleGroup {
            rules: self.rules.iter().filter_map(MatchingRule::cascaded).collect(),
            logic: self.logic,
            cascaded: true,
        }
    }
}
