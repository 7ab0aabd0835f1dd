use super::{MatchingRule, RuleGroup, RuleLogic, SpecVersion};
use crate::error::RuleError;
use crate::path::PathExpression;
use serde_json::{json, Map, Value};

/// The rules registered at one path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntry {
    /// The expression as written
    pub expression: String,
    pub path: PathExpression,
    pub group: RuleGroup,
}

/// Path-scoped rules for one part of an interaction, e.g. `body`.
/// Entries keep their registration order, which breaks specificity ties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchingRuleCategory {
    pub name: String,
    entries: Vec<RuleEntry>,
}

impl MatchingRuleCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn body() -> Self {
        Self::new("body")
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The group registered at exactly this expression string.
    pub fn get(&self, expression: &str) -> Option<&RuleGroup> {
        self.entries
            .iter()
            .find(|entry| entry.expression == expression)
            .map(|entry| &entry.group)
    }

    pub fn add_rule(&mut self, expression: &str, rule: MatchingRule) -> Result<(), RuleError> {
        self.add_rules(expression, vec![rule], RuleLogic::And)
    }

    /// Register rules at an expression. Rules for an expression that is
    /// already registered are appended to its group, keeping its logic.
    pub fn add_rules(
        &mut self,
        expression: &str,
        rules: Vec<MatchingRule>,
        logic: RuleLogic,
    ) -> Result<(), RuleError> {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.expression == expression) {
            entry.group.rules.extend(rules);
            return Ok(());
        }
        let path = PathExpression::parse(expression)?;
        self.entries.push(RuleEntry {
            expression: expression.to_string(),
            path,
            group: RuleGroup::new(rules, logic),
        });
        Ok(())
    }

    /// Register rules as their own entry ahead of every existing one. The
    /// group never merges with a group already at the same expression, and
    /// wins ties against it.
    pub fn prepend_rules_at(&mut self, path: PathExpression, rules: Vec<MatchingRule>, logic: RuleLogic) {
        self.entries.insert(
            0,
            RuleEntry {
                expression: path.to_string(),
                path,
                group: RuleGroup::new(rules, logic),
            },
        );
    }

    /// Builder form of [`add_rule`](Self::add_rule).
    pub fn with_rule(mut self, expression: &str, rule: MatchingRule) -> Result<Self, RuleError> {
        self.add_rule(expression, rule)?;
        Ok(self)
    }

    /// Parse `{ "$.path": { "combine": "AND", "matchers": [...] } }`. A value
    /// with no `matchers` key is read as a single matcher definition.
    pub fn from_json(name: impl Into<String>, value: &Value) -> Result<Self, RuleError> {
        let mut category = Self::new(name);
        let map = value.as_object().ok_or_else(|| {
            RuleError::InvalidDefinition(format!("rule category must be a JSON object, got {value}"))
        })?;

        for (expression, definition) in map {
            let (rules, logic) = match definition.get("matchers") {
                Some(Value::Array(matchers)) => {
                    let rules = matchers
                        .iter()
                        .map(MatchingRule::from_json)
                        .collect::<Result<Vec<_>, _>>()?;
                    let logic = match definition.get("combine").and_then(Value::as_str) {
                        None => RuleLogic::And,
                        Some(combine) if combine.eq_ignore_ascii_case("and") => RuleLogic::And,
                        Some(combine) if combine.eq_ignore_ascii_case("or") => RuleLogic::Or,
                        Some(combine) => {
                            return Err(RuleError::InvalidDefinition(format!(
                                "unknown combine '{combine}' for '{expression}'"
                            )))
                        }
                    };
                    (rules, logic)
                }
                Some(other) => {
                    return Err(RuleError::InvalidDefinition(format!(
                        "'matchers' for '{expression}' must be a list, got {other}"
                    )))
                }
                None => (vec![MatchingRule::from_json(definition)?], RuleLogic::And),
            };
            category.add_rules(expression, rules, logic)?;
        }
        Ok(category)
    }

    pub fn to_json(&self, spec: SpecVersion) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            let matchers: Vec<Value> = entry.group.rules.iter().map(|rule| rule.to_json(spec)).collect();
            let mut group = json!({ "matchers": matchers });
            if entry.group.logic == RuleLogic::Or {
                group["combine"] = json!("OR");
            }
            map.insert(entry.expression.clone(), group);
        }
        Value::Object(map)
    }

    /// Version errors for every registered rule, prefixed by its expression.
    pub fn validate_for_version(&self, spec: SpecVersion) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .group
                    .rules
                    .iter()
                    .flat_map(move |rule| rule.validate_for_version(spec))
                    .map(move |error| format!("{}: {}", entry.expression, error))
            })
            .collect()
    }
}
