//! Restriction registry: loads rule sets at init and evaluates ingredients
//! against them.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use dw_ontology::Ingredient;

use crate::error::Result;
use crate::fields::{ingredient_field, FieldValue};
use crate::schema::{Restriction, Rule, RuleAction, RuleOperator};

#[derive(Debug, Deserialize)]
struct RestrictionsFile {
    #[serde(default)]
    restrictions: Vec<Restriction>,
}

/// Outcome of evaluating one ingredient against one restriction.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// First matching rule had action FAIL
    Fail { reason: String },
    /// First matching rule had action WARN
    Warn { reason: String },
    /// No rule matched
    Pass,
}

/// Registry of restrictions keyed by id, preserving file order.
pub struct RestrictionRegistry {
    by_id: IndexMap<String, Restriction>,
}

impl RestrictionRegistry {
    /// Build an empty registry.
    pub fn empty() -> Self {
        Self {
            by_id: IndexMap::new(),
        }
    }

    /// Load restrictions from a JSON file. A missing file leaves the
    /// registry empty (logged); evaluation then reports UNCERTAIN with
    /// confidence 0.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "restrictions file not found; registry empty");
            return Ok(Self::empty());
        }
        let file: RestrictionsFile = dw_foundation::io::read_json(path)?;
        let mut by_id = IndexMap::new();
        for restriction in file.restrictions {
            by_id.insert(restriction.id.clone(), restriction);
        }
        info!(count = by_id.len(), path = %path.display(), "loaded restrictions");
        Ok(Self { by_id })
    }

    /// Build a registry from in-memory restrictions (fixtures, tests).
    pub fn from_restrictions(restrictions: Vec<Restriction>) -> Self {
        let mut by_id = IndexMap::new();
        for restriction in restrictions {
            by_id.insert(restriction.id.clone(), restriction);
        }
        Self { by_id }
    }

    pub fn get(&self, restriction_id: &str) -> Option<&Restriction> {
        self.by_id.get(restriction_id)
    }

    /// Restriction ids in file order.
    pub fn list_ids(&self) -> Vec<String> {
        self.by_id.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Evaluate one ingredient against one restriction.
    ///
    /// Rules are scanned in order; the first matching predicate decides
    /// the outcome.
    pub fn evaluate(&self, ingredient: &Ingredient, restriction: &Restriction) -> RuleOutcome {
        for rule in &restriction.rules {
            if rule_matches(ingredient, rule) {
                let reason = format!(
                    "{}: {} {} {}",
                    restriction.id, rule.field, rule.operator, rule.value
                );
                return match rule.action {
                    RuleAction::Fail => RuleOutcome::Fail { reason },
                    RuleAction::Warn => RuleOutcome::Warn { reason },
                };
            }
        }
        RuleOutcome::Pass
    }
}

/// Numeric-tolerant JSON equality (1 == 1.0).
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// True when the rule's predicate is satisfied by the ingredient.
fn rule_matches(ingredient: &Ingredient, rule: &Rule) -> bool {
    let Some(field_value) = ingredient_field(ingredient, &rule.field) else {
        return false;
    };
    let target = &rule.value;

    match rule.operator {
        RuleOperator::Equals => json_eq(&field_value.to_json(), target),
        RuleOperator::NotEquals => !json_eq(&field_value.to_json(), target),
        RuleOperator::Contains => match &field_value {
            FieldValue::Str(None) | FieldValue::Num(None) => false,
            FieldValue::List(items) => target
                .as_str()
                .map(|t| items.iter().any(|i| i == t))
                .unwrap_or(false),
            FieldValue::Str(Some(s)) => {
                target.as_str().map(|t| s.contains(t)).unwrap_or(false)
            }
            FieldValue::Bool(b) => target
                .as_str()
                .map(|t| b.to_string().contains(t))
                .unwrap_or(false),
            FieldValue::Num(Some(n)) => target
                .as_str()
                .map(|t| n.to_string().contains(t))
                .unwrap_or(false),
        },
        RuleOperator::GreaterThan => {
            let value = match field_value {
                FieldValue::Num(Some(n)) => Some(n),
                FieldValue::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
                _ => None,
            };
            match (value, target.as_f64()) {
                (Some(v), Some(t)) => v > t,
                _ => false,
            }
        }
        RuleOperator::InList => {
            let current = field_value.to_json();
            if current.is_null() {
                return false;
            }
            match target {
                Value::Array(items) => items.iter().any(|t| json_eq(&current, t)),
                scalar => json_eq(&current, scalar),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RestrictionCategory, Severity};

    fn rule(field: &str, operator: RuleOperator, value: Value, action: RuleAction) -> Rule {
        Rule {
            field: field.to_string(),
            operator,
            value,
            action,
        }
    }

    fn restriction(id: &str, rules: Vec<Rule>) -> Restriction {
        Restriction {
            id: id.to_string(),
            category: RestrictionCategory::Lifestyle,
            region_scope: vec!["GLOBAL".to_string()],
            severity: Severity::Strict,
            rules,
        }
    }

    fn vegan() -> Restriction {
        restriction(
            "vegan",
            vec![
                rule("animal_origin", RuleOperator::Equals, Value::Bool(true), RuleAction::Fail),
                rule("insect_derived", RuleOperator::Equals, Value::Bool(true), RuleAction::Fail),
            ],
        )
    }

    #[test]
    fn test_equals_fail() {
        let registry = RestrictionRegistry::from_restrictions(vec![vegan()]);
        let milk = Ingredient {
            animal_origin: true,
            dairy_source: true,
            ..Ingredient::new("milk", "milk")
        };
        let outcome = registry.evaluate(&milk, registry.get("vegan").unwrap());
        assert!(matches!(outcome, RuleOutcome::Fail { .. }));
    }

    #[test]
    fn test_pass_when_no_rule_matches() {
        let registry = RestrictionRegistry::from_restrictions(vec![vegan()]);
        let water = Ingredient::new("water", "water");
        let outcome = registry.evaluate(&water, registry.get("vegan").unwrap());
        assert_eq!(outcome, RuleOutcome::Pass);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let r = restriction(
            "layered",
            vec![
                rule("fungal", RuleOperator::Equals, Value::Bool(true), RuleAction::Warn),
                rule("fungal", RuleOperator::Equals, Value::Bool(true), RuleAction::Fail),
            ],
        );
        let registry = RestrictionRegistry::from_restrictions(vec![r]);
        let mushroom = Ingredient {
            fungal: true,
            ..Ingredient::new("mushroom", "mushroom")
        };
        let outcome = registry.evaluate(&mushroom, registry.get("layered").unwrap());
        assert!(matches!(outcome, RuleOutcome::Warn { .. }));
    }

    #[test]
    fn test_in_list_operator() {
        let r = restriction(
            "no_pork_or_beef",
            vec![rule(
                "animal_species",
                RuleOperator::InList,
                serde_json::json!(["pig", "cow"]),
                RuleAction::Fail,
            )],
        );
        let registry = RestrictionRegistry::from_restrictions(vec![r]);
        let pork = Ingredient {
            animal_origin: true,
            animal_species: Some("pig".to_string()),
            ..Ingredient::new("pork", "pork")
        };
        let fish = Ingredient {
            animal_origin: true,
            animal_species: Some("fish".to_string()),
            ..Ingredient::new("fish", "fish")
        };
        let r = registry.get("no_pork_or_beef").unwrap();
        assert!(matches!(registry.evaluate(&pork, r), RuleOutcome::Fail { .. }));
        assert_eq!(registry.evaluate(&fish, r), RuleOutcome::Pass);
    }

    #[test]
    fn test_in_list_null_never_matches() {
        let r = restriction(
            "nut_allergy",
            vec![rule(
                "nut_source",
                RuleOperator::InList,
                serde_json::json!(["peanut", "tree_nut"]),
                RuleAction::Fail,
            )],
        );
        let registry = RestrictionRegistry::from_restrictions(vec![r]);
        let water = Ingredient::new("water", "water");
        assert_eq!(
            registry.evaluate(&water, registry.get("nut_allergy").unwrap()),
            RuleOutcome::Pass
        );
    }

    #[test]
    fn test_greater_than_on_alcohol() {
        let r = restriction(
            "no_alcohol",
            vec![rule(
                "alcohol_content",
                RuleOperator::GreaterThan,
                serde_json::json!(0),
                RuleAction::Fail,
            )],
        );
        let registry = RestrictionRegistry::from_restrictions(vec![r]);
        let wine = Ingredient {
            alcohol_content: Some(1.0),
            ..Ingredient::new("wine", "wine")
        };
        let water = Ingredient::new("water", "water");
        let r = registry.get("no_alcohol").unwrap();
        assert!(matches!(registry.evaluate(&wine, r), RuleOutcome::Fail { .. }));
        assert_eq!(registry.evaluate(&water, r), RuleOutcome::Pass);
    }

    #[test]
    fn test_contains_on_list_field() {
        let r = restriction(
            "flag_natural_flavor",
            vec![rule(
                "uncertainty_flags",
                RuleOperator::Contains,
                Value::String("natural_flavor".to_string()),
                RuleAction::Warn,
            )],
        );
        let registry = RestrictionRegistry::from_restrictions(vec![r]);
        let flavor = Ingredient {
            uncertainty_flags: vec!["natural_flavor".to_string()],
            ..Ingredient::new("natural_flavor", "natural flavor")
        };
        assert!(matches!(
            registry.evaluate(&flavor, registry.get("flag_natural_flavor").unwrap()),
            RuleOutcome::Warn { .. }
        ));
    }

    #[test]
    fn test_unknown_field_never_matches() {
        let r = restriction(
            "bogus",
            vec![rule("no_such_field", RuleOperator::Equals, Value::Bool(true), RuleAction::Fail)],
        );
        let registry = RestrictionRegistry::from_restrictions(vec![r]);
        let water = Ingredient::new("water", "water");
        assert_eq!(
            registry.evaluate(&water, registry.get("bogus").unwrap()),
            RuleOutcome::Pass
        );
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let registry = RestrictionRegistry::load(Path::new("/nonexistent/r.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restrictions.json");
        std::fs::write(
            &path,
            r#"{"restrictions": [
                {"id": "b", "category": "religious", "rules": []},
                {"id": "a", "category": "allergy", "rules": []}
            ]}"#,
        )
        .unwrap();
        let registry = RestrictionRegistry::load(&path).unwrap();
        assert_eq!(registry.list_ids(), vec!["b", "a"]);
    }
}
