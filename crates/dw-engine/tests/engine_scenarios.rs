//! End-to-end engine scenarios with fixture registries and mock external
//! sources.

use std::collections::HashMap;
use std::sync::Arc;

use dw_connectors::{Confidence, EnrichmentResult, FoodDataSource};
use dw_engine::{ComplianceEngine, EvaluateOptions, IngredientResolver, VerdictStatus};
use dw_ontology::{DynamicOntology, Ingredient, IngredientRegistry, UnknownIngredientsLog};
use dw_rules::{Restriction, RestrictionCategory, RestrictionRegistry, Rule, RuleAction, RuleOperator, Severity};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn rule(field: &str, operator: RuleOperator, value: serde_json::Value) -> Rule {
    Rule {
        field: field.to_string(),
        operator,
        value,
        action: RuleAction::Fail,
    }
}

fn restriction(id: &str, category: RestrictionCategory, rules: Vec<Rule>) -> Restriction {
    Restriction {
        id: id.to_string(),
        category,
        region_scope: vec!["GLOBAL".to_string()],
        severity: Severity::Strict,
        rules,
    }
}

fn fixture_restrictions() -> RestrictionRegistry {
    RestrictionRegistry::from_restrictions(vec![
        restriction(
            "vegan",
            RestrictionCategory::Lifestyle,
            vec![
                rule("animal_origin", RuleOperator::Equals, serde_json::json!(true)),
                rule("insect_derived", RuleOperator::Equals, serde_json::json!(true)),
            ],
        ),
        restriction(
            "jain",
            RestrictionCategory::Religious,
            vec![
                rule("meat_fish_derived", RuleOperator::Equals, serde_json::json!(true)),
                rule("egg_source", RuleOperator::Equals, serde_json::json!(true)),
                rule("root_vegetable", RuleOperator::Equals, serde_json::json!(true)),
                rule("onion_source", RuleOperator::Equals, serde_json::json!(true)),
                rule("garlic_source", RuleOperator::Equals, serde_json::json!(true)),
                rule("fungal", RuleOperator::Equals, serde_json::json!(true)),
            ],
        ),
        restriction(
            "halal",
            RestrictionCategory::Religious,
            vec![
                rule("animal_species", RuleOperator::Equals, serde_json::json!("pig")),
                rule("alcohol_content", RuleOperator::GreaterThan, serde_json::json!(0)),
            ],
        ),
    ])
}

fn fixture_registry() -> Arc<IngredientRegistry> {
    Arc::new(IngredientRegistry::from_ingredients(
        "fixture-1",
        vec![
            Ingredient::new("water", "water"),
            Ingredient::new("sugar", "sugar"),
            Ingredient {
                animal_origin: true,
                dairy_source: true,
                animal_species: Some("cow".to_string()),
                ..Ingredient::new("milk", "milk")
            },
            Ingredient {
                plant_origin: true,
                root_vegetable: true,
                garlic_source: true,
                ..Ingredient::new("garlic", "garlic")
            },
        ],
    ))
}

struct MockSource {
    result: EnrichmentResult,
}

impl FoodDataSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }
    fn lookup(&self, _query: &str) -> EnrichmentResult {
        self.result.clone()
    }
}

struct FailingSource;

impl FoodDataSource for FailingSource {
    fn name(&self) -> &str {
        "mock"
    }
    fn lookup(&self, _query: &str) -> EnrichmentResult {
        EnrichmentResult::miss("none", "no_result")
    }
}

// Scenario: vegan profile, dairy in the list.
#[test]
fn vegan_with_dairy_is_not_safe() {
    let engine = ComplianceEngine::new(
        IngredientResolver::new(fixture_registry()),
        fixture_restrictions(),
    );
    let verdict = engine.evaluate(
        &strings(&["water", "sugar", "milk"]),
        Some(&strings(&["vegan"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_restrictions, vec!["vegan"]);
    assert_eq!(verdict.triggered_ingredients, vec!["milk"]);
    assert!(verdict.uncertain_ingredients.is_empty());
    assert!(verdict.confidence_score >= 0.7);
}

// Scenario: Jain profile, root vegetable extracted from a compound name.
#[test]
fn jain_with_garlic_from_compound_is_not_safe() {
    let raw = vec!["garlic pasta".to_string()];
    let (expanded, display_map) = dw_parser::expand_compounds(&raw);
    assert_eq!(expanded, vec!["garlic"]);
    assert_eq!(
        display_map.get("garlic").map(String::as_str),
        Some("garlic pasta")
    );

    let engine = ComplianceEngine::new(
        IngredientResolver::new(fixture_registry()),
        fixture_restrictions(),
    );
    let verdict = engine.evaluate(&expanded, Some(&strings(&["jain"])), &EvaluateOptions::default());
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_restrictions, vec!["jain"]);
    assert_eq!(verdict.triggered_ingredients, vec!["garlic"]);
}

// Scenario: halal profile over benign ingredients.
#[test]
fn halal_with_benign_ingredients_is_safe() {
    let engine = ComplianceEngine::new(
        IngredientResolver::new(fixture_registry()),
        fixture_restrictions(),
    );
    let verdict = engine.evaluate(
        &strings(&["sugar", "water"]),
        Some(&strings(&["halal"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::Safe);
    assert_eq!(verdict.confidence_score, 1.0);
}

// Scenario: unknown trace ingredient stays informational.
#[test]
fn unknown_trace_ingredient_is_informational() {
    let items = dw_parser::preprocess_ingredients(
        "Water, Sugar, Contains 2% or less of: xyz_compound",
    );
    let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["water", "sugar", "xyz_compound"]);
    assert!(items[2].trace);

    let engine = ComplianceEngine::new(
        IngredientResolver::new(fixture_registry()),
        fixture_restrictions(),
    );
    let mut options = EvaluateOptions::default();
    options.trace_keys = dw_parser::get_trace_keys(&items);
    let verdict = engine.evaluate(&names, Some(&strings(&["vegan"])), &options);
    assert_eq!(verdict.status, VerdictStatus::Safe);
    assert_eq!(verdict.informational_ingredients, vec!["xyz_compound"]);
    assert!(verdict.confidence_score >= 0.2);
}

// Scenario: external-API-only hit resolves, triggers, and persists.
#[test]
fn api_resolved_isinglass_triggers_vegan_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let dynamic_path = dir.path().join("dynamic_ontology.json");
    let isinglass = Ingredient {
        animal_origin: true,
        animal_species: Some("fish".to_string()),
        ..Ingredient::new("off_isinglass", "isinglass")
    };
    let resolver = IngredientResolver::new(fixture_registry())
        .with_dynamic_store(DynamicOntology::load(&dynamic_path).unwrap())
        .with_unknown_log(UnknownIngredientsLog::load(&dir.path().join("unknown.json")))
        .with_fetcher(Arc::new(MockSource {
            result: EnrichmentResult::hit(
                isinglass,
                Confidence::High,
                "open_food_facts",
                "ok",
            ),
        }));
    let engine = ComplianceEngine::new(resolver, fixture_restrictions());

    let verdict = engine.evaluate(
        &strings(&["water", "isinglass"]),
        Some(&strings(&["vegan"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_restrictions, vec!["vegan"]);
    assert_eq!(verdict.triggered_ingredients, vec!["isinglass"]);
    assert!(verdict.confidence_score >= 0.5);

    // Promoted into the dynamic ontology on disk.
    let persisted = DynamicOntology::load(&dynamic_path).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted.ingredients()[0].id, "off_isinglass");
}

// Scenario: every external lookup fails.
#[test]
fn failed_external_lookups_are_uncertain_with_low_confidence() {
    let resolver =
        IngredientResolver::new(fixture_registry()).with_fetcher(Arc::new(FailingSource));
    let engine = ComplianceEngine::new(resolver, fixture_restrictions());

    let verdict = engine.evaluate(
        &strings(&["water", "sugar", "xyznonexistent"]),
        Some(&strings(&["vegan"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::Uncertain);
    assert_eq!(verdict.uncertain_ingredients, vec!["xyznonexistent"]);
    assert!(verdict.confidence_score >= 0.0);
    assert!(verdict.confidence_score <= 0.4);
}

// Unknowns recorded with profile context for later enrichment.
#[test]
fn unresolved_lookup_is_logged_for_enrichment() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("unknown_ingredients_log.json");
    let resolver = IngredientResolver::new(fixture_registry())
        .with_unknown_log(UnknownIngredientsLog::load(&log_path));
    let engine = ComplianceEngine::new(resolver, fixture_restrictions());

    let mut context = HashMap::new();
    context.insert(
        "dietary_preference".to_string(),
        serde_json::json!("Vegan"),
    );
    let mut options = EvaluateOptions::default();
    options.profile_context = Some(context);
    engine.evaluate(
        &strings(&["mystery goo"]),
        Some(&strings(&["vegan"])),
        &options,
    );

    let log = UnknownIngredientsLog::load(&log_path);
    let entry = log.get("mystery goo").expect("unknown entry recorded");
    assert_eq!(entry.frequency, 1);
    assert_eq!(entry.restriction_ids_sample, vec!["vegan"]);
    assert!(entry.profile_context_sample.is_some());
}

// Purity: same inputs, same verdict.
#[test]
fn evaluate_is_deterministic() {
    let engine = ComplianceEngine::new(
        IngredientResolver::new(fixture_registry()),
        fixture_restrictions(),
    );
    let inputs = strings(&["water", "milk", "garlic"]);
    let rids = strings(&["vegan", "jain"]);
    let first = engine.evaluate(&inputs, Some(&rids), &EvaluateOptions::default());
    let second = engine.evaluate(&inputs, Some(&rids), &EvaluateOptions::default());
    assert_eq!(first, second);
    // Both restrictions trigger, in selection order, without duplicates.
    assert_eq!(first.triggered_restrictions, vec!["vegan", "jain"]);
}
