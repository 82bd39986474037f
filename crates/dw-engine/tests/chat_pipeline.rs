//! Conversational-path integration: intent routing through
//! [`ChatAssistant`] over the full pipeline (compound expansion, label
//! preprocessing, evaluation, response composition).

use std::sync::Arc;

use dw_engine::{
    ChatAssistant, ComplianceEngine, IngredientResolver, UserProfile, VerdictStatus,
};
use dw_intent::Intent;
use dw_ontology::{Ingredient, IngredientRegistry, UnknownIngredientsLog};
use dw_rules::{Restriction, RestrictionCategory, RestrictionRegistry, Rule, RuleAction, RuleOperator, Severity};

fn fail_rule(field: &str, value: serde_json::Value) -> Rule {
    Rule {
        field: field.to_string(),
        operator: RuleOperator::Equals,
        value,
        action: RuleAction::Fail,
    }
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
                ..Ingredient::new("milk", "milk")
            },
            Ingredient {
                animal_origin: true,
                animal_species: Some("pig".to_string()),
                ..Ingredient::new("pork", "pork")
            },
            Ingredient {
                plant_origin: true,
                root_vegetable: true,
                garlic_source: true,
                ..Ingredient::new("garlic", "garlic")
            },
            Ingredient {
                animal_origin: true,
                animal_species: Some("chicken".to_string()),
                ..Ingredient::new("chicken", "chicken")
            },
        ],
    ))
}

fn fixture_restrictions() -> RestrictionRegistry {
    RestrictionRegistry::from_restrictions(vec![
        Restriction {
            id: "vegan".to_string(),
            category: RestrictionCategory::Lifestyle,
            region_scope: vec!["GLOBAL".to_string()],
            severity: Severity::Strict,
            rules: vec![fail_rule("animal_origin", serde_json::json!(true))],
        },
        Restriction {
            id: "jain".to_string(),
            category: RestrictionCategory::Religious,
            region_scope: vec!["GLOBAL".to_string()],
            severity: Severity::Strict,
            rules: vec![
                fail_rule("meat_fish_derived", serde_json::json!(true)),
                fail_rule("root_vegetable", serde_json::json!(true)),
            ],
        },
        Restriction {
            id: "halal".to_string(),
            category: RestrictionCategory::Religious,
            region_scope: vec!["GLOBAL".to_string()],
            severity: Severity::Strict,
            rules: vec![fail_rule("animal_species", serde_json::json!("pig"))],
        },
    ])
}

fn assistant() -> ChatAssistant {
    ChatAssistant::new(ComplianceEngine::new(
        IngredientResolver::new(fixture_registry()),
        fixture_restrictions(),
    ))
}

#[test]
fn greeting_routes_to_greeting_composer() {
    let mut profile = UserProfile::new("u1");
    let reply = assistant().respond("hi, how are you?", &mut profile);
    assert_eq!(reply.intent, Intent::Greeting);
    assert!(reply.text.contains("grocery safety assistant"));
    assert!(reply.verdict.is_none());
    assert!(!reply.profile_was_updated);
}

#[test]
fn general_question_routes_to_general_composer() {
    let mut profile = UserProfile::new("u1");
    let reply = assistant().respond("how is gelatin made?", &mut profile);
    assert_eq!(reply.intent, Intent::GeneralQuestion);
    assert!(reply.text.contains("checking whether specific ingredients are safe"));
    assert!(reply.verdict.is_none());
}

#[test]
fn profile_update_only_acknowledges_and_persists() {
    let mut profile = UserProfile::new("u1");
    let reply = assistant().respond("I am vegan", &mut profile);
    assert_eq!(reply.intent, Intent::ProfileUpdate);
    assert!(reply.profile_was_updated);
    assert_eq!(profile.dietary_preference, "Vegan");
    assert!(reply.text.contains("**Vegan**"));
    assert!(reply.verdict.is_none());
}

#[test]
fn trailing_halal_question_over_label() {
    let mut profile = UserProfile::new("u1");
    let reply = assistant().respond("Ingredients: Sugar, Water. Is this Halal?", &mut profile);
    assert_eq!(reply.intent, Intent::Mixed);
    assert!(reply.profile_was_updated);
    assert_eq!(profile.dietary_preference, "Halal");
    let verdict = reply.verdict.expect("ingredients were evaluated");
    assert_eq!(verdict.status, VerdictStatus::Safe);
}

#[test]
fn is_pork_halal_is_refused() {
    let mut profile = UserProfile::new("u1");
    let reply = assistant().respond("is pork halal", &mut profile);
    let verdict = reply.verdict.expect("ingredients were evaluated");
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert!(reply.text.contains("**Pork**"));
    assert!(reply.text.contains("not suitable"));
}

#[test]
fn jain_garlic_pasta_names_the_product() {
    let mut profile = UserProfile::new("u1");
    profile.dietary_preference = "Jain".to_string();
    let reply = assistant().respond("can I eat garlic pasta?", &mut profile);
    let verdict = reply.verdict.expect("ingredients were evaluated");
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    // The compound display name is used, not the bare atom.
    assert!(reply.text.contains("**Garlic pasta**"));
}

#[test]
fn mixed_query_acknowledges_profile_and_answers() {
    let mut profile = UserProfile::new("u1");
    let reply = assistant().respond("I am Jain, can I eat garlic?", &mut profile);
    assert_eq!(profile.dietary_preference, "Jain");
    assert!(reply.profile_was_updated);
    let verdict = reply.verdict.expect("ingredients were evaluated");
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert!(reply.text.starts_with("Got it"));
    assert!(reply.text.contains("**Garlic**"));
}

#[test]
fn unknown_ingredient_is_uncertain() {
    let mut profile = UserProfile::new("u1");
    profile.dietary_preference = "Vegan".to_string();
    let reply = assistant().respond("can I eat snozzberry extract?", &mut profile);
    let verdict = reply.verdict.expect("ingredients were evaluated");
    assert_eq!(verdict.status, VerdictStatus::Uncertain);
    assert!(reply.text.contains("Couldn't find reliable information"));
}

#[test]
fn unknown_lookup_records_profile_context() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("unknown_ingredients_log.json");
    let resolver = IngredientResolver::new(fixture_registry())
        .with_unknown_log(UnknownIngredientsLog::load(&log_path));
    let assistant =
        ChatAssistant::new(ComplianceEngine::new(resolver, fixture_restrictions()));

    let mut profile = UserProfile::new("u1");
    profile.dietary_preference = "Vegan".to_string();
    assistant.respond("can I eat snozzberry extract?", &mut profile);

    let log = UnknownIngredientsLog::load(&log_path);
    let entry = log.get("snozzberry extract").expect("unknown entry recorded");
    assert_eq!(entry.frequency, 1);
    assert_eq!(entry.restriction_ids_sample, vec!["vegan"]);
    let context = entry.profile_context_sample.as_ref().expect("context recorded");
    assert_eq!(context["dietary_preference"], serde_json::json!("Vegan"));
}
