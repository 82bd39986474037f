//! Smoke tests over the data files shipped in `data/`.

use std::path::PathBuf;

use dw_engine::{ComplianceEngine, EvaluateOptions, VerdictStatus};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("data")
}

fn engine() -> ComplianceEngine {
    ComplianceEngine::from_files(
        &data_dir().join("ontology.json"),
        &data_dir().join("restrictions.json"),
    )
    .expect("shipped data files load")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn ontology_and_restrictions_load() {
    let engine = engine();
    assert!(!engine.resolver().registry().is_empty());
    assert!(engine.restrictions().len() >= 20);
    assert_eq!(engine.resolver().ontology_version(), "2025.07");
}

#[test]
fn vegan_flags_dairy_and_honey() {
    let verdict = engine().evaluate(
        &strings(&["water", "milk", "honey"]),
        Some(&strings(&["vegan"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_restrictions, vec!["vegan"]);
    assert_eq!(verdict.triggered_ingredients, vec!["milk", "honey"]);
}

#[test]
fn jain_flags_root_vegetables() {
    let verdict = engine().evaluate(
        &strings(&["potato", "salt"]),
        Some(&strings(&["jain"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_ingredients, vec!["potato"]);
}

#[test]
fn halal_flags_pork_via_alias() {
    // "bacon" is an alias of pork in the shipped ontology.
    let verdict = engine().evaluate(
        &strings(&["bacon"]),
        Some(&strings(&["halal"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_ingredients, vec!["pork"]);
}

#[test]
fn gluten_free_flags_wheat_flour_alias() {
    let verdict = engine().evaluate(
        &strings(&["enriched flour", "water"]),
        Some(&strings(&["gluten_free"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_ingredients, vec!["wheat flour"]);
}

#[test]
fn pescatarian_allows_fish_but_not_chicken() {
    let engine = engine();
    let fish = engine.evaluate(
        &strings(&["salmon"]),
        Some(&strings(&["pescatarian"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(fish.status, VerdictStatus::Safe);

    let chicken = engine.evaluate(
        &strings(&["chicken"]),
        Some(&strings(&["pescatarian"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(chicken.status, VerdictStatus::NotSafe);
}

#[test]
fn kosher_flags_shellfish_and_carmine() {
    let verdict = engine().evaluate(
        &strings(&["shrimp", "e120"]),
        Some(&strings(&["kosher"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    // e120 normalizes to carmine through the variant table.
    assert_eq!(verdict.triggered_ingredients, vec!["shrimp", "carmine"]);
}

#[test]
fn no_alcohol_flags_vanilla_extract() {
    let verdict = engine().evaluate(
        &strings(&["vanilla extract"]),
        Some(&strings(&["no_alcohol"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
}

#[test]
fn vegetarian_warns_on_gelatin_like_flags_but_fails_meat() {
    let verdict = engine().evaluate(
        &strings(&["gelatin"]),
        Some(&strings(&["vegetarian"])),
        &EvaluateOptions::default(),
    );
    // Gelatin is meat_fish_derived in the shipped ontology.
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
}

#[test]
fn dairy_free_flags_hidden_dairy_terms() {
    let verdict = engine().evaluate(
        &strings(&["whey", "casein", "water"]),
        Some(&strings(&["dairy_free"])),
        &EvaluateOptions::default(),
    );
    assert_eq!(verdict.status, VerdictStatus::NotSafe);
    assert_eq!(verdict.triggered_ingredients, vec!["whey", "casein"]);
}
