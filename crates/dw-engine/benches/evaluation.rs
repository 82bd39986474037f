//! Evaluation throughput benchmarks.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dw_engine::{ComplianceEngine, EvaluateOptions, IngredientResolver};
use dw_ontology::{Ingredient, IngredientRegistry};
use dw_rules::{Restriction, RestrictionCategory, RestrictionRegistry, Rule, RuleAction, RuleOperator, Severity};

fn engine() -> ComplianceEngine {
    let mut ingredients = vec![
        Ingredient::new("water", "water"),
        Ingredient::new("sugar", "sugar"),
        Ingredient {
            animal_origin: true,
            dairy_source: true,
            ..Ingredient::new("milk", "milk")
        },
    ];
    for i in 0..500 {
        ingredients.push(Ingredient {
            plant_origin: true,
            ..Ingredient::new(format!("filler_{i}"), format!("filler {i}"))
        });
    }
    let registry = Arc::new(IngredientRegistry::from_ingredients("bench", ingredients));
    let restrictions = RestrictionRegistry::from_restrictions(vec![Restriction {
        id: "vegan".to_string(),
        category: RestrictionCategory::Lifestyle,
        region_scope: vec!["GLOBAL".to_string()],
        severity: Severity::Strict,
        rules: vec![Rule {
            field: "animal_origin".to_string(),
            operator: RuleOperator::Equals,
            value: serde_json::json!(true),
            action: RuleAction::Fail,
        }],
    }]);
    ComplianceEngine::new(IngredientResolver::new(registry), restrictions)
}

fn bench_evaluate(c: &mut Criterion) {
    let engine = engine();
    let label: Vec<String> = (0..30).map(|i| format!("filler {}", i * 7)).collect();
    let rids = vec!["vegan".to_string()];

    c.bench_function("evaluate_30_ingredients", |b| {
        b.iter(|| {
            black_box(engine.evaluate(
                black_box(&label),
                Some(black_box(&rids)),
                &EvaluateOptions::default(),
            ))
        })
    });

    let flatten_input =
        "Enriched Flour (Wheat Flour, Niacin, Reduced Iron), Sugar, Palm Oil, \
         Contains 2% or less of: Salt, Leavening (Baking Soda), Natural Flavor";
    c.bench_function("preprocess_label", |b| {
        b.iter(|| black_box(dw_parser::preprocess_ingredients(black_box(flatten_input))))
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
