//! Open Food Facts connector (no API key required).
//!
//! Search: `https://world.openfoodfacts.org/cgi/search.pl?search_terms=...&json=1`
//!
//! Classification prefers the structured tags (`labels_tags`,
//! `allergens_tags`, `categories_tags`); text keyword inference with
//! plant-override protection is secondary.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use dw_ontology::Ingredient;

use crate::retry::{get_with_retries, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_RETRIES};
use crate::text::{is_plant_override, normalize_id, word_match_plural};
use crate::types::{Confidence, EnrichmentResult, FoodDataSource};

pub const OFF_SEARCH_URL: &str = "https://world.openfoodfacts.org/cgi/search.pl";

const SOURCE: &str = "open_food_facts";

/// Client for Open Food Facts search.
pub struct OpenFoodFactsClient {
    client: reqwest::blocking::Client,
}

impl OpenFoodFactsClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    fn search(&self, query: &str) -> EnrichmentResult {
        if query.trim().is_empty() {
            return EnrichmentResult::miss(SOURCE, "empty_query");
        }
        let query: String = query.trim().chars().take(200).collect();
        let params = [
            ("search_terms", query.clone()),
            ("search_simple", "1".to_string()),
            ("action", "process".to_string()),
            ("json", "1".to_string()),
            ("page_size", "5".to_string()),
        ];

        let resp = match get_with_retries(
            &self.client,
            OFF_SEARCH_URL,
            &params,
            DEFAULT_MAX_RETRIES,
            DEFAULT_INITIAL_BACKOFF,
        ) {
            Ok(resp) => resp,
            Err(e) => {
                warn!(query = %query, error = %e, "Open Food Facts fetch failed after retries");
                return EnrichmentResult::miss(SOURCE, format!("error:{e}"));
            }
        };

        if !resp.status().is_success() {
            warn!(query = %query, status = %resp.status(), "Open Food Facts response error");
            return EnrichmentResult::miss(SOURCE, format!("status:{}", resp.status()));
        }
        let data: Value = match resp.json() {
            Ok(v) => v,
            Err(e) => {
                warn!(query = %query, error = %e, "Open Food Facts unparsable response");
                return EnrichmentResult::miss(SOURCE, "unparsable_json");
            }
        };

        let products = data.get("products").and_then(Value::as_array);
        let Some(best) = products.and_then(|p| p.first()) else {
            info!(query = %query, "Open Food Facts no results");
            return EnrichmentResult::miss(SOURCE, "no_results");
        };

        let name = product_name(best).to_lowercase();
        let q_lower = query.to_lowercase();
        let first_token = q_lower.split_whitespace().next().unwrap_or("");
        let confidence = if !name.is_empty()
            && (name.contains(&q_lower)
                || q_lower.contains(&name)
                || (!first_token.is_empty() && name.contains(first_token)))
        {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let ingredient = product_to_ingredient(best, &query);
        let summary = format!(
            "product_name={}",
            product_name(best).chars().take(80).collect::<String>()
        );
        info!(query = %query, confidence = %confidence, "Open Food Facts success");
        EnrichmentResult::hit(ingredient, confidence, SOURCE, summary)
    }
}

impl FoodDataSource for OpenFoodFactsClient {
    fn name(&self) -> &str {
        SOURCE
    }

    fn lookup(&self, query: &str) -> EnrichmentResult {
        self.search(query)
    }
}

fn product_name(product: &Value) -> String {
    product
        .get("product_name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| product.get("product_name_en").and_then(Value::as_str))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn string_tags(product: &Value, key: &str) -> Vec<String> {
    product
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

/// Map one OFF product to the canonical ingredient schema.
pub(crate) fn product_to_ingredient(product: &Value, query: &str) -> Ingredient {
    let name = {
        let n = product_name(product);
        if n.is_empty() {
            query.to_string()
        } else {
            n
        }
    };
    let ingredients_text = product
        .get("ingredients_text")
        .and_then(Value::as_str)
        .or_else(|| product.get("ingredients_text_en").and_then(Value::as_str))
        .unwrap_or("")
        .trim();
    let allergens_text = product
        .get("allergens")
        .and_then(Value::as_str)
        .or_else(|| {
            product
                .get("allergens_from_ingredients")
                .and_then(Value::as_str)
        })
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let combined = format!("{name} {ingredients_text} {allergens_text}").to_lowercase();
    let t = combined.as_str();

    let labels = string_tags(product, "labels_tags");
    let allergen_tags = string_tags(product, "allergens_tags");

    let is_vegan = labels.iter().any(|l| l.contains("vegan"));
    let is_vegetarian = labels.iter().any(|l| l.contains("vegetarian"));
    let has_milk_allergen = allergen_tags.iter().any(|a| a.contains("milk"));
    let has_egg_allergen = allergen_tags.iter().any(|a| a.contains("egg"));
    let has_gluten_allergen = allergen_tags.iter().any(|a| a.contains("gluten"));
    let has_soy_allergen = allergen_tags
        .iter()
        .any(|a| a.contains("soy") || a.contains("soja"));

    let override_hit = is_plant_override(t);
    let w = |word: &str| word_match_plural(t, word);

    let (animal_origin, plant_origin, dairy_source, egg_source) = if is_vegan || override_hit {
        (false, true, false, false)
    } else if is_vegetarian {
        // Vegetarian = no meat, but may have dairy/eggs
        let animal = ["meat", "beef", "pork", "chicken", "fish", "gelatin", "lard", "tallow"]
            .iter()
            .any(|k| w(k));
        let dairy = has_milk_allergen
            || ["milk", "cheese", "whey", "cream", "butter", "dairy", "casein", "ghee"]
                .iter()
                .any(|k| w(k));
        let egg = has_egg_allergen || (w("egg") && !t.contains("eggplant"));
        (animal, !animal, dairy, egg)
    } else {
        let animal = [
            "meat", "beef", "pork", "chicken", "fish", "gelatin", "lard", "tallow", "animal",
            "whey", "casein", "rennet",
        ]
        .iter()
        .any(|k| w(k));
        let dairy = has_milk_allergen
            || [
                "milk", "cheese", "whey", "cream", "butter", "dairy", "lactose", "casein",
                "ghee", "curd", "yogurt",
            ]
            .iter()
            .any(|k| w(k));
        let egg = has_egg_allergen || (w("egg") && !t.contains("eggplant"));
        (animal, !animal, dairy, egg)
    };

    let nut_source = if w("peanut") || allergen_tags.iter().any(|a| a.contains("peanut")) {
        Some("peanut".to_string())
    } else if ["almond", "walnut", "cashew", "pecan", "hazelnut", "macadamia", "pistachio"]
        .iter()
        .any(|k| w(k))
        || allergen_tags.iter().any(|a| a.contains("nut"))
    {
        Some("tree_nut".to_string())
    } else {
        None
    };

    Ingredient {
        id: format!("off_{}", normalize_id(&name)),
        canonical_name: name.clone(),
        aliases: if !query.is_empty() && query != name {
            vec![query.to_string()]
        } else {
            Vec::new()
        },
        animal_origin,
        plant_origin,
        egg_source,
        dairy_source,
        gluten_source: has_gluten_allergen
            || ["wheat", "barley", "rye", "gluten"].iter().any(|k| w(k)),
        nut_source,
        soy_source: has_soy_allergen || w("soy") || w("soybean") || w("tofu"),
        sesame_source: w("sesame") || allergen_tags.iter().any(|a| a.contains("sesame")),
        alcohol_content: if ["alcohol", "wine", "beer", "spirit"].iter().any(|k| w(k)) {
            Some(1.0)
        } else {
            None
        },
        root_vegetable: [
            "potato", "carrot", "beet", "radish", "turnip", "yam", "onion", "garlic",
            "shallot", "leek",
        ]
        .iter()
        .any(|k| w(k)),
        onion_source: w("onion") && !override_hit,
        garlic_source: w("garlic") && !override_hit,
        uncertainty_flags: vec!["open_food_facts_inferred".to_string()],
        ..Default::default()
    }
}
