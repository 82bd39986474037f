//! USDA FoodData Central connector.
//!
//! Search: `GET https://api.nal.usda.gov/fdc/v1/foods/search?api_key=KEY&query=...`
//!
//! Classification is driven primarily by the `foodCategory` field, which
//! is far more reliable than keyword substring matching; text keywords are
//! the fallback when the category is ambiguous.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use dw_ontology::Ingredient;

use crate::retry::{get_with_retries, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_RETRIES};
use crate::text::{is_plant_override, normalize_id, word_match};
use crate::types::{Confidence, EnrichmentResult, FoodDataSource};

pub const USDA_SEARCH_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";

const SOURCE: &str = "usda_fdc";

const ANIMAL_MEAT_CATEGORIES: &[&str] = &[
    "beef products",
    "pork products",
    "poultry products",
    "lamb, veal, and game products",
    "sausages and luncheon meats",
    "finfish and shellfish products",
];

const DAIRY_EGG_CATEGORIES: &[&str] = &["dairy and egg products"];

const PLANT_CATEGORIES: &[&str] = &[
    "vegetables and vegetable products",
    "fruits and fruit juices",
    "legumes and legume products",
    "nut and seed products",
    "cereal grains and pasta",
    "spices and herbs",
    "baby foods",
    "baked products",
];

#[derive(Debug, Default)]
struct CategoryFlags {
    animal_origin: bool,
    plant_origin: bool,
    dairy_source: bool,
    egg_source: bool,
}

/// Primary classification using the USDA foodCategory.
fn flags_from_category(category: &str) -> CategoryFlags {
    let cat = category.to_lowercase();
    let is_animal_meat = ANIMAL_MEAT_CATEGORIES.iter().any(|c| cat.contains(c));
    let is_dairy_egg = DAIRY_EGG_CATEGORIES.iter().any(|c| cat.contains(c));
    let is_plant = PLANT_CATEGORIES.iter().any(|c| cat.contains(c));
    CategoryFlags {
        animal_origin: is_animal_meat || is_dairy_egg,
        plant_origin: is_plant && !is_animal_meat && !is_dairy_egg,
        dairy_source: is_dairy_egg,
        egg_source: is_dairy_egg && cat.contains("egg"),
    }
}

/// Client for USDA FoodData Central search.
pub struct UsdaFdcClient {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl UsdaFdcClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
            api_key: api_key.into(),
        }
    }

    fn search(&self, query: &str) -> EnrichmentResult {
        if self.api_key.is_empty() || query.trim().is_empty() {
            debug!("skipping USDA FDC: empty query or no api key");
            return EnrichmentResult::miss(SOURCE, "no_key_or_query");
        }
        let query: String = query.trim().chars().take(200).collect();
        let params = [
            ("api_key", self.api_key.clone()),
            ("query", query.clone()),
            ("pageSize", "5".to_string()),
        ];

        let resp = match get_with_retries(
            &self.client,
            USDA_SEARCH_URL,
            &params,
            DEFAULT_MAX_RETRIES,
            DEFAULT_INITIAL_BACKOFF,
        ) {
            Ok(resp) => resp,
            Err(e) => {
                warn!(query = %query, error = %e, "USDA FDC fetch failed after retries");
                return EnrichmentResult::miss(SOURCE, format!("error:{e}"));
            }
        };

        if !resp.status().is_success() {
            warn!(query = %query, status = %resp.status(), "USDA FDC response error");
            return EnrichmentResult::miss(SOURCE, format!("status:{}", resp.status()));
        }
        let data: Value = match resp.json() {
            Ok(v) => v,
            Err(e) => {
                warn!(query = %query, error = %e, "USDA FDC unparsable response");
                return EnrichmentResult::miss(SOURCE, "unparsable_json");
            }
        };

        let foods = data.get("foods").and_then(Value::as_array);
        let Some(best) = foods.and_then(|f| f.first()) else {
            info!(query = %query, "USDA FDC no results");
            return EnrichmentResult::miss(SOURCE, "no_results");
        };

        let desc = best
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        let desc_lower = desc.to_lowercase();
        let q_lower = query.to_lowercase();
        let first_token = q_lower.split_whitespace().next().unwrap_or("");
        let confidence = if !desc_lower.is_empty()
            && (desc_lower.contains(&q_lower)
                || q_lower.contains(&desc_lower)
                || (!first_token.is_empty() && desc_lower.contains(first_token)))
        {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let ingredient = food_to_ingredient(best, &query);
        let summary = format!("description={}", &desc.chars().take(80).collect::<String>());
        info!(
            query = %query,
            confidence = %confidence,
            fdc_id = best.get("fdcId").and_then(serde_json::Value::as_i64).unwrap_or(-1),
            "USDA FDC success"
        );
        EnrichmentResult::hit(ingredient, confidence, SOURCE, summary)
    }
}

impl FoodDataSource for UsdaFdcClient {
    fn name(&self) -> &str {
        SOURCE
    }

    fn lookup(&self, query: &str) -> EnrichmentResult {
        self.search(query)
    }
}

fn food_category(food: &Value) -> String {
    match food.get("foodCategory") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Object(obj)) => obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

/// Map one USDA FDC food item to the canonical ingredient schema.
pub(crate) fn food_to_ingredient(food: &Value, query: &str) -> Ingredient {
    let desc = food
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    let category = food_category(food);
    let combined = format!("{desc} {category}").to_lowercase();

    let cat_flags = flags_from_category(&category);
    let override_hit = is_plant_override(&combined);
    let t = combined.as_str();

    // Origin: prefer category; fall back to text keywords only when the
    // category is ambiguous (e.g. "Snacks", "Meals").
    let (animal_origin, plant_origin) = if cat_flags.animal_origin && !override_hit {
        (true, cat_flags.plant_origin)
    } else if cat_flags.plant_origin || override_hit {
        (false, true)
    } else {
        let animal_keywords = [
            "meat", "beef", "pork", "chicken", "fish", "gelatin", "lard", "tallow", "animal",
            "whey", "casein", "rennet",
        ];
        let animal = !override_hit && animal_keywords.iter().any(|w| word_match(t, w));
        (animal, !animal)
    };

    let dairy_source = if cat_flags.dairy_source && !override_hit {
        true
    } else if override_hit {
        false
    } else {
        let dairy_keywords = [
            "milk", "cheese", "whey", "cream", "butter", "dairy", "lactose", "casein", "ghee",
            "curd", "yogurt",
        ];
        dairy_keywords.iter().any(|w| word_match(t, w))
    };

    let egg_source = if cat_flags.egg_source {
        true
    } else if override_hit {
        false
    } else {
        word_match(t, "egg") && !t.contains("eggplant") && !t.contains("egg plant")
    };

    let gluten_source = ["wheat", "barley", "rye", "gluten"]
        .iter()
        .any(|w| word_match(t, w));
    let soy_source = ["soy", "soybean", "tofu", "tempeh"]
        .iter()
        .any(|w| word_match(t, w));
    let nut_source = if word_match(t, "peanut") {
        Some("peanut".to_string())
    } else if ["almond", "walnut", "cashew", "pecan", "hazelnut", "macadamia", "pistachio"]
        .iter()
        .any(|w| word_match(t, w))
    {
        Some("tree_nut".to_string())
    } else {
        None
    };
    let alcohol_content = if ["alcohol", "wine", "beer", "spirit", "rum", "vodka", "whiskey"]
        .iter()
        .any(|w| word_match(t, w))
    {
        Some(1.0)
    } else {
        None
    };

    let animal_species = if animal_origin {
        infer_species(&category.to_lowercase(), t)
    } else {
        None
    };

    let canonical = if desc.is_empty() {
        query.to_string()
    } else {
        desc.clone()
    };
    Ingredient {
        id: format!("usda_{}", normalize_id(&canonical)),
        canonical_name: canonical.clone(),
        aliases: if !query.is_empty() && query != canonical {
            vec![query.to_string()]
        } else {
            Vec::new()
        },
        animal_origin,
        plant_origin,
        animal_species,
        egg_source,
        dairy_source,
        gluten_source,
        nut_source,
        soy_source,
        sesame_source: word_match(t, "sesame"),
        alcohol_content,
        root_vegetable: ["potato", "carrot", "beet", "radish", "turnip", "yam"]
            .iter()
            .any(|w| word_match(t, w)),
        onion_source: word_match(t, "onion") && !override_hit,
        garlic_source: word_match(t, "garlic") && !override_hit,
        uncertainty_flags: if desc.is_empty() {
            vec!["usda_fdc_inferred".to_string()]
        } else {
            Vec::new()
        },
        ..Default::default()
    }
}

/// Re-derive the species from category + description for restriction
/// matching (halal/kosher/pescatarian need to know cow vs pig vs fish).
fn infer_species(cat_low: &str, combined_low: &str) -> Option<String> {
    let w = |word: &str| word_match(combined_low, word);
    if cat_low.contains("pork") || w("pork") || w("bacon") || w("ham") {
        Some("pig".to_string())
    } else if cat_low.contains("beef") || w("beef") || w("veal") {
        Some("cow".to_string())
    } else if cat_low.contains("poultry") || w("chicken") || w("turkey") || w("duck") {
        Some("chicken".to_string())
    } else if cat_low.contains("lamb") || w("lamb") || w("mutton") || w("goat") {
        Some("lamb".to_string())
    } else if cat_low.contains("finfish") || cat_low.contains("shellfish") {
        let shellfish = [
            "shrimp", "crab", "lobster", "prawn", "clam", "mussel", "oyster", "scallop",
        ];
        if shellfish.iter().any(|s| word_match(combined_low, s)) {
            Some("shellfish".to_string())
        } else {
            Some("fish".to_string())
        }
    } else if w("fish") || w("salmon") || w("tuna") || w("cod") {
        Some("fish".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_beef_category_maps_to_cow() {
        let food = json!({
            "description": "Beef, ground, 80% lean",
            "foodCategory": "Beef Products"
        });
        let ing = food_to_ingredient(&food, "ground beef");
        assert!(ing.animal_origin);
        assert!(!ing.plant_origin);
        assert_eq!(ing.animal_species.as_deref(), Some("cow"));
        assert!(ing.meat_fish_derived());
    }

    #[test]
    fn test_dairy_category() {
        let food = json!({
            "description": "Milk, whole",
            "foodCategory": "Dairy and Egg Products"
        });
        let ing = food_to_ingredient(&food, "milk");
        assert!(ing.animal_origin);
        assert!(ing.dairy_source);
        assert!(!ing.meat_fish_derived());
    }

    #[test]
    fn test_plant_override_suppresses_dairy() {
        let food = json!({
            "description": "Peanut butter, smooth",
            "foodCategory": "Legumes and Legume Products"
        });
        let ing = food_to_ingredient(&food, "peanut butter");
        assert!(!ing.animal_origin);
        assert!(ing.plant_origin);
        assert!(!ing.dairy_source);
        assert_eq!(ing.nut_source.as_deref(), Some("peanut"));
    }

    #[test]
    fn test_eggplant_is_not_egg() {
        let food = json!({
            "description": "Eggplant, raw",
            "foodCategory": "Vegetables and Vegetable Products"
        });
        let ing = food_to_ingredient(&food, "eggplant");
        assert!(!ing.egg_source);
        assert!(ing.plant_origin);
    }

    #[test]
    fn test_category_object_form() {
        let food = json!({
            "description": "Salmon, Atlantic",
            "foodCategory": {"description": "Finfish and Shellfish Products"}
        });
        let ing = food_to_ingredient(&food, "salmon");
        assert!(ing.animal_origin);
        assert_eq!(ing.animal_species.as_deref(), Some("fish"));
    }

    #[test]
    fn test_shellfish_species() {
        let food = json!({
            "description": "Shrimp, cooked",
            "foodCategory": "Finfish and Shellfish Products"
        });
        let ing = food_to_ingredient(&food, "shrimp");
        assert_eq!(ing.animal_species.as_deref(), Some("shellfish"));
    }

    #[test]
    fn test_ambiguous_category_uses_text() {
        let food = json!({
            "description": "Gelatin dessert mix",
            "foodCategory": "Sweets"
        });
        let ing = food_to_ingredient(&food, "gelatin");
        assert!(ing.animal_origin);
    }

    #[test]
    fn test_query_kept_as_alias() {
        let food = json!({
            "description": "Tapioca, pearl, dry",
            "foodCategory": "Cereal Grains and Pasta"
        });
        let ing = food_to_ingredient(&food, "tapioca starch");
        assert_eq!(ing.aliases, vec!["tapioca starch"]);
        assert!(ing.id.starts_with("usda_"));
    }
}
