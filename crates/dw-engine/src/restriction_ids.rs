//! Profile -> restriction-id derivation.
//!
//! Data tables mapping dietary preferences, allergen names, and lifestyle
//! flags onto restriction ids. Tolerant of display spellings ("Peanuts",
//! "Wheat/Gluten") and separator variants (spaces, hyphens).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::profile::{UserProfile, NO_RULES};

/// Primary dietary preference (covers religious diets) -> restriction id.
const DIETARY_PREFERENCE_TO_ID: &[(&str, &str)] = &[
    ("jain", "jain"),
    ("vegan", "vegan"),
    ("vegetarian", "vegetarian"),
    ("hindu_veg", "hindu_vegetarian"),
    ("hindu_vegetarian", "hindu_vegetarian"),
    ("hindu_non_vegetarian", "hindu_non_vegetarian"),
    ("hindu_non_veg", "hindu_non_vegetarian"),
    ("halal", "halal"),
    ("kosher", "kosher"),
    ("lacto_vegetarian", "lacto_vegetarian"),
    ("ovo_vegetarian", "ovo_vegetarian"),
    ("pescatarian", "pescatarian"),
    ("gluten_free", "gluten_free"),
    ("dairy_free", "dairy_free"),
    ("egg_free", "egg_free"),
];

/// Allergen profile key -> restriction id.
const ALLERGEN_TO_ID: &[(&str, &str)] = &[
    ("peanut", "peanut_allergy"),
    ("peanuts", "peanut_allergy"),
    ("nut", "tree_nut_allergy"),
    ("nuts", "tree_nut_allergy"),
    ("tree_nut", "tree_nut_allergy"),
    ("tree_nuts", "tree_nut_allergy"),
    ("soy", "soy_allergy"),
    ("shellfish", "shellfish_allergy"),
    ("fish", "fish_allergy"),
    ("sesame", "sesame_allergy"),
    ("onion", "onion_allergy"),
    ("garlic", "garlic_allergy"),
    ("gluten", "gluten_free"),
    ("wheat", "gluten_free"),
    ("wheat/gluten", "gluten_free"),
    ("wheat_gluten", "gluten_free"),
    ("milk", "dairy_free"),
    ("dairy", "dairy_free"),
    ("egg", "egg_free"),
    ("eggs", "egg_free"),
    ("mustard", "mustard_allergy"),
    ("celery", "celery_allergy"),
];

/// Lifestyle flag (and secondary dietary/religious values) -> restriction id.
const LIFESTYLE_TO_ID: &[(&str, &str)] = &[
    ("vegan", "vegan"),
    ("vegetarian", "vegetarian"),
    ("jain", "jain"),
    ("halal", "halal"),
    ("kosher", "kosher"),
    ("hindu_veg", "hindu_vegetarian"),
    ("hindu_vegetarian", "hindu_vegetarian"),
    ("hindu_non_veg", "hindu_non_vegetarian"),
    ("hindu_non_vegetarian", "hindu_non_vegetarian"),
    ("lacto_vegetarian", "lacto_vegetarian"),
    ("ovo_vegetarian", "ovo_vegetarian"),
    ("pescatarian", "pescatarian"),
    ("gluten_free", "gluten_free"),
    ("dairy_free", "dairy_free"),
    ("egg_free", "egg_free"),
    ("no_onion", "no_onion"),
    ("no_garlic", "no_garlic"),
    ("no_alcohol", "no_alcohol"),
    ("no_insect_derived", "no_insect_derived"),
    ("no_palm_oil", "no_palm_oil"),
    ("no_artificial_colors", "no_artificial_colors"),
    ("no_gmos", "no_gmos"),
    ("no_seed_oils", "no_seed_oils"),
];

fn preference_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| DIETARY_PREFERENCE_TO_ID.iter().copied().collect())
}

fn allergen_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| ALLERGEN_TO_ID.iter().copied().collect())
}

fn lifestyle_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| LIFESTYLE_TO_ID.iter().copied().collect())
}

/// Fold a profile value to its lookup key: lowercase, trimmed, spaces and
/// hyphens as underscores.
fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Derive restriction ids from a profile: primary dietary preference,
/// then allergens, then lifestyle flags. Ordered, deduplicated; unknown
/// values are skipped.
pub fn build_restriction_ids(profile: &UserProfile) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut add = |id: &str, ids: &mut Vec<String>| {
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    };

    let pref = profile.dietary_preference.trim();
    if !pref.is_empty() && !pref.eq_ignore_ascii_case(NO_RULES) {
        let key = normalize_key(pref);
        if let Some(id) = preference_map().get(key.as_str()) {
            add(id, &mut ids);
        } else if let Some(id) = lifestyle_map().get(key.as_str()) {
            add(id, &mut ids);
        }
    }

    for allergen in &profile.allergens {
        let key = normalize_key(allergen);
        if let Some(id) = allergen_map().get(key.as_str()) {
            add(id, &mut ids);
        } else if let Some(id) = lifestyle_map().get(key.as_str()) {
            add(id, &mut ids);
        }
    }

    for flag in &profile.lifestyle {
        let key = normalize_key(flag);
        if let Some(id) = lifestyle_map().get(key.as_str()) {
            add(id, &mut ids);
        }
    }

    ids
}
