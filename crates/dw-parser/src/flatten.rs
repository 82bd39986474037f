//! Flatten ingredient strings for evaluation: split parentheses and
//! top-level commas, map processed foods to their base ingredients.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::normalizer::normalize_ingredient_key;

/// Processed food -> base ingredients. Keys are normalized; values are base
/// ingredients for ontology lookup. Deterministic, no inference.
const PROCESSED_FOOD_TO_BASE: &[(&str, &[&str])] = &[
    ("potato chips", &["potato", "vegetable oil", "salt"]),
    ("potato chip", &["potato", "vegetable oil", "salt"]),
    ("french fries", &["potato", "vegetable oil", "salt"]),
    ("french fry", &["potato", "vegetable oil", "salt"]),
    ("tortilla chips", &["corn", "vegetable oil", "salt"]),
    ("tortilla chip", &["corn", "vegetable oil", "salt"]),
    ("corn chips", &["corn", "vegetable oil", "salt"]),
    ("corn chip", &["corn", "vegetable oil", "salt"]),
    ("pretzels", &["wheat flour", "salt", "yeast"]),
    ("pretzel", &["wheat flour", "salt", "yeast"]),
    ("crackers", &["wheat flour", "vegetable oil", "salt"]),
    ("cracker", &["wheat flour", "vegetable oil", "salt"]),
    ("bread", &["wheat flour", "water", "salt", "yeast"]),
    ("white bread", &["wheat flour", "water", "salt", "yeast"]),
    ("pasta", &["wheat flour", "water", "egg"]),
    ("spaghetti", &["wheat flour", "water", "egg"]),
    ("macaroni", &["wheat flour", "water", "egg"]),
    ("noodles", &["wheat flour", "water", "egg"]),
    ("rice noodles", &["rice flour", "water"]),
    ("couscous", &["wheat flour", "water"]),
    ("hummus", &["chickpea", "sesame", "olive oil", "lemon", "garlic"]),
    ("ketchup", &["tomato", "sugar", "vinegar", "salt"]),
    ("mustard", &["mustard seed", "vinegar", "salt"]),
    ("mayonnaise", &["egg", "vegetable oil", "vinegar"]),
    ("salsa", &["tomato", "onion", "pepper", "lime", "salt"]),
    ("soy sauce", &["soybean", "wheat", "salt", "water"]),
    ("teriyaki sauce", &["soy sauce", "sugar", "ginger", "garlic"]),
    ("bbq sauce", &["tomato", "vinegar", "sugar", "molasses"]),
    ("hot sauce", &["pepper", "vinegar", "salt"]),
    ("peanut butter", &["peanut", "salt", "vegetable oil"]),
    ("almond butter", &["almond", "salt", "vegetable oil"]),
    ("jam", &["fruit", "sugar", "pectin"]),
    ("jelly", &["fruit juice", "sugar", "pectin"]),
    ("marmalade", &["citrus", "sugar", "pectin"]),
    ("chocolate", &["cocoa", "sugar", "cocoa butter", "milk"]),
    ("dark chocolate", &["cocoa", "sugar", "cocoa butter"]),
    ("milk chocolate", &["cocoa", "sugar", "cocoa butter", "milk"]),
    ("ice cream", &["milk", "cream", "sugar", "egg"]),
    ("yogurt", &["milk", "bacterial culture"]),
    ("cheese", &["milk", "salt", "rennet"]),
    ("butter", &["milk", "salt"]),
    ("tofu", &["soybean", "water"]),
    ("tempeh", &["soybean", "water"]),
    ("seitan", &["wheat gluten", "water"]),
    ("plant-based meat", &["soy", "wheat", "vegetable oil", "flavoring"]),
    ("veggie burger", &["vegetable", "legume", "grain", "binding"]),
    ("vegan cheese", &["coconut oil", "starch", "flavoring"]),
    ("oat milk", &["oat", "water"]),
    ("almond milk", &["almond", "water"]),
    ("soy milk", &["soybean", "water"]),
    ("rice milk", &["rice", "water"]),
    ("coconut milk", &["coconut", "water"]),
];

fn processed_food_map() -> &'static HashMap<&'static str, &'static [&'static str]> {
    static MAP: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();
    MAP.get_or_init(|| PROCESSED_FOOD_TO_BASE.iter().copied().collect())
}

/// Look up a normalized key in the processed-food map.
pub(crate) fn processed_food_expansion(key: &str) -> Option<&'static [&'static str]> {
    processed_food_map().get(key).copied()
}

/// Split at top-level commas only; commas inside parentheses do not split.
pub(crate) fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}

/// Split by top-level parentheses, flattening content inside.
///
/// `Enriched Flour (Wheat Flour, Niacin, Iron)` ->
/// `["Enriched Flour", "Wheat Flour", "Niacin", "Iron"]`
///
/// Nested parentheses are flattened recursively.
pub(crate) fn split_by_parentheses(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if text.trim().is_empty() {
        return out;
    }
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    let chunk = text[start..i].trim();
                    if !chunk.is_empty() {
                        out.push(chunk.to_string());
                    }
                    start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        let inner = text[start..i].trim();
                        if !inner.is_empty() {
                            for part in inner.split(',') {
                                let part = part.trim();
                                if !part.is_empty() {
                                    out.extend(split_by_parentheses(part));
                                }
                            }
                        }
                        start = i + 1;
                    }
                }
            }
            _ => {}
        }
    }
    if depth == 0 && start < text.len() {
        let chunk = text[start..].trim();
        if !chunk.is_empty() {
            out.push(chunk.to_string());
        }
    }
    out
}

/// Flatten a raw ingredient string into a list of normalized base
/// ingredients.
///
/// 1. Normalize and check the processed-food map for the whole string
///    ("potato chips" -> ["potato", "vegetable oil", "salt"]).
/// 2. Otherwise split by top-level commas, then by parentheses.
/// 3. Normalize each part, expanding processed-food hits.
/// 4. Return a deduplicated list preserving first-seen order.
pub fn flatten_ingredients(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let key = normalize_ingredient_key(raw);
    if let Some(expansion) = processed_food_expansion(&key) {
        return expansion.iter().map(|s| s.to_string()).collect();
    }

    let mut flat: Vec<String> = Vec::new();
    for segment in split_top_level_commas(raw) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        for part in split_by_parentheses(segment) {
            let pk = normalize_ingredient_key(&part);
            if pk.is_empty() {
                continue;
            }
            if let Some(expansion) = processed_food_expansion(&pk) {
                flat.extend(expansion.iter().map(|s| s.to_string()));
            } else {
                flat.push(pk);
            }
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    flat.into_iter()
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_top_level_commas_respects_parens() {
        let parts = split_top_level_commas("a (b, c), d");
        assert_eq!(parts, vec!["a (b, c)", " d"]);
    }

    #[test]
    fn test_flatten_parentheses() {
        let atoms = flatten_ingredients("Enriched Flour (Wheat Flour, Niacin, Iron)");
        assert_eq!(atoms, vec!["enriched flour", "wheat flour", "niacin", "iron"]);
    }

    #[test]
    fn test_flatten_nested_parentheses() {
        let atoms = flatten_ingredients("Seasoning (Spices (Paprika, Turmeric), Salt)");
        assert_eq!(atoms, vec!["seasoning", "spices", "paprika", "turmeric", "salt"]);
    }

    #[test]
    fn test_flatten_processed_food_whole_string() {
        assert_eq!(
            flatten_ingredients("Potato Chips"),
            vec!["potato", "vegetable oil", "salt"]
        );
    }

    #[test]
    fn test_flatten_processed_food_inside_list() {
        let atoms = flatten_ingredients("water, mayonnaise");
        assert_eq!(atoms, vec!["water", "egg", "vegetable oil", "vinegar"]);
    }

    #[test]
    fn test_flatten_deduplicates_preserving_order() {
        let atoms = flatten_ingredients("salt, sugar, salt, water");
        assert_eq!(atoms, vec!["salt", "sugar", "water"]);
    }

    #[test]
    fn test_flatten_idempotent_on_flat_lists() {
        let once = flatten_ingredients("water, sugar, cocoa");
        let again = flatten_ingredients(&once.join(", "));
        assert_eq!(once, again);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten_ingredients("").is_empty());
        assert!(flatten_ingredients("   ").is_empty());
    }
}
