//! Compound ingredient expansion for compliance evaluation.
//!
//! Handles both explicit ("burger with chicken") and implicit
//! ("garlic pasta", "egg noodles") compound product names, extracting the
//! known restricted-ingredient keywords the compliance engine evaluates.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Known restricted ingredient bigrams, checked before single keywords.
const RESTRICTED_KEYWORDS_BIGRAM: &[&str] = &["sweet potato", "fish oil", "palm oil"];

const RESTRICTED_KEYWORDS_SINGLE: &[&str] = &[
    // Animal-derived
    "egg", "eggs", "chicken", "beef", "pork", "lamb", "fish", "tuna", "salmon", "shrimp",
    "prawn", "crab", "lobster", "bacon", "ham", "turkey", "duck", "veal", "mutton", "anchovy",
    "sardine", "squid", "octopus", "venison", "goat",
    // Dairy
    "milk", "cheese", "butter", "cream", "yogurt", "ghee", "paneer", "whey", "curd",
    // Root vegetables
    "garlic", "onion", "potato", "carrot", "ginger", "beet", "beetroot", "radish", "turnip",
    "shallot", "leek", "yam",
    // Fungal
    "mushroom", "truffle",
    // Other
    "gelatin", "honey", "lard", "alcohol", "wine", "beer", "peanut", "almond", "walnut",
    "cashew", "hazelnut", "pecan", "soy", "tofu", "wheat", "barley", "rye", "oat", "oats",
    "collagen", "rennet", "shellac", "carmine",
];

/// Plant modifiers that neutralize the following dairy/meat word.
/// "coconut milk" is plant-based, not dairy.
const PLANT_MODIFIERS: &[&str] = &[
    "coconut", "almond", "soy", "oat", "oats", "rice", "cashew", "hemp", "pea", "cocoa",
    "shea", "sesame", "flax", "hazelnut", "peanut", "walnut", "pistachio", "macadamia",
    "pecan",
];

fn bigram_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| RESTRICTED_KEYWORDS_BIGRAM.iter().copied().collect())
}

fn single_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| RESTRICTED_KEYWORDS_SINGLE.iter().copied().collect())
}

fn modifier_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| PLANT_MODIFIERS.iter().copied().collect())
}

/// Extract known restricted-ingredient keywords from a compound name.
///
/// - "garlic pasta"   -> ["garlic"]
/// - "egg noodles"    -> ["egg"]
/// - "coconut milk"   -> []   (plant modifier neutralizes "milk")
/// - "butter chicken" -> ["butter", "chicken"]
pub fn find_sub_ingredients(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() <= 1 {
        return Vec::new();
    }
    let mut found: Vec<String> = Vec::new();
    let mut i = 0usize;
    while i < words.len() {
        if i + 1 < words.len() {
            let bigram = format!("{} {}", words[i], words[i + 1]);
            if bigram_set().contains(bigram.as_str()) {
                found.push(bigram);
                i += 2;
                continue;
            }
        }
        if single_set().contains(words[i]) {
            if i > 0 && modifier_set().contains(words[i - 1]) {
                i += 1;
                continue;
            }
            found.push(words[i].to_string());
        }
        i += 1;
    }
    found
}

/// Split "X with Y" into (left, right) when the word "with" appears.
fn split_with(text: &str) -> Option<(&str, &str)> {
    let lower = text.to_lowercase();
    let idx = lower.find(" with ")?;
    let left = text[..idx].trim();
    let right = text[idx + " with ".len()..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

/// Expand compound items for compliance evaluation.
///
/// Returns the expanded ingredient names plus a display map of
/// `{eval_name_lower: original_compound_display_name}` for products whose
/// name carries modifiers beyond the extracted atoms, so a response can
/// say "butter chicken" rather than "chicken".
pub fn expand_compounds(ingredients: &[String]) -> (Vec<String>, IndexMap<String, String>) {
    let mut expanded: Vec<String> = Vec::new();
    let mut display_map: IndexMap<String, String> = IndexMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    for ing in ingredients {
        // 1. Explicit "X with Y" pattern
        if let Some((_, right)) = split_with(ing) {
            let key = right.to_lowercase();
            if seen.insert(key.clone()) {
                expanded.push(right.to_string());
                display_map.insert(key, ing.clone());
            }
            continue;
        }

        // 2. Single-word ingredient passes through directly
        if !ing.trim().contains(' ') {
            let key = ing.trim().to_lowercase();
            if seen.insert(key) {
                expanded.push(ing.clone());
            }
            continue;
        }

        // 3. Multi-word: extract known ingredient keywords
        let subs = find_sub_ingredients(ing);
        if subs.is_empty() {
            let key = ing.trim().to_lowercase();
            if seen.insert(key) {
                expanded.push(ing.clone());
            }
            continue;
        }

        // A product name with words beyond the extracted keywords keeps
        // its display form ("garlic pasta" shows as the product, "butter
        // chicken" is just its parts).
        let covered: HashSet<&str> = subs.iter().flat_map(|s| s.split_whitespace()).collect();
        let lower = ing.to_lowercase();
        let is_compound_product = lower.split_whitespace().any(|w| !covered.contains(w));

        for sub in subs {
            let key = sub.to_lowercase();
            if seen.insert(key.clone()) {
                expanded.push(sub);
                if is_compound_product {
                    display_map.insert(key, ing.clone());
                }
            }
        }
    }

    (expanded, display_map)
}
