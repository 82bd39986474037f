//! Deterministic ingredient-label parsing.
//!
//! This crate turns raw label text into the atomic, normalized ingredient
//! strings the compliance engine evaluates:
//!
//! - `normalizer`: lookup-key normalization with a fixed variant table
//! - `flatten`: parenthesis/comma flattening and processed-food expansion
//! - `trace`: "<2 %" trace-marker detection
//! - `compound`: compound product-name expansion ("garlic pasta" → garlic)
//!
//! Everything in here is pure string processing; no I/O, no fuzzy matching.

pub mod compound;
pub mod flatten;
pub mod normalizer;
pub mod trace;

pub use compound::{expand_compounds, find_sub_ingredients};
pub use flatten::flatten_ingredients;
pub use normalizer::{normalize_ingredient_key, singularize, tokenize_ingredients};
pub use trace::{get_trace_keys, preprocess_ingredients, PreprocessedIngredient};

use std::collections::HashSet;

/// Preprocess a list of (possibly complex) ingredient strings into atomic
/// names plus the subset of keys flagged as trace (<2 %).
///
/// Combines trace detection with flattening: each trace-marked atom is
/// flattened (processed foods expand to their base ingredients) and every
/// resulting atom inherits the trace flag.
pub fn preprocess_ingredient_list(ingredients: &[String]) -> (Vec<String>, HashSet<String>) {
    let mut flattened: Vec<String> = Vec::new();
    let mut trace_keys: HashSet<String> = HashSet::new();

    for raw in ingredients {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let items = preprocess_ingredients(raw);
        for item in &items {
            for atom in flatten_ingredients(&item.name) {
                if item.trace {
                    trace_keys.insert(atom.clone());
                }
                flattened.push(atom);
            }
        }
        // Nothing survived preprocessing (e.g. a lone trace marker): fall
        // back to flattening the whole string.
        if items.is_empty() {
            flattened.extend(flatten_ingredients(raw));
        }
    }

    (flattened, trace_keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_list_expands_and_flags_trace() {
        let input = vec!["Water, Sugar, Contains 2% or less of: Salt, Natural Flavor".to_string()];
        let (atoms, trace) = preprocess_ingredient_list(&input);
        assert_eq!(atoms, vec!["water", "sugar", "salt", "natural flavor"]);
        assert!(trace.contains("salt"));
        assert!(trace.contains("natural flavor"));
        assert!(!trace.contains("water"));
    }

    #[test]
    fn test_preprocess_list_expands_processed_food() {
        let input = vec!["potato chips".to_string()];
        let (atoms, trace) = preprocess_ingredient_list(&input);
        assert_eq!(atoms, vec!["potato", "vegetable oil", "salt"]);
        assert!(trace.is_empty());
    }
}
