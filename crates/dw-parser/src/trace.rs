//! Trace ("<2 %") ingredient preprocessing.
//!
//! US labels list minor ingredients behind markers like "contains 2% or
//! less of". Atoms after such a marker are informational: they stay in the
//! evaluation but an unresolved trace atom does not force UNCERTAIN.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::flatten::{split_by_parentheses, split_top_level_commas};
use crate::normalizer::normalize_ingredient_key;

fn trace_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)less than 2%? of",
            r"(?i)<\s*2%?\s*of",
            r"(?i)2%?\s*or less",
            r"(?i)contains 2%?\s*or less",
            r"(?i)\(\s*<\s*2\s*%?\s*\)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static regex"))
        .collect()
    })
}

fn strip_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\s*[<(]\s*<\s*2\s*%?\s*[>)]\s*",
            r"(?i)\s*<\s*2\s*%?\s*",
            r"(?i)\s*less than 2%?\s*of\s*:?\s*",
            r"(?i)\s*contains 2%?\s*or less\s*(?:of\s*)?:?\s*",
            r"(?i)\s*2%?\s*or less\s*(?:of\s*)?:?\s*",
            r"^\s*:+\s*",
            r"(?i)^\s*of\s*:?\s*",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static regex"))
        .collect()
    })
}

/// One atomic ingredient with its trace flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessedIngredient {
    /// Normalized lookup key
    pub name: String,
    /// True when the atom follows a "<2 %" marker
    pub trace: bool,
}

fn is_trace_section(text: &str) -> bool {
    trace_patterns().iter().any(|p| p.is_match(text))
}

fn strip_trace_markers(text: &str) -> String {
    let mut t = text.to_string();
    for pat in strip_patterns() {
        t = pat.replace_all(&t, " ").to_string();
    }
    t.trim().to_string()
}

/// Preprocess a raw ingredient label into atomic ingredients with trace
/// flags.
///
/// 1. Split by top-level commas, then flatten parentheses.
/// 2. Once a trace marker is seen, every later atom is trace.
/// 3. Normalize each atom.
/// 4. Deduplicate by key, preserving order; any trace occurrence keeps the
///    flag set.
pub fn preprocess_ingredients(raw: &str) -> Vec<PreprocessedIngredient> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut result: indexmap::IndexMap<String, bool> = indexmap::IndexMap::new();
    let mut trace_until_end = false;
    for segment in split_top_level_commas(raw) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        // A marker anywhere in the segment (including a trailing "(<2%)")
        // flags the whole segment and everything after it.
        let segment_marks = is_trace_section(segment);
        if segment_marks {
            trace_until_end = true;
        }
        for part in split_by_parentheses(segment) {
            let is_trace = trace_until_end || segment_marks || is_trace_section(&part);
            let cleaned = strip_trace_markers(&part);
            if cleaned.is_empty() {
                continue;
            }
            let key = normalize_ingredient_key(&cleaned);
            if key.is_empty() {
                continue;
            }
            let entry = result.entry(key).or_insert(false);
            *entry = *entry || is_trace;
        }
    }

    result
        .into_iter()
        .map(|(name, trace)| PreprocessedIngredient { name, trace })
        .collect()
}

/// Return the set of normalized keys marked as trace (<2 %).
pub fn get_trace_keys(preprocessed: &[PreprocessedIngredient]) -> HashSet<String> {
    preprocessed
        .iter()
        .filter(|p| p.trace)
        .map(|p| p.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_trace_markers() {
        let items = preprocess_ingredients("Water, Sugar, Salt");
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| !i.trace));
    }

    #[test]
    fn test_trace_marker_flags_following_atoms() {
        let items =
            preprocess_ingredients("Water, Sugar, Contains 2% or less of: Xyz Compound");
        assert_eq!(
            items,
            vec![
                PreprocessedIngredient { name: "water".into(), trace: false },
                PreprocessedIngredient { name: "sugar".into(), trace: false },
                PreprocessedIngredient { name: "xyz compound".into(), trace: true },
            ]
        );
    }

    #[test]
    fn test_trace_persists_to_end_of_list() {
        let items = preprocess_ingredients("Flour, Less than 2% of: Salt, Yeast, Spice");
        let trace = get_trace_keys(&items);
        assert!(trace.contains("salt"));
        assert!(trace.contains("yeast"));
        assert!(trace.contains("spice"));
        assert!(!trace.contains("flour"));
    }

    #[test]
    fn test_trace_marker_inside_parens() {
        let items = preprocess_ingredients("Water, Natural Flavor (<2%)");
        let trace = get_trace_keys(&items);
        assert!(trace.contains("natural flavor"));
    }

    #[test]
    fn test_duplicate_keeps_trace_flag() {
        let items = preprocess_ingredients("Salt, contains 2% or less of salt");
        assert_eq!(items.len(), 1);
        assert!(items[0].trace);
    }

    #[test]
    fn test_empty_input() {
        assert!(preprocess_ingredients("").is_empty());
    }
}
