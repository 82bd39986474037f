//! Lookup-key normalization.
//!
//! Produces the deterministic key used for ontology lookup. No substring
//! or fuzzy matching: unknown keys stay unknown and are handled upstream.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Known spelling variants for ontology lookup (normalized key -> canonical key).
const KNOWN_VARIANTS: &[(&str, &str)] = &[
    // Isinglass variants
    ("inglass", "isinglass"),
    ("fish gelatin", "isinglass"),
    ("fish bladder", "isinglass"),
    // Shellac variants
    ("confectioners glaze", "shellac"),
    ("confectioner's glaze", "shellac"),
    ("resinous glaze", "shellac"),
    ("pharmaceutical glaze", "shellac"),
    ("e904", "shellac"),
    // L-cysteine variants
    ("l cysteine", "l-cysteine"),
    ("cysteine", "l-cysteine"),
    ("e920", "l-cysteine"),
    // Lanolin variants
    ("wool grease", "lanolin"),
    ("wool wax", "lanolin"),
    ("wool fat", "lanolin"),
    // Anchovy variants
    ("anchovie", "anchovy"),
    ("anchovies", "anchovy"),
    ("anchovy paste", "anchovy"),
    ("anchovy extract", "anchovy"),
    // Irregular plurals the conservative stripper cannot reach
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("berries", "berry"),
    ("cherries", "cherry"),
    ("strawberries", "strawberry"),
    ("blueberries", "blueberry"),
    ("raspberries", "raspberry"),
    ("cranberries", "cranberry"),
    // Gelatin / gelatine normalization
    ("gelatine", "gelatin"),
    // Common E-number food additives
    ("e120", "carmine"),
    ("e441", "gelatin"),
    ("e542", "bone phosphate"),
    ("e631", "disodium inosinate"),
    ("e901", "beeswax"),
    ("e966", "lactitol"),
    // Rennet variants
    ("animal rennet", "rennet"),
];

/// Suffixes that block conservative plural stripping ("hummus", "molasses",
/// "couscous" and friends must keep their trailing s).
const NO_STRIP_SUFFIXES: &[&str] = &["us", "ss", "is", "os", "as"];

fn variant_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| KNOWN_VARIANTS.iter().copied().collect())
}

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,;:\-\u{2013}\u{2014}]+").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Conservative singular form used as a second-chance lookup key.
///
/// Strips one trailing `s` unless the word ends in a no-strip suffix, so
/// "carrots" becomes "carrot" while "hummus" and "couscous" stay intact.
pub fn singularize(word: &str) -> String {
    let w = word.trim();
    if w.len() > 3
        && w.ends_with('s')
        && !NO_STRIP_SUFFIXES.iter().any(|suf| w.ends_with(suf))
    {
        w[..w.len() - 1].to_string()
    } else {
        w.to_string()
    }
}

/// Normalize a raw ingredient string for lookup.
///
/// - Lowercase, trim, remove excess punctuation and whitespace.
/// - Apply known variants (e.g. inglass -> isinglass, e120 -> carmine).
/// - Conservative plural fold ("eggs" -> "egg") guarded by the no-strip
///   suffix set.
/// - No substring or fuzzy matching.
pub fn normalize_ingredient_key(text: &str) -> String {
    let t = text.to_lowercase();
    let t = t.trim().replace(['*', '.'], "");
    let t = punctuation_re().replace_all(&t, " ");
    let t = whitespace_re().replace_all(&t, " ");
    let t = t.trim().to_string();
    if t.is_empty() {
        return t;
    }
    if let Some(canonical) = variant_table().get(t.as_str()) {
        if *canonical != t {
            debug!(raw = %t, canonical = %canonical, "variant applied");
        }
        return (*canonical).to_string();
    }
    // Single-word plural fold only; multi-word names keep their form so
    // keys like "green beans" match the ontology alias as written.
    if !t.contains(' ') {
        let singular = singularize(&t);
        if singular != t {
            if let Some(canonical) = variant_table().get(singular.as_str()) {
                return (*canonical).to_string();
            }
            return singular;
        }
    }
    t
}

/// Split raw text into candidate ingredient tokens (comma, newline,
/// semicolon), normalizing each. Does not resolve or validate.
pub fn tokenize_ingredients(raw_text: &str) -> Vec<String> {
    raw_text
        .split(['\n', ',', ';'])
        .map(normalize_ingredient_key)
        .filter(|t| !t.is_empty())
        .collect()
}
