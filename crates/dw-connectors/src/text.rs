//! Text helpers shared by the connectors: word-boundary matching, plant
//! overrides, and id slugs.

/// Plant-based items whose names contain misleading animal keywords.
/// Prevents false positives like "peanut butter" -> dairy or
/// "almond milk" -> dairy.
const PLANT_OVERRIDE_PATTERNS: &[&str] = &[
    "peanut butter", "almond butter", "cashew butter", "sunflower butter",
    "cocoa butter", "shea butter", "apple butter", "body butter",
    "almond milk", "oat milk", "soy milk", "rice milk", "coconut milk",
    "cashew milk", "hemp milk", "flax milk",
    "coconut cream", "coconut yogurt", "coconut cheese",
    "vegan cheese", "vegan butter", "vegan cream", "vegan egg",
    "tofu", "tempeh", "seitan", "jackfruit", "nutritional yeast",
    "plant-based", "plant based", "meatless", "dairy-free", "dairy free",
    "eggplant", "egg plant", "egusi",
    "butternut", "buttercup squash", "butterbean", "butter bean",
    "butterscotch",
    "cream of tartar", "creamed corn", "cream soda", "ice cream bean",
];

/// True if the text matches a known plant-based item despite containing
/// animal keywords.
pub fn is_plant_override(text: &str) -> bool {
    let t = text.to_lowercase();
    PLANT_OVERRIDE_PATTERNS.iter().any(|p| t.contains(p))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Word-boundary match: "butter" matches in "salted butter" but not in
/// "butterscotch". Expects lowercase input on both sides.
pub fn word_match(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(word) {
        let abs = start + pos;
        let before_ok = abs == 0
            || !text[..abs].chars().next_back().map(is_word_char).unwrap_or(false);
        let end = abs + word.len();
        let after_ok = end >= text.len()
            || !text[end..].chars().next().map(is_word_char).unwrap_or(false);
        if before_ok && after_ok {
            return true;
        }
        start = end;
        if start >= text.len() {
            break;
        }
    }
    false
}

/// Word-boundary match with plural tolerance: "onion" matches "onion",
/// "onions", and "onione s"-style plural spellings ("es").
pub fn word_match_plural(text: &str, word: &str) -> bool {
    word_match(text, word)
        || word_match(text, &format!("{word}s"))
        || word_match(text, &format!("{word}es"))
}

/// Slug for an ingredient id (lowercase alphanumeric and underscores,
/// capped at 64 chars).
pub fn normalize_id(name: &str) -> String {
    let mut slug = String::new();
    let mut last_was_sep = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    let slug = slug.trim_matches('_').to_string();
    let slug = if slug.len() > 64 {
        slug[..64].trim_end_matches('_').to_string()
    } else {
        slug
    };
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}
