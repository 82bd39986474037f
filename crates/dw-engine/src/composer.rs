//! Template-based response composer.
//!
//! Converts structured verdicts plus context into conversational text.
//! This path is deterministic and always available; the LLM composer in
//! [`crate::llm_response`] may rewrite it but reverts here on failure.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use indexmap::IndexMap;

use dw_intent::ProfileUpdates;

use crate::profile::{UserProfile, NO_RULES};
use crate::verdict::{ComplianceVerdict, VerdictStatus};

/// Restriction id -> human-readable diet label.
const RESTRICTION_DISPLAY: &[(&str, &str)] = &[
    ("jain", "Jain"),
    ("vegan", "vegan"),
    ("vegetarian", "vegetarian"),
    ("halal", "Halal"),
    ("kosher", "Kosher"),
    ("hindu_vegetarian", "Hindu vegetarian"),
    ("hindu_non_vegetarian", "Hindu non-vegetarian"),
    ("lacto_vegetarian", "lacto-vegetarian"),
    ("ovo_vegetarian", "ovo-vegetarian"),
    ("pescatarian", "pescatarian"),
    ("dairy_free", "dairy-free"),
    ("egg_free", "egg-free"),
    ("gluten_free", "gluten-free"),
    ("peanut_allergy", "peanut allergy"),
    ("tree_nut_allergy", "tree-nut allergy"),
    ("soy_allergy", "soy allergy"),
    ("shellfish_allergy", "shellfish allergy"),
    ("fish_allergy", "fish allergy"),
    ("sesame_allergy", "sesame allergy"),
    ("no_alcohol", "no-alcohol"),
    ("no_onion", "no-onion"),
    ("no_garlic", "no-garlic"),
];

/// Ingredient -> short reason why it fails a restriction.
const INGREDIENT_REASONS: &[(&str, &str)] = &[
    ("egg", "animal-derived"),
    ("eggs", "animal-derived"),
    ("cheese", "dairy product"),
    ("milk", "dairy product"),
    ("butter", "dairy product"),
    ("cream", "dairy product"),
    ("yogurt", "dairy product"),
    ("ghee", "dairy product (clarified butter)"),
    ("gelatin", "derived from animal bones/skin"),
    ("honey", "produced by insects"),
    ("beef", "meat (cow)"),
    ("chicken", "meat (poultry)"),
    ("pork", "meat (pig)"),
    ("lamb", "meat"),
    ("fish", "seafood"),
    ("tuna", "fish (seafood)"),
    ("salmon", "fish (seafood)"),
    ("shrimp", "shellfish"),
    ("prawn", "shellfish"),
    ("onion", "root vegetable (restricted)"),
    ("garlic", "root vegetable (restricted)"),
    ("potato", "root vegetable (restricted)"),
    ("carrot", "root vegetable (restricted)"),
    ("beet", "root vegetable (restricted)"),
    ("beetroot", "root vegetable (restricted)"),
    ("radish", "root vegetable (restricted)"),
    ("turnip", "root vegetable (restricted)"),
    ("sweet potato", "root vegetable (restricted)"),
    ("yam", "root vegetable (restricted)"),
    ("shallot", "root vegetable, onion family (restricted)"),
    ("leek", "root vegetable, onion family (restricted)"),
    ("ginger", "root vegetable (restricted)"),
    ("mushroom", "fungal (restricted in strict Jain diet)"),
    ("truffle", "fungal (restricted in strict Jain diet)"),
    ("alcohol", "contains alcohol"),
    ("wine", "contains alcohol"),
    ("beer", "contains alcohol"),
    ("vodka", "contains alcohol"),
    ("collagen", "derived from animal tissue"),
    ("lard", "animal fat (pig)"),
    ("rennet", "animal-derived"),
    ("isinglass", "derived from fish bladders"),
    ("castoreum", "animal secretion"),
    ("shellac", "insect-derived"),
    ("carmine", "insect-derived"),
    ("l-cysteine", "can be derived from animal hair/feathers"),
    ("bacon", "meat (pork-derived)"),
    ("ham", "meat (pork-derived)"),
    ("turkey", "meat (poultry)"),
    ("duck", "meat (poultry)"),
    ("veal", "meat (calf)"),
    ("mutton", "meat (sheep)"),
    ("goat", "meat"),
    ("venison", "meat (deer)"),
    ("anchovy", "fish (seafood)"),
    ("sardine", "fish (seafood)"),
    ("squid", "seafood"),
    ("octopus", "seafood"),
    ("crab", "shellfish"),
    ("lobster", "shellfish"),
    ("whey", "dairy-derived"),
    ("paneer", "dairy product (cheese)"),
    ("curd", "dairy product"),
    ("tofu", "soy-derived"),
    ("peanut", "nut (common allergen)"),
    ("almond", "tree nut"),
    ("walnut", "tree nut"),
    ("cashew", "tree nut"),
    ("hazelnut", "tree nut"),
    ("pecan", "tree nut"),
    ("soy", "soy-derived (allergen)"),
];

/// Product/container words that are not real ingredients; skipped in safe
/// lists.
const PRODUCT_WORDS: &[&str] = &[
    "burger", "bar", "protein bar", "protin bar", "energy bar",
    "cake", "bread", "sandwich", "wrap", "pizza", "pie",
    "cookie", "cookies", "biscuit", "biscuits", "cracker", "crackers",
    "chip", "chips", "crisp", "crisps",
    "noodle", "noodles", "pasta", "ramen",
    "soup", "salad", "stew", "curry",
    "juice", "drink", "smoothie", "shake", "milkshake",
    "cereal", "granola", "muesli",
    "muffin", "bagel", "pancake", "waffle", "toast", "roll", "bun",
    "doughnut", "donut", "pastry", "croissant",
    "ice cream", "gelato", "sorbet", "pudding", "custard",
    "candy", "chocolate bar", "snack", "snacks",
    "sausage", "hotdog", "hot dog", "kebab",
];

/// Ingredients that are always plural in English.
const ALWAYS_PLURAL: &[&str] = &[
    "eggs", "oats", "lentils", "beans", "peas", "fries", "noodles", "nuts", "seeds",
];

/// Nouns that end in "s" but are singular.
const SINGULAR_S_WORDS: &[&str] = &[
    "asparagus", "hummus", "couscous", "molasses", "floss", "bass", "grass", "glass", "gas",
    "bus", "lens",
];

fn reason_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| INGREDIENT_REASONS.iter().copied().collect())
}

fn display_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| RESTRICTION_DISPLAY.iter().copied().collect())
}

fn product_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| PRODUCT_WORDS.iter().copied().collect())
}

/// Lowercase and strip a trailing s/es for matching verdict entries
/// against user-facing spellings.
pub fn normalize_for_match(s: &str) -> String {
    let s = s.trim().to_lowercase();
    if s.len() > 3 && s.ends_with("es") {
        return s[..s.len() - 2].to_string();
    }
    if s.len() > 2 && s.ends_with('s') {
        return s[..s.len() - 1].to_string();
    }
    s
}

fn is_plural(ingredient: &str) -> bool {
    let w = ingredient.trim().to_lowercase();
    if ALWAYS_PLURAL.contains(&w.as_str()) {
        return true;
    }
    if SINGULAR_S_WORDS.contains(&w.as_str()) {
        return false;
    }
    w.len() > 2 && w.ends_with('s') && !w.ends_with("ss")
}

fn capitalize(ingredient: &str) -> String {
    let s = ingredient.trim();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn is_product_word(ingredient: &str) -> bool {
    product_words().contains(ingredient.trim().to_lowercase().as_str())
}

/// Compound display lookup, tolerating plural spellings of the atom.
fn dn_lookup<'a>(dn: &'a IndexMap<String, String>, ing: &str) -> Option<&'a String> {
    dn.get(&ing.trim().to_lowercase())
        .or_else(|| dn.get(&normalize_for_match(ing)))
}

fn diet_label(profile: &UserProfile) -> String {
    let dp = profile.dietary_preference.trim();
    if dp.is_empty() || dp == NO_RULES {
        "your dietary preferences".to_string()
    } else {
        dp.to_string()
    }
}

/// Short reason for an offending ingredient, tolerating plural spellings.
pub fn ingredient_reason(ingredient: &str) -> &'static str {
    let key = ingredient.trim().to_lowercase();
    if let Some(reason) = reason_table().get(key.as_str()) {
        return reason;
    }
    let norm = normalize_for_match(&key);
    if let Some(reason) = reason_table().get(norm.as_str()) {
        return reason;
    }
    "may conflict with your dietary requirements"
}

fn restriction_label(restriction_id: &str) -> String {
    display_table()
        .get(restriction_id)
        .map(|s| s.to_string())
        .unwrap_or_else(|| restriction_id.replace('_', " "))
}

pub fn compose_greeting() -> String {
    "Hello! I'm your grocery safety assistant. \
     Tell me your dietary preferences and ask about any ingredient — \
     I'll let you know if it's suitable for you."
        .to_string()
}

/// Acknowledge a profile update, optionally inviting an ingredient check.
pub fn compose_profile_update(updated: &ProfileUpdates, has_ingredients: bool) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(diet) = &updated.dietary_preference {
        parts.push(format!("Got it — I've updated your profile to **{diet}**."));
    }
    if !updated.allergens.is_empty() {
        let plural = if updated.allergens.len() != 1 { "s" } else { "" };
        parts.push(format!(
            "Noted your allergen{plural}: **{}**.",
            updated.allergens.join(", ")
        ));
    }
    if !updated.remove_allergens.is_empty() {
        let plural = if updated.remove_allergens.len() != 1 { "s" } else { "" };
        parts.push(format!(
            "Removed allergen{plural}: **{}**.",
            updated.remove_allergens.join(", ")
        ));
    }
    if !updated.lifestyle.is_empty() {
        let plural = if updated.lifestyle.len() != 1 { "s" } else { "" };
        parts.push(format!(
            "Lifestyle preference{plural} saved: **{}**.",
            updated.lifestyle.join(", ")
        ));
    }
    if !has_ingredients {
        parts.push("What would you like me to check for you?".to_string());
    }
    parts.join(" ")
}

/// Convert a compliance verdict into a human-friendly response.
///
/// `display_names` maps evaluated atoms back to compound product names
/// ("chicken" -> "burger with chicken") so the response refers to what
/// the user actually typed.
pub fn compose_verdict(
    verdict: &ComplianceVerdict,
    profile: &UserProfile,
    ingredients: &[String],
    updated_fields: Option<&ProfileUpdates>,
    display_names: Option<&IndexMap<String, String>>,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let diet = diet_label(profile);
    let empty = IndexMap::new();
    let dn = display_names.unwrap_or(&empty);

    let show = |ing: &str| -> String {
        match dn_lookup(dn, ing) {
            Some(compound) => capitalize(compound),
            None => capitalize(ing),
        }
    };

    if let Some(updated) = updated_fields {
        if !updated.is_empty() {
            parts.push(compose_profile_update(updated, true));
            parts.push(String::new());
        }
    }

    let triggered = &verdict.triggered_ingredients;
    let uncertain = &verdict.uncertain_ingredients;
    let triggered_norm: HashSet<String> = triggered.iter().map(|i| normalize_for_match(i)).collect();
    let uncertain_norm: HashSet<String> = uncertain.iter().map(|i| normalize_for_match(i)).collect();

    let safe_ingredients: Vec<&String> = ingredients
        .iter()
        .filter(|i| {
            let norm = normalize_for_match(i);
            !triggered_norm.contains(&norm) && !uncertain_norm.contains(&norm)
        })
        .collect();
    let mut meaningful_safe: Vec<&String> = safe_ingredients
        .iter()
        .copied()
        .filter(|i| !is_product_word(i))
        .collect();

    // Suppress safe items whose compound display is already used by a
    // triggered ingredient ("butter chicken" must not appear as both
    // fine and not-suitable).
    if !dn.is_empty() {
        let triggered_display: HashSet<&String> =
            triggered.iter().filter_map(|i| dn_lookup(dn, i)).collect();
        meaningful_safe.retain(|s| match dn_lookup(dn, s) {
            Some(compound) => !triggered_display.contains(compound),
            None => true,
        });
    }

    match verdict.status {
        VerdictStatus::NotSafe => {
            if triggered.len() == 1 && meaningful_safe.is_empty() && uncertain.is_empty() {
                let ing = &triggered[0];
                let verb = if is_plural(ing) { "are" } else { "is" };
                parts.push(format!(
                    "Based on your **{diet}** diet, **{}** {verb} **not suitable** — {}.",
                    show(ing),
                    ingredient_reason(ing)
                ));
            } else if !triggered.is_empty() {
                let verb = if triggered.len() > 1 { "are" } else { "is" };
                parts.push(format!(
                    "Based on your **{diet}** diet, the following {verb} **not suitable**:\n"
                ));
                for ing in triggered {
                    parts.push(format!("- **{}** — {}", show(ing), ingredient_reason(ing)));
                }
            } else {
                let names: Vec<String> = verdict
                    .triggered_restrictions
                    .iter()
                    .take(3)
                    .map(|r| restriction_label(r))
                    .collect();
                parts.push(format!(
                    "This doesn't appear to be compatible with your **{diet}** diet \
                     (conflicts with: {}).",
                    names.join(", ")
                ));
            }

            if !meaningful_safe.is_empty() {
                if meaningful_safe.len() == 1 {
                    let s = meaningful_safe[0];
                    let verb = if is_plural(s) { "are" } else { "is" };
                    parts.push(format!("\n**{}** {verb} fine for your diet.", show(s)));
                } else {
                    let list = meaningful_safe
                        .iter()
                        .map(|s| format!("**{}**", show(s)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    parts.push(format!("\nThe rest — {list} — are fine for your diet."));
                }
            }

            if !uncertain.is_empty() {
                let items = uncertain
                    .iter()
                    .map(|u| format!("**{}**", show(u)))
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!("\nCouldn't verify {items} — may need manual checking."));
            }

            if !verdict.informational_ingredients.is_empty() && verdict.confidence_score < 1.0 {
                parts.push(format!(
                    "\n_Note: {} — present in trace amounts, flagged at low confidence._",
                    verdict.informational_ingredients.join(", ")
                ));
            }
        }

        VerdictStatus::Safe => {
            let mut meaningful: Vec<&String> =
                ingredients.iter().filter(|i| !is_product_word(i)).collect();
            if meaningful.is_empty() {
                meaningful = ingredients.iter().collect();
            }
            if meaningful.len() == 1 {
                let ing = meaningful[0];
                let verb = if is_plural(ing) { "are" } else { "is" };
                parts.push(format!(
                    "**{}** {verb} perfectly fine for your **{diet}** diet.",
                    show(ing)
                ));
            } else {
                let list = meaningful
                    .iter()
                    .map(|i| format!("**{}**", show(i)))
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!(
                    "All good — {list} are compatible with your **{diet}** diet."
                ));
            }
            if !verdict.informational_ingredients.is_empty() && verdict.confidence_score < 1.0 {
                parts.push(format!(
                    "\n_Note: {} — present in trace amounts._",
                    verdict.informational_ingredients.join(", ")
                ));
            }
        }

        VerdictStatus::Uncertain => {
            if !uncertain.is_empty() {
                let items = uncertain
                    .iter()
                    .map(|u| format!("**{}**", show(u)))
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!(
                    "Couldn't find reliable information about {items} — \
                     may require manual verification before consumption."
                ));
                if !meaningful_safe.is_empty() {
                    let list = meaningful_safe
                        .iter()
                        .map(|s| format!("**{}**", show(s)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    parts.push(format!("\nThe rest — {list} — are fine for your diet."));
                }
            } else {
                let list = ingredients
                    .iter()
                    .map(|i| format!("**{}**", show(i)))
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!(
                    "Wasn't able to determine the safety of {list} with certainty. \
                     Please double-check the packaging or consult a specialist."
                ));
            }
        }
    }

    parts.join("\n")
}

pub fn compose_general_question() -> String {
    "I'm best at checking whether specific ingredients are safe for your dietary profile. \
     Try asking something like: **\"Can I eat eggs?\"** or paste an ingredient list and \
     I'll analyze it."
        .to_string()
}

pub fn compose_no_ingredients() -> String {
    "It looks like you didn't mention any specific ingredients. \
     Try something like **\"Can I eat eggs?\"** or paste an ingredient list from a \
     product label."
        .to_string()
}
