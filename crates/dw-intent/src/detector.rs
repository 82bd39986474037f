//! Rule-based intent detector for conversational grocery safety queries.
//!
//! Fully deterministic pattern matching, applied in a fixed order:
//! greetings, trailing diet questions, third-person diet+ingredient
//! queries, profile sentences, allergen and lifestyle updates, ingredient
//! extraction, and finally general-question patterns.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Diet keywords -> canonical display names, longest-first for matching.
const DIET_KEYWORDS: &[(&str, &str)] = &[
    ("hindu non vegetarian", "Hindu Non Vegetarian"),
    ("hindu non veg", "Hindu Non Vegetarian"),
    ("hindu nonveg", "Hindu Non Vegetarian"),
    ("hindu vegetarian", "Hindu Veg"),
    ("lacto vegetarian", "Lacto Vegetarian"),
    ("lacto-vegetarian", "Lacto Vegetarian"),
    ("ovo vegetarian", "Ovo Vegetarian"),
    ("ovo-vegetarian", "Ovo Vegetarian"),
    ("hindu veg", "Hindu Veg"),
    ("pescatarian", "Pescatarian"),
    ("gluten free", "Gluten-Free"),
    ("gluten-free", "Gluten-Free"),
    ("dairy free", "Dairy-Free"),
    ("dairy-free", "Dairy-Free"),
    ("vegetarian", "Vegetarian"),
    ("egg free", "Egg-Free"),
    ("egg-free", "Egg-Free"),
    ("vegan", "Vegan"),
    ("halal", "Halal"),
    ("kosher", "Kosher"),
    ("jain", "Jain"),
    ("hindu", "Hindu Veg"),
];

/// Lifestyle keyword -> canonical lifestyle flag.
const LIFESTYLE_MAP: &[(&str, &str)] = &[
    ("alcohol", "no alcohol"),
    ("onion", "no onion"),
    ("onions", "no onion"),
    ("garlic", "no garlic"),
    ("garlics", "no garlic"),
    ("palm oil", "no palm oil"),
    ("seed oil", "no seed oils"),
    ("seed oils", "no seed oils"),
    ("gmo", "no gmos"),
    ("gmos", "no gmos"),
    ("artificial color", "no artificial colors"),
    ("artificial colors", "no artificial colors"),
];

/// Product/container words: "X with Y" stays intact when X is a product.
const PRODUCT_CONTAINER_WORDS: &[&str] = &[
    "burger", "burgers", "bar", "bars", "protein bar", "protin bar", "energy bar",
    "cake", "cakes", "sandwich", "sandwiches", "wrap", "wraps",
    "pizza", "pizzas", "pie", "pies",
    "cookie", "cookies", "biscuit", "biscuits", "cracker", "crackers",
    "chip", "chips", "crisp", "crisps",
    "noodle", "noodles", "pasta", "ramen",
    "soup", "soups", "salad", "salads", "stew", "curry",
    "juice", "drink", "smoothie", "shake", "milkshake",
    "cereal", "granola", "muesli",
    "muffin", "muffins", "bagel", "pancake", "waffle", "toast", "roll", "bun",
    "doughnut", "donut", "pastry", "croissant",
    "ice cream", "gelato", "sorbet", "pudding", "custard",
    "candy", "chocolate bar", "snack", "snacks",
    "sausage", "hotdog", "hot dog", "kebab", "taco", "tacos",
    "bread", "roti", "naan", "paratha", "chapati",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "some", "any", "this", "that", "it", "for", "me", "my", "in", "on", "to",
];

/// Detected intent of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    ProfileUpdate,
    IngredientQuery,
    Mixed,
    Greeting,
    GeneralQuestion,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::ProfileUpdate => write!(f, "PROFILE_UPDATE"),
            Intent::IngredientQuery => write!(f, "INGREDIENT_QUERY"),
            Intent::Mixed => write!(f, "MIXED"),
            Intent::Greeting => write!(f, "GREETING"),
            Intent::GeneralQuestion => write!(f, "GENERAL_QUESTION"),
        }
    }
}

/// Profile changes extracted from a query. All fields are optional;
/// profile updates are merge-only downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preference: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub allergens: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub remove_allergens: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub lifestyle: Vec<String>,
}

impl ProfileUpdates {
    pub fn is_empty(&self) -> bool {
        self.dietary_preference.is_none()
            && self.allergens.is_empty()
            && self.remove_allergens.is_empty()
            && self.lifestyle.is_empty()
    }
}

/// Result of intent detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub intent: Intent,
    #[serde(default)]
    pub profile_updates: ProfileUpdates,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub original_query: String,
}

impl ParsedIntent {
    fn new(intent: Intent, query: &str) -> Self {
        Self {
            intent,
            profile_updates: ProfileUpdates::default(),
            ingredients: Vec::new(),
            original_query: query.to_string(),
        }
    }

    pub fn has_profile_update(&self) -> bool {
        !self.profile_updates.is_empty()
    }

    pub fn has_ingredients(&self) -> bool {
        !self.ingredients.is_empty()
    }
}

/// Resolve a diet word to its canonical display name, tolerating plural
/// and possessive forms ("vegans" -> "Vegan", "jain's" -> "Jain").
pub fn canonical_diet(word: &str) -> Option<&'static str> {
    fn table() -> &'static HashMap<&'static str, &'static str> {
        static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
        TABLE.get_or_init(|| DIET_KEYWORDS.iter().copied().collect())
    }
    let key = word.to_lowercase();
    let key = key.trim();
    if let Some(c) = table().get(key) {
        return Some(c);
    }
    if let Some(stripped) = key.strip_suffix("'s") {
        if let Some(c) = table().get(stripped) {
            return Some(c);
        }
    }
    if let Some(stripped) = key.strip_suffix('s') {
        if let Some(c) = table().get(stripped) {
            return Some(c);
        }
    }
    None
}

enum ThirdPersonOrder {
    DietFirst,
    IngredientFirst,
}

/// Rule-based intent detector holding its compiled pattern sets.
pub struct IntentDetector {
    greeting_re: Regex,
    conversational_re: Regex,
    trailing_diet_re: Regex,
    third_person: Vec<(Regex, ThirdPersonOrder)>,
    profile_patterns: Vec<Regex>,
    allergen_patterns: Vec<Regex>,
    allergen_remove_patterns: Vec<Regex>,
    lifestyle_patterns: Vec<Regex>,
    ingredient_patterns: Vec<Regex>,
    general_patterns: Vec<Regex>,
    with_re: Regex,
    punct_re: Regex,
    conjunction_re: Regex,
    or_re: Regex,
    diet_names: HashSet<String>,
    lifestyle_map: HashMap<&'static str, &'static str>,
    product_words: HashSet<&'static str>,
    stopwords: HashSet<&'static str>,
}

impl IntentDetector {
    /// Shared detector instance with patterns compiled once.
    pub fn shared() -> &'static IntentDetector {
        static DETECTOR: OnceLock<IntentDetector> = OnceLock::new();
        DETECTOR.get_or_init(IntentDetector::new)
    }

    pub fn new() -> Self {
        // Longest-first alternation so "hindu non vegetarian" beats "hindu".
        let diet_alt = {
            let mut keys: Vec<&str> = DIET_KEYWORDS.iter().map(|(k, _)| *k).collect();
            keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
            keys.iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|")
        };
        // Plural-tolerant diet alternation: "vegans" and "jain's".
        let diet_plural = format!("(?:{diet_alt})(?:'s|s)?");

        let greeting_re = Regex::new(
            r"(?i)^\s*(?:hi|hello|hey|howdy|good\s+(?:morning|afternoon|evening)|greetings|what'?s?\s+up|yo)(?:\s*[,!.]?\s*(?:how\s+(?:are\s+you|is\s+it\s+going|do\s+you\s+do|are\s+things)|how'?s?\s+(?:it\s+going|everything|life)|nice\s+to\s+meet\s+you|there|everyone|all))?\s*[?.!]?\s*$",
        )
        .expect("static regex");

        let conversational_re = Regex::new(
            r"(?i)^\s*(?:how\s+are\s+you|how'?s?\s+it\s+going|how\s+do\s+you\s+do|thank\s*(?:s|\s+you)?|thanks?\s+a\s+lot|much\s+appreciated|ok(?:ay)?|cool|nice|great|awesome|got\s+it|understood|bye|goodbye|see\s+you|take\s+care|good\s+night|yes|no|nope|yep|yeah|sure|nah|what\s+can\s+you\s+do|who\s+are\s+you|what\s+are\s+you)\s*[?.!]?\s*$",
        )
        .expect("static regex");

        // "…. Is this Halal?" -> base text + trailing diet
        let trailing_diet_re = Regex::new(&format!(
            r"(?i)(?:^|[.!?;])\s*(?:is|are)\s+(?:this|that|it|these|those)\s+({diet_plural})(?:\s+(?:safe|friendly|compliant|approved|ok|okay))?\s*[?.!]*\s*$"
        ))
        .expect("static regex");

        let third_person = vec![
            // "can jain eat onion?" / "can vegans eat honey?"
            (
                Regex::new(&format!(
                    r"(?i)\bcan\s+(?:a\s+)?({diet_plural})(?:\s+(?:people|person|persons))?\s+(?:eat|have|consume|use)\s+(.+?)[?.!]?\s*$"
                ))
                .expect("static regex"),
                ThirdPersonOrder::DietFirst,
            ),
            // "does jain allow onion?" / "does vegan forbid honey?"
            (
                Regex::new(&format!(
                    r"(?i)\b(?:does|do)\s+(?:a\s+|the\s+)?({diet_plural})(?:\s+(?:diet|people|person))?\s+(?:allow|permit|include|restrict|forbid|ban)\s+(.+?)[?.!]?\s*$"
                ))
                .expect("static regex"),
                ThirdPersonOrder::DietFirst,
            ),
            // "are vegans allowed honey?" / "is a jain permitted to eat potato?"
            (
                Regex::new(&format!(
                    r"(?i)\b(?:is|are)\s+(?:a\s+)?({diet_plural})(?:\s+(?:people|person|persons))?\s+(?:allowed|permitted)\s+(?:to\s+(?:eat|have|drink|consume)\s+)?(.+?)[?.!]?\s*$"
                ))
                .expect("static regex"),
                ThirdPersonOrder::DietFirst,
            ),
            // "is pork halal?" / "are eggs vegan?"
            (
                Regex::new(&format!(
                    r"(?i)\b(?:is|are)\s+(.+?)\s+({diet_plural})(?:\s+(?:safe|friendly|compatible|compliant|approved))?[?.!]?\s*$"
                ))
                .expect("static regex"),
                ThirdPersonOrder::IngredientFirst,
            ),
        ];

        let profile_patterns = vec![
            Regex::new(&format!(r"(?i)\b(?:i\s+am|i'm|im)\s+(?:a\s+)?({diet_alt})\b")).expect("static regex"),
            Regex::new(&format!(
                r"(?i)\b(?:i\s+follow|i\s+eat|my\s+diet\s+is)\s+(?:a\s+|the\s+)?({diet_alt})\s*(?:diet|lifestyle)?\b"
            ))
            .expect("static regex"),
            Regex::new(&format!(r"(?i)\bi(?:'m|\s+am)\s+on\s+(?:a\s+)?({diet_alt})\s*(?:diet)?\b"))
                .expect("static regex"),
            Regex::new(&format!(r"(?i)\b(?:my\s+religion\s+is|i\s+practice)\s+({diet_alt})\b"))
                .expect("static regex"),
            Regex::new(&format!(r"(?i)\bswitch(?:ing)?\s+(?:to|my\s+diet\s+to)\s+({diet_alt})\b"))
                .expect("static regex"),
        ];

        let allergen_patterns = vec![
            Regex::new(r"(?i)\b(?:i'm|i\s+am)\s+allergic\s+to\s+(.+?)(?:\.|,\s*(?:can|is|and)|$)")
                .expect("static regex"),
            Regex::new(r"(?i)\b(?:i\s+have)\s+(?:a\s+)?(.+?)\s+allergy\b").expect("static regex"),
            Regex::new(r"(?i)\bmy\s+allerg(?:ies|y|ens?)\s+(?:are|is)\s+(.+?)(?:\.|$)")
                .expect("static regex"),
            Regex::new(r"(?i)\b(?:add|set)\s+(?:my\s+)?allerg(?:ens?|ies?)\s+(?:to\s+)?(.+?)(?:\.|$)")
                .expect("static regex"),
        ];

        let allergen_remove_patterns = vec![
            Regex::new(
                r"(?i)\b(?:remove|delete|drop|clear)\s+(.+?)\s+(?:from\s+)?(?:my\s+)?allerg(?:ens?|ies?)[?.!]?\s*$",
            )
            .expect("static regex"),
            Regex::new(
                r"(?i)\b(?:i'm\s+not|i\s+am\s+not|i(?:'m|\s+am)\s+no\s+longer)\s+allergic\s+to\s+(.+?)[?.!]?\s*$",
            )
            .expect("static regex"),
        ];

        let lifestyle_patterns = vec![
            Regex::new(
                r"(?i)\b(?:i\s+don't|i\s+do\s+not|i\s+can't|no)\s+(?:eat|drink|consume|have)\s+(alcohol|onions?|garlics?)\b",
            )
            .expect("static regex"),
            Regex::new(
                r"(?i)\b(?:i\s+avoid|no)\s+(alcohol|onions?|garlics?|palm\s+oil|seed\s+oils?|gmos?|artificial\s+colors?)\b",
            )
            .expect("static regex"),
            Regex::new(r"(?i)\b(?:set|add|update)\s+(?:my\s+)?lifestyle\s+(?:to\s+)?(.+?)[?.!]?\s*$")
                .expect("static regex"),
        ];

        let ingredient_patterns = vec![
            // "can I eat eggs?" / "can I have cheese and milk?"
            Regex::new(r"(?i)\bcan\s+i\s+(?:eat|have|consume|take|use)\s+(.+?)[?.!]?\s*$")
                .expect("static regex"),
            // "is cheese okay?" / "are eggs safe?"
            Regex::new(
                r"(?i)\b(?:is|are)\s+(.+?)\s+(?:safe|ok|okay|allowed|permitted|suitable|fine|good|acceptable|compatible)(?:\s+(?:for\s+me|for\s+my\s+diet|to\s+eat))?[?.!]?\s*$",
            )
            .expect("static regex"),
            // "eggs safe?" / "cheese ok?"
            Regex::new(r"(?i)^(.+?)\s+(?:safe|ok|okay|allowed|permitted|suitable|fine|good)[?.!]?\s*$")
                .expect("static regex"),
            // "what about eggs?"
            Regex::new(r"(?i)\b(?:what|how)\s+about\s+(.+?)[?.!]?\s*$").expect("static regex"),
            // "check eggs" / "analyze cheese"
            Regex::new(r"(?i)^\s*(?:check|analyze|evaluate|test|verify)\s+(.+?)[?.!]?\s*$")
                .expect("static regex"),
            // "Ingredients: X, Y, Z"
            Regex::new(r"(?i)\bingredients?\s*[:;]\s*(.+)").expect("static regex"),
        ];

        let general_patterns = vec![
            Regex::new(r"(?i)\bwhat\s+is\s+").expect("static regex"),
            Regex::new(r"(?i)\btell\s+me\s+about\s+").expect("static regex"),
            Regex::new(r"(?i)\bwhere\s+does\s+.+?\s+come\s+from\b").expect("static regex"),
            Regex::new(r"(?i)\bhow\s+(?:is|are)\s+.+?\s+made\b").expect("static regex"),
            Regex::new(r"(?i)\bexplain\b").expect("static regex"),
            Regex::new(
                r"(?i)\b(?:suggest|recommend|brainstorm|alternative|substitute|replace|instead|option|recipe)\b",
            )
            .expect("static regex"),
        ];

        Self {
            greeting_re,
            conversational_re,
            trailing_diet_re,
            third_person,
            profile_patterns,
            allergen_patterns,
            allergen_remove_patterns,
            lifestyle_patterns,
            ingredient_patterns,
            general_patterns,
            with_re: Regex::new(r"(?i)^(.+?)\s+with\s+(.+)$").expect("static regex"),
            punct_re: Regex::new(r"[?!]+").expect("static regex"),
            conjunction_re: Regex::new(r"(?i)\s+(?:and|&)\s+").expect("static regex"),
            or_re: Regex::new(r"(?i)\s+or\s+").expect("static regex"),
            diet_names: DIET_KEYWORDS.iter().map(|(k, _)| k.to_string()).collect(),
            lifestyle_map: LIFESTYLE_MAP.iter().copied().collect(),
            product_words: PRODUCT_CONTAINER_WORDS.iter().copied().collect(),
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Parse a natural-language query into structured intent.
    ///
    /// Examples:
    /// - "I am Jain can I eat eggs?" -> MIXED, diet Jain, ingredients [eggs]
    /// - "Is cheese okay?" -> INGREDIENT_QUERY, ingredients [cheese]
    /// - "I follow a vegan diet" -> PROFILE_UPDATE, diet Vegan
    /// - "eggs, milk, flour" -> INGREDIENT_QUERY
    pub fn detect(&self, query: &str) -> ParsedIntent {
        let query = query.trim();
        if query.is_empty() {
            return ParsedIntent::new(Intent::GeneralQuestion, query);
        }

        // Slash-command syntax is handled by the caller; just classify.
        if query.trim_start().to_lowercase().starts_with("/update") {
            return ParsedIntent::new(Intent::ProfileUpdate, query);
        }

        if self.greeting_re.is_match(query) || self.conversational_re.is_match(query) {
            return ParsedIntent::new(Intent::Greeting, query);
        }

        // Trailing diet question: "…. Is this Halal?" -> base + diet.
        let mut trailing_diet: Option<String> = None;
        let mut base = query.to_string();
        if let Some(caps) = self.trailing_diet_re.captures(query) {
            if let Some(diet) = canonical_diet(&caps[1]) {
                let whole = caps.get(0).expect("whole match");
                // Keep any sentence terminator that started the match.
                let mut cut = whole.start();
                if let Some(first) = query[whole.start()..].chars().next() {
                    if matches!(first, '.' | '!' | '?' | ';') {
                        cut += first.len_utf8();
                    }
                }
                trailing_diet = Some(diet.to_string());
                base = query[..cut].trim().to_string();
            }
        }

        // Third-person diet+ingredient queries.
        for (pattern, order) in &self.third_person {
            let Some(caps) = pattern.captures(&base) else {
                continue;
            };
            let (diet_raw, ingredient_raw) = match order {
                ThirdPersonOrder::DietFirst => (&caps[1], &caps[2]),
                ThirdPersonOrder::IngredientFirst => (&caps[2], &caps[1]),
            };
            if let Some(diet) = canonical_diet(diet_raw) {
                let ingredients = self.split_ingredients(ingredient_raw.trim());
                if !ingredients.is_empty() {
                    let mut parsed = ParsedIntent::new(Intent::Mixed, query);
                    parsed.profile_updates.dietary_preference = Some(diet.to_string());
                    parsed.ingredients = ingredients;
                    return parsed;
                }
            }
        }

        // Profile signals.
        let mut updates = ProfileUpdates::default();
        let (diet, remaining) = self.extract_diet(&base);
        updates.dietary_preference = diet;
        let (allergens, remaining) = self.extract_captures(&self.allergen_patterns, &remaining);
        updates.allergens = allergens;
        let (removals, remaining) =
            self.extract_captures(&self.allergen_remove_patterns, &remaining);
        updates.remove_allergens = removals;
        let (lifestyle, remaining) = self.extract_lifestyle(&remaining);
        updates.lifestyle = lifestyle;

        if updates.dietary_preference.is_none() {
            updates.dietary_preference = trailing_diet;
        }

        // General-question patterns are checked before ingredient
        // extraction so "how is gelatin made" is not parsed as a list.
        let is_general = self.general_patterns.iter().any(|p| p.is_match(&base));

        let mut ingredients: Vec<String> = Vec::new();
        if !is_general {
            ingredients = self.extract_ingredients(&remaining);
            // Only fall back to the full query when profile extraction
            // did not consume anything ("I am Jain" must not leak "jain").
            if ingredients.is_empty() && remaining != base && updates.is_empty() {
                ingredients = self.extract_ingredients(&base);
            }
        }
        ingredients.retain(|i| !self.diet_names.contains(&i.to_lowercase()));

        let has_profile = !updates.is_empty();
        let has_ingredients = !ingredients.is_empty();
        let intent = if has_profile && has_ingredients {
            Intent::Mixed
        } else if has_profile {
            Intent::ProfileUpdate
        } else if has_ingredients {
            Intent::IngredientQuery
        } else if is_general {
            Intent::GeneralQuestion
        } else {
            // Last resort: treat the whole query as potential ingredients.
            let mut fallback = self.extract_ingredients(&base);
            fallback.retain(|i| !self.diet_names.contains(&i.to_lowercase()));
            if !fallback.is_empty() {
                let mut parsed = ParsedIntent::new(Intent::IngredientQuery, query);
                parsed.ingredients = fallback;
                return parsed;
            }
            Intent::GeneralQuestion
        };

        ParsedIntent {
            intent,
            profile_updates: updates,
            ingredients,
            original_query: query.to_string(),
        }
    }

    fn extract_diet(&self, query: &str) -> (Option<String>, String) {
        for pattern in &self.profile_patterns {
            if let Some(caps) = pattern.captures(query) {
                if let Some(canonical) = canonical_diet(&caps[1]) {
                    let whole = caps.get(0).expect("whole match");
                    let remaining =
                        format!("{} {}", &query[..whole.start()], &query[whole.end()..]);
                    let remaining = remaining.trim().trim_start_matches([',', ';', '.']);
                    let remaining = remaining.split_whitespace().collect::<Vec<_>>().join(" ");
                    return (Some(canonical.to_string()), remaining);
                }
            }
        }
        (None, query.to_string())
    }

    /// Apply each pattern once, splitting captures on "," and "and".
    fn extract_captures(&self, patterns: &[Regex], query: &str) -> (Vec<String>, String) {
        let mut values: Vec<String> = Vec::new();
        let mut remaining = query.to_string();
        for pattern in patterns {
            if let Some(caps) = pattern.captures(&remaining.clone()) {
                let raw = caps[1].trim().to_string();
                for item in self.conjunction_re.split(&raw).flat_map(|p| p.split(',')) {
                    let item = item.trim().to_lowercase();
                    if !item.is_empty() && !values.contains(&item) {
                        values.push(item);
                    }
                }
                let whole = caps.get(0).expect("whole match");
                remaining = format!("{} {}", &remaining[..whole.start()], &remaining[whole.end()..]);
                remaining = remaining.split_whitespace().collect::<Vec<_>>().join(" ");
            }
        }
        (values, remaining)
    }

    fn extract_lifestyle(&self, query: &str) -> (Vec<String>, String) {
        let mut flags: Vec<String> = Vec::new();
        let mut remaining = query.to_string();
        for pattern in &self.lifestyle_patterns {
            if let Some(caps) = pattern.captures(&remaining.clone()) {
                let keyword = caps[1].trim().to_lowercase();
                let keyword = keyword.split_whitespace().collect::<Vec<_>>().join(" ");
                let flag = self
                    .lifestyle_map
                    .get(keyword.as_str())
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| format!("no {keyword}"));
                if !flags.contains(&flag) {
                    flags.push(flag);
                }
                let whole = caps.get(0).expect("whole match");
                remaining = format!("{} {}", &remaining[..whole.start()], &remaining[whole.end()..]);
                remaining = remaining.split_whitespace().collect::<Vec<_>>().join(" ");
            }
        }
        (flags, remaining)
    }

    fn extract_ingredients(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        for pattern in &self.ingredient_patterns {
            if let Some(caps) = pattern.captures(text) {
                return self.split_ingredients(caps[1].trim());
            }
        }
        // Plain ingredient list (no verbs, no conversational fluff).
        let cleaned = self.clean_for_ingredients(text);
        if cleaned.is_empty() {
            Vec::new()
        } else {
            self.split_ingredients(&cleaned)
        }
    }

    /// Split ingredient text into a deduplicated list, preserving
    /// "X with Y" compounds when X is a product/container word.
    fn split_ingredients(&self, text: &str) -> Vec<String> {
        let t = self.punct_re.replace_all(text, "");
        let t = self.conjunction_re.replace_all(&t, ", ");
        let t = self.or_re.replace_all(&t, ", ");
        let mut result: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let push = |chunk: &str, result: &mut Vec<String>, seen: &mut HashSet<String>| {
            let chunk = chunk.trim();
            if chunk.len() < 2 {
                return;
            }
            let words: Vec<String> = chunk
                .to_lowercase()
                .split_whitespace()
                .map(String::from)
                .collect();
            if words.iter().all(|w| self.stopwords.contains(w.as_str())) {
                return;
            }
            let key = chunk.to_lowercase();
            if seen.insert(key) {
                result.push(chunk.to_string());
            }
        };

        for chunk in t.split(',') {
            let chunk = chunk.trim().trim_end_matches('.');
            if chunk.is_empty() {
                continue;
            }
            if let Some(caps) = self.with_re.captures(chunk) {
                let left = caps[1].trim().to_string();
                let right = caps[2].trim().to_string();
                if self.product_words.contains(left.to_lowercase().as_str()) {
                    // Keep as compound: "burger with chicken"
                    push(chunk, &mut result, &mut seen);
                } else {
                    push(&left, &mut result, &mut seen);
                    push(&right, &mut result, &mut seen);
                }
            } else {
                push(chunk, &mut result, &mut seen);
            }
        }
        result
    }

    /// Strip conversational fluff; empty result means nothing
    /// ingredient-like remains.
    fn clean_for_ingredients(&self, text: &str) -> String {
        static LEAD_RE: OnceLock<Regex> = OnceLock::new();
        static ASK_RE: OnceLock<Regex> = OnceLock::new();
        static FOR_ME_RE: OnceLock<Regex> = OnceLock::new();
        static REJECT_RE: OnceLock<Regex> = OnceLock::new();
        static NOISE_RE: OnceLock<Regex> = OnceLock::new();

        let lead = LEAD_RE
            .get_or_init(|| Regex::new(r"(?i)^(?:hi|hello|hey|please|kindly)\s*,?\s*").expect("static regex"));
        let ask = ASK_RE.get_or_init(|| {
            Regex::new(
                r"(?i)\b(?:please|kindly|could\s+you|would\s+you|can\s+you)\s+(?:check|tell\s+me|let\s+me\s+know)\s*",
            )
            .expect("static regex")
        });
        let for_me =
            FOR_ME_RE.get_or_init(|| Regex::new(r"(?i)\bfor\s+(?:me|my\s+\w+)\b").expect("static regex"));
        let reject = REJECT_RE.get_or_init(|| {
            Regex::new(
                r"(?i)\b(?:think|know|explain|describe|tell|help|find|suggest|recommend|brainstorm|alternative|substitute|replace|instead|option|recipe)\b",
            )
            .expect("static regex")
        });
        let noise = NOISE_RE.get_or_init(|| {
            Regex::new(
                r"(?i)^(?:how\s+are\s+you|how'?s?\s+it\s+going|how\s+do\s+you\s+do|thank|thanks|bye|goodbye|ok|okay|cool|nice|great|awesome|yes|no|yep|yeah|sure|nah)\b",
            )
            .expect("static regex")
        });

        let t = lead.replace(text.trim(), "");
        let t = ask.replace_all(&t, "");
        let t = for_me.replace_all(&t, "");
        let t = t.trim_end_matches('?');
        let t = t.split_whitespace().collect::<Vec<_>>().join(" ");
        if t.is_empty() || reject.is_match(&t) || noise.is_match(&t) {
            return String::new();
        }
        t
    }
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::new()
    }
}
