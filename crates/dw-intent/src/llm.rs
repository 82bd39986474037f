//! LLM-powered intent extraction.
//!
//! Fallback for when the rule-based detector returns GENERAL_QUESTION with
//! no ingredients and no profile update (i.e. the rules could not parse
//! the query). Uses a local Ollama model prompted to return a fixed JSON
//! schema. The compliance engine itself stays fully deterministic; the
//! model only parses input, and any contradiction with the rule-based
//! result falls back to the rules.

use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::{info, warn};

use dw_foundation::Settings;

use crate::detector::{canonical_diet, Intent, ParsedIntent, ProfileUpdates};

const SYSTEM_PROMPT: &str = r#"You are a JSON parser for a grocery safety assistant. Your ONLY job is to extract structured data from user messages.

Given a user message, return a JSON object with these fields:
- "intent": one of "PROFILE_UPDATE", "INGREDIENT_QUERY", "MIXED", "GREETING", "GENERAL_QUESTION"
- "dietary_preference": string or null (e.g. "Jain", "Vegan", "Halal", "Kosher", "Hindu Veg", "Vegetarian", "Pescatarian", null)
- "ingredients": list of ingredient strings, or empty list
- "allergens": list of allergen strings the user mentions having, or empty list
- "lifestyle": list like ["no alcohol", "no onion"] or empty list
- "remove_allergens": list of allergens user wants removed, or empty list
- "is_greeting": true if the message is a greeting or conversational (hi, thanks, bye, how are you)
- "is_general_question": true if asking about food science/nutrition in general (not about specific ingredient safety)

RULES:
- Extract ACTUAL ingredient names only. "protein bar" is a product, "eggs" is an ingredient.
- Do NOT invent ingredients. Only extract what the user explicitly mentions.
- "can jain eat onion?" -> dietary_preference="Jain", ingredients=["onion"], intent="MIXED"
- "is pork halal?" -> dietary_preference="Halal", ingredients=["pork"], intent="MIXED"
- "hi how are you" -> is_greeting=true, intent="GREETING"
- "eggs, milk, flour" -> ingredients=["eggs","milk","flour"], intent="INGREDIENT_QUERY"
- Return ONLY valid JSON. No markdown, no explanation."#;

/// Structured intent as returned by the model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmIntent {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub remove_allergens: Vec<String>,
    #[serde(default)]
    pub is_greeting: bool,
    #[serde(default)]
    pub is_general_question: bool,
}

/// Ollama-backed intent extractor.
pub struct LlmIntentExtractor {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl LlmIntentExtractor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(settings.llm_intent_timeout_secs))
                .build()
                .expect("failed to build HTTP client"),
            url: settings.ollama_url.clone(),
            model: settings.ollama_model.clone(),
        }
    }

    fn call_model(&self, prompt: &str) -> Option<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "system": SYSTEM_PROMPT,
            "stream": false,
            "options": {"temperature": 0.0, "num_predict": 300},
        });
        let resp = match self.client.post(&self.url).json(&body).send() {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "LLM intent call failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "LLM intent call returned error status");
            return None;
        }
        let value: serde_json::Value = resp.json().ok()?;
        value
            .get("response")
            .and_then(serde_json::Value::as_str)
            .map(|s| s.trim().to_string())
    }

    /// Extract structured intent from a query. Returns None if the model
    /// is unavailable or the response is unparseable; the caller keeps the
    /// rule-based result.
    pub fn extract(&self, query: &str) -> Option<LlmIntent> {
        if query.trim().is_empty() {
            return None;
        }
        let prompt = format!("User message: \"{query}\"\n\nExtract the structured JSON:");
        let raw = self.call_model(&prompt)?;
        let mut parsed = parse_json_response(&raw)?;

        parsed.ingredients = parsed
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        // Flags override the model's intent label.
        if parsed.is_greeting {
            parsed.intent = "GREETING".to_string();
        } else if parsed.is_general_question && parsed.ingredients.is_empty() {
            parsed.intent = "GENERAL_QUESTION".to_string();
        }

        info!(
            query = %query.chars().take(60).collect::<String>(),
            intent = %parsed.intent,
            diet = parsed.dietary_preference.as_deref().unwrap_or(""),
            ingredient_count = parsed.ingredients.len(),
            "LLM intent extracted"
        );
        Some(parsed)
    }
}

/// Extract JSON from the model response (which may carry markdown fences).
fn parse_json_response(raw: &str) -> Option<LlmIntent> {
    if raw.is_empty() {
        return None;
    }
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    static OBJECT_RE: OnceLock<Regex> = OnceLock::new();
    let fence =
        FENCE_RE.get_or_init(|| Regex::new(r"```(?:json)?\s*").expect("static regex"));
    let object = OBJECT_RE.get_or_init(|| Regex::new(r"(?s)\{[^{}]*\}").expect("static regex"));

    let cleaned = fence.replace_all(raw, "");
    let cleaned = cleaned.trim().trim_end_matches('`');
    if let Ok(parsed) = serde_json::from_str::<LlmIntent>(cleaned) {
        return Some(parsed);
    }
    if let Some(m) = object.find(cleaned) {
        if let Ok(parsed) = serde_json::from_str::<LlmIntent>(m.as_str()) {
            return Some(parsed);
        }
    }
    warn!(
        raw = %raw.chars().take(200).collect::<String>(),
        "could not parse JSON from LLM intent response"
    );
    None
}

/// Reconcile a model-extracted intent with the rule-based result.
///
/// Returns a ParsedIntent built from the model output when it is
/// coherent; any contradiction (unknown intent label, greeting that
/// carries ingredients) returns None and the caller keeps the rule-based
/// answer.
pub fn reconcile(rule_based: &ParsedIntent, llm: LlmIntent) -> Option<ParsedIntent> {
    let intent = match llm.intent.as_str() {
        "PROFILE_UPDATE" => Intent::ProfileUpdate,
        "INGREDIENT_QUERY" => Intent::IngredientQuery,
        "MIXED" => Intent::Mixed,
        "GREETING" => Intent::Greeting,
        "GENERAL_QUESTION" => Intent::GeneralQuestion,
        _ => return None,
    };
    if intent == Intent::Greeting && !llm.ingredients.is_empty() {
        return None;
    }

    // Canonicalize the diet through the rule-based keyword table; an
    // unrecognized diet name is a contradiction.
    let dietary_preference = match llm.dietary_preference.as_deref() {
        Some(d) if !d.trim().is_empty() => match canonical_diet(d) {
            Some(c) => Some(c.to_string()),
            None => return None,
        },
        _ => None,
    };

    let mut ingredients = llm.ingredients;
    ingredients.retain(|i| canonical_diet(i).is_none());

    let updates = ProfileUpdates {
        dietary_preference,
        allergens: llm.allergens,
        remove_allergens: llm.remove_allergens,
        lifestyle: llm.lifestyle,
    };

    // The declared intent must be consistent with the extracted fields.
    let has_profile = !updates.is_empty();
    let has_ingredients = !ingredients.is_empty();
    let coherent = match intent {
        Intent::Mixed => has_profile && has_ingredients,
        Intent::ProfileUpdate => has_profile,
        Intent::IngredientQuery => has_ingredients,
        Intent::Greeting | Intent::GeneralQuestion => true,
    };
    if !coherent {
        return None;
    }

    Some(ParsedIntent {
        intent,
        profile_updates: updates,
        ingredients,
        original_query: rule_based.original_query.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let parsed = parse_json_response(
            r#"{"intent": "MIXED", "dietary_preference": "Jain", "ingredients": ["onion"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.intent, "MIXED");
        assert_eq!(parsed.ingredients, vec!["onion"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let parsed = parse_json_response(
            "```json\n{\"intent\": \"INGREDIENT_QUERY\", \"ingredients\": [\"milk\"]}\n```",
        )
        .unwrap();
        assert_eq!(parsed.intent, "INGREDIENT_QUERY");
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_json_response("I think this is about onions").is_none());
    }

    fn rule_general(query: &str) -> ParsedIntent {
        ParsedIntent {
            intent: Intent::GeneralQuestion,
            profile_updates: ProfileUpdates::default(),
            ingredients: Vec::new(),
            original_query: query.to_string(),
        }
    }

    #[test]
    fn test_reconcile_accepts_coherent_result() {
        let llm = LlmIntent {
            intent: "MIXED".to_string(),
            dietary_preference: Some("jain".to_string()),
            ingredients: vec!["onion".to_string()],
            ..Default::default()
        };
        let parsed = reconcile(&rule_general("query"), llm).unwrap();
        assert_eq!(parsed.intent, Intent::Mixed);
        assert_eq!(
            parsed.profile_updates.dietary_preference.as_deref(),
            Some("Jain")
        );
    }

    #[test]
    fn test_reconcile_rejects_unknown_intent() {
        let llm = LlmIntent {
            intent: "SOMETHING_ELSE".to_string(),
            ..Default::default()
        };
        assert!(reconcile(&rule_general("query"), llm).is_none());
    }

    #[test]
    fn test_reconcile_rejects_unknown_diet() {
        let llm = LlmIntent {
            intent: "PROFILE_UPDATE".to_string(),
            dietary_preference: Some("carnivore".to_string()),
            ..Default::default()
        };
        assert!(reconcile(&rule_general("query"), llm).is_none());
    }

    #[test]
    fn test_reconcile_rejects_incoherent_mixed() {
        let llm = LlmIntent {
            intent: "MIXED".to_string(),
            ingredients: vec!["onion".to_string()],
            ..Default::default()
        };
        assert!(reconcile(&rule_general("query"), llm).is_none());
    }

    #[test]
    fn test_reconcile_drops_diet_words_from_ingredients() {
        let llm = LlmIntent {
            intent: "INGREDIENT_QUERY".to_string(),
            ingredients: vec!["jain".to_string(), "onion".to_string()],
            ..Default::default()
        };
        let parsed = reconcile(&rule_general("query"), llm).unwrap();
        assert_eq!(parsed.ingredients, vec!["onion"]);
    }
}
