//! LLM-powered response composition with contradiction validation.
//!
//! The model never decides safety: it only reformats the deterministic
//! verdict. Every generated response is validated against the verdict;
//! a triggered ingredient described with safe words (or a safe one with
//! unsafe words) rejects the rewrite and the caller falls back to the
//! template composer.

use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use dw_foundation::Settings;
use dw_intent::ProfileUpdates;

use crate::composer::{ingredient_reason, normalize_for_match};
use crate::profile::{UserProfile, NO_RULES};
use crate::verdict::ComplianceVerdict;

const RESPONSE_SYSTEM_PROMPT: &str = r#"You are a friendly grocery safety assistant. You compose natural responses from STRUCTURED VERDICT DATA.

ABSOLUTE RULES — VIOLATION MEANS FAILURE:
1. Each ingredient has an EXACT verdict: NOT_SAFE, SAFE, or UNCERTAIN. You MUST use the EXACT same classification. NEVER change any ingredient's verdict.
2. Every NOT_SAFE ingredient MUST be described as "not suitable" / "not safe" / "restricted" / "should be avoided".
3. Every SAFE ingredient MUST be described as "fine" / "safe" / "okay" / "compatible".
4. Every UNCERTAIN ingredient MUST be described as "couldn't verify" / "uncertain" / "needs checking".
5. NEVER say a NOT_SAFE ingredient is "fine" or "safe". NEVER say a SAFE ingredient is "not suitable" or "restricted".
6. Use the EXACT REASON provided for each ingredient. Do NOT invent your own reasons.
7. Keep it concise: 2-4 sentences. Be warm but direct.
8. Use **bold** for ingredient names. No emojis. No markdown headers.
9. Do NOT add medical disclaimers unless the verdict is UNCERTAIN.
10. Mention the user's diet name naturally.
11. NEVER offer to brainstorm alternatives, suggest recipes, or provide unsolicited follow-up offers. End the response naturally after delivering the answer."#;

const SAFE_WORDS: &[&str] = &[
    "fine", "safe", "okay", "compatible", "suitable for", "good for", "no issue", "perfectly",
];
const UNSAFE_WORDS: &[&str] = &[
    "not suitable", "not safe", "restricted", "avoid", "unsuitable", "not compatible",
    "not okay", "not fine", "cannot", "shouldn't", "should not",
];

/// Ollama-backed response composer.
pub struct LlmResponseComposer {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl LlmResponseComposer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(settings.llm_response_timeout_secs))
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
            "system": RESPONSE_SYSTEM_PROMPT,
            "stream": false,
            "options": {"temperature": 0.0, "num_predict": 400},
        });
        let resp = match self.client.post(&self.url).json(&body).send() {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "LLM response call failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "LLM response call returned error status");
            return None;
        }
        let value: serde_json::Value = resp.json().ok()?;
        value
            .get("response")
            .and_then(serde_json::Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Compose a natural response from verdict data. Returns None when
    /// the model is unavailable or validation fails; the caller falls
    /// back to the template composer.
    pub fn compose_verdict(
        &self,
        verdict: &ComplianceVerdict,
        profile: &UserProfile,
        ingredients: &[String],
        updated_fields: Option<&ProfileUpdates>,
    ) -> Option<String> {
        let prompt = build_verdict_prompt(verdict, profile, ingredients, updated_fields);
        let response = self.call_model(&prompt)?;

        let triggered_norm: std::collections::HashSet<String> = verdict
            .triggered_ingredients
            .iter()
            .map(|i| normalize_for_match(i))
            .collect();
        let uncertain_norm: std::collections::HashSet<String> = verdict
            .uncertain_ingredients
            .iter()
            .map(|i| normalize_for_match(i))
            .collect();
        let safe_ingredients: Vec<String> = ingredients
            .iter()
            .filter(|i| {
                let norm = normalize_for_match(i);
                !triggered_norm.contains(&norm) && !uncertain_norm.contains(&norm)
            })
            .cloned()
            .collect();

        if !validate_response(&response, &verdict.triggered_ingredients, &safe_ingredients) {
            warn!("LLM response validation failed, falling back to template");
            return None;
        }
        info!(status = %verdict.status, length = response.len(), "LLM response composed");
        Some(response)
    }

    /// Greeting rewrite; template fallback handled by the caller.
    pub fn compose_greeting(&self, profile: Option<&UserProfile>) -> Option<String> {
        let diet = profile
            .map(|p| p.dietary_preference.as_str())
            .filter(|d| !d.is_empty() && *d != NO_RULES);
        let prompt = match diet {
            Some(diet) => format!(
                "The user said hello. Their dietary profile is: {diet}. Greet them warmly and \
                 mention you can check ingredients for their {diet} diet. Keep it to 1-2 \
                 sentences. Do NOT offer recipes or alternatives."
            ),
            None => "The user said hello. They haven't set up a dietary profile yet. Greet them \
                     warmly and invite them to tell you their dietary preferences or ask about \
                     any ingredient. Keep it to 1-2 sentences. Do NOT offer recipes or \
                     alternatives."
                .to_string(),
        };
        self.call_model(&prompt)
    }

    /// General-question answer with a nudge toward ingredient checks.
    pub fn compose_general(&self, query: &str, profile: Option<&UserProfile>) -> Option<String> {
        let context = profile
            .map(|p| p.dietary_preference.as_str())
            .filter(|d| !d.is_empty() && *d != NO_RULES)
            .map(|d| format!(" Their diet is: {d}."))
            .unwrap_or_default();
        let prompt = format!(
            "The user asked: \"{query}\".{context} If this is a general food/nutrition \
             question, give a brief helpful answer. If they didn't ask about specific \
             ingredients, gently guide them to ask about specific ingredients so you can check \
             safety. Keep it to 2-3 sentences. Do NOT offer to brainstorm, suggest recipes, or \
             suggest alternative ingredients."
        );
        self.call_model(&prompt)
    }
}

/// Build the structured per-ingredient verdict table for the model.
fn build_verdict_prompt(
    verdict: &ComplianceVerdict,
    profile: &UserProfile,
    ingredients: &[String],
    updated_fields: Option<&ProfileUpdates>,
) -> String {
    let diet = if profile.dietary_preference.is_empty()
        || profile.dietary_preference == NO_RULES
    {
        "your preferences".to_string()
    } else {
        profile.dietary_preference.clone()
    };
    let triggered: std::collections::HashSet<String> = verdict
        .triggered_ingredients
        .iter()
        .map(|i| normalize_for_match(i))
        .collect();
    let uncertain: std::collections::HashSet<String> = verdict
        .uncertain_ingredients
        .iter()
        .map(|i| normalize_for_match(i))
        .collect();

    let mut lines = vec![
        "=== VERDICT DATA (you MUST follow this EXACTLY) ===".to_string(),
        format!("Diet: {diet}"),
        format!("Overall: {}", verdict.status),
        String::new(),
        "Per-ingredient verdicts:".to_string(),
    ];
    for ing in ingredients {
        let norm = normalize_for_match(ing);
        if triggered.contains(&norm) {
            lines.push(format!("  - {ing}: NOT_SAFE (reason: {})", ingredient_reason(ing)));
        } else if uncertain.contains(&norm) {
            lines.push(format!("  - {ing}: UNCERTAIN (could not verify)"));
        } else {
            lines.push(format!("  - {ing}: SAFE"));
        }
    }

    if let Some(updated) = updated_fields {
        if !updated.is_empty() {
            let mut changes: Vec<String> = Vec::new();
            if let Some(d) = &updated.dietary_preference {
                changes.push(format!("dietary_preference -> {d}"));
            }
            if !updated.allergens.is_empty() {
                changes.push(format!("allergens -> {}", updated.allergens.join(", ")));
            }
            if !updated.remove_allergens.is_empty() {
                changes.push(format!(
                    "remove_allergens -> {}",
                    updated.remove_allergens.join(", ")
                ));
            }
            if !updated.lifestyle.is_empty() {
                changes.push(format!("lifestyle -> {}", updated.lifestyle.join(", ")));
            }
            lines.push(format!("\nProfile just updated: {}", changes.join("; ")));
            lines.push("Acknowledge the profile update first.".to_string());
        }
    }

    lines.push(String::new());
    lines.push("Write a natural, friendly response. Follow ALL rules in your system prompt.".to_string());
    lines.join("\n")
}

/// Check that the response does not contradict the verdict: no triggered
/// ingredient in a safe-worded sentence, no safe ingredient in an
/// unsafe-worded sentence.
pub fn validate_response(
    response: &str,
    triggered_ingredients: &[String],
    safe_ingredients: &[String],
) -> bool {
    let resp_lower = response.to_lowercase();
    let sentences: Vec<&str> = resp_lower.split(['.', '!']).collect();

    for ing in triggered_ingredients {
        let ing_lower = ing.to_lowercase();
        if !resp_lower.contains(&ing_lower) {
            continue;
        }
        for sentence in &sentences {
            if sentence.contains(&ing_lower)
                && SAFE_WORDS.iter().any(|w| sentence.contains(w))
                && !UNSAFE_WORDS.iter().any(|w| sentence.contains(w))
            {
                warn!(ingredient = %ing, "triggered ingredient described as safe");
                return false;
            }
        }
    }

    for ing in safe_ingredients {
        let ing_lower = ing.to_lowercase();
        if !resp_lower.contains(&ing_lower) {
            continue;
        }
        for sentence in &sentences {
            if sentence.contains(&ing_lower)
                && UNSAFE_WORDS.iter().any(|w| sentence.contains(w))
                && !SAFE_WORDS.iter().any(|w| sentence.contains(w))
            {
                warn!(ingredient = %ing, "safe ingredient described as unsafe");
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::VerdictStatus;

    #[test]
    fn test_validate_accepts_consistent_response() {
        let ok = validate_response(
            "**Milk** is not suitable for your vegan diet. **Water** is fine.",
            &["milk".to_string()],
            &["water".to_string()],
        );
        assert!(ok);
    }

    #[test]
    fn test_validate_rejects_triggered_as_safe() {
        let ok = validate_response(
            "**Milk** is perfectly fine for you!",
            &["milk".to_string()],
            &[],
        );
        assert!(!ok);
    }

    #[test]
    fn test_validate_rejects_safe_as_unsafe() {
        let ok = validate_response(
            "You should avoid water.",
            &[],
            &["water".to_string()],
        );
        assert!(!ok);
    }

    #[test]
    fn test_validate_ignores_unmentioned_ingredients() {
        let ok = validate_response("Everything checks out.", &["milk".to_string()], &[]);
        assert!(ok);
    }

    #[test]
    fn test_prompt_contains_per_ingredient_verdicts() {
        let verdict = ComplianceVerdict {
            status: VerdictStatus::NotSafe,
            triggered_restrictions: vec!["vegan".to_string()],
            triggered_ingredients: vec!["milk".to_string()],
            uncertain_ingredients: vec!["xyz".to_string()],
            informational_ingredients: Vec::new(),
            confidence_score: 0.8,
            ontology_version: "1.0".to_string(),
        };
        let mut profile = UserProfile::new("u1");
        profile.dietary_preference = "Vegan".to_string();
        let prompt = build_verdict_prompt(
            &verdict,
            &profile,
            &[
                "water".to_string(),
                "milk".to_string(),
                "xyz".to_string(),
            ],
            None,
        );
        assert!(prompt.contains("milk: NOT_SAFE"));
        assert!(prompt.contains("water: SAFE"));
        assert!(prompt.contains("xyz: UNCERTAIN"));
        assert!(prompt.contains("Diet: Vegan"));
    }
}
