//! Conversational assistant: intent routing over the evaluation pipeline.
//!
//! One reply cycle, in order:
//! 1. Rule-based intent detection, with the LLM fallback only when the
//!    rules return GENERAL_QUESTION with nothing extracted.
//! 2. GREETING replies immediately (LLM greeting or template).
//! 3. Profile updates apply merge-only; a pure PROFILE_UPDATE is
//!    acknowledged and returns.
//! 4. GENERAL_QUESTION without ingredients goes to the general composer.
//! 5. Anything with ingredients runs compound expansion, label
//!    preprocessing, and the deterministic engine, then the verdict
//!    composer (validated LLM rewrite when configured, template
//!    otherwise).
//!
//! The engine decides safety; the model never does.

use tracing::info;

use dw_foundation::Settings;
use dw_intent::{llm, Intent, IntentDetector, LlmIntentExtractor};
use dw_parser::{expand_compounds, preprocess_ingredient_list};

use crate::composer;
use crate::engine::{ComplianceEngine, EvaluateOptions};
use crate::llm_response::LlmResponseComposer;
use crate::profile::{profile_context, UserProfile};
use crate::restriction_ids::build_restriction_ids;
use crate::verdict::ComplianceVerdict;

/// One assistant reply.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Intent the reply was routed on
    pub intent: Intent,
    /// Composed response text
    pub text: String,
    /// Verdict, when ingredients were evaluated
    pub verdict: Option<ComplianceVerdict>,
    /// True when this turn changed the profile
    pub profile_was_updated: bool,
}

impl ChatReply {
    fn plain(intent: Intent, text: String, profile_was_updated: bool) -> Self {
        Self {
            intent,
            text,
            verdict: None,
            profile_was_updated,
        }
    }
}

/// Intent-routed assistant over a compliance engine.
///
/// Without LLM components every branch uses the deterministic templates;
/// with them, greetings, general questions, and verdict phrasing go
/// through the model behind the contradiction validator.
pub struct ChatAssistant {
    engine: ComplianceEngine,
    llm_intent: Option<LlmIntentExtractor>,
    llm_response: Option<LlmResponseComposer>,
}

impl ChatAssistant {
    /// Template-only assistant.
    pub fn new(engine: ComplianceEngine) -> Self {
        Self {
            engine,
            llm_intent: None,
            llm_response: None,
        }
    }

    /// Enable the LLM intent fallback and response composer.
    pub fn with_llm(mut self, settings: &Settings) -> Self {
        self.llm_intent = Some(LlmIntentExtractor::new(settings));
        self.llm_response = Some(LlmResponseComposer::new(settings));
        self
    }

    pub fn engine(&self) -> &ComplianceEngine {
        &self.engine
    }

    /// Run one reply cycle, applying any profile updates the query
    /// carries.
    pub fn respond(&self, query: &str, profile: &mut UserProfile) -> ChatReply {
        let mut parsed = IntentDetector::shared().detect(query);
        info!(
            intent = %parsed.intent,
            ingredient_count = parsed.ingredients.len(),
            has_profile_update = parsed.has_profile_update(),
            "intent detected"
        );

        // The rules could not parse the query: try the LLM extractor and
        // keep its answer only when it reconciles.
        if parsed.intent == Intent::GeneralQuestion
            && !parsed.has_ingredients()
            && !parsed.has_profile_update()
        {
            if let Some(extractor) = &self.llm_intent {
                if let Some(extracted) = extractor.extract(query) {
                    if let Some(reconciled) = llm::reconcile(&parsed, extracted) {
                        info!(intent = %reconciled.intent, "LLM intent fallback accepted");
                        parsed = reconciled;
                    }
                }
            }
        }

        if parsed.intent == Intent::Greeting {
            let text = self
                .llm_response
                .as_ref()
                .and_then(|c| c.compose_greeting(Some(profile)))
                .unwrap_or_else(composer::compose_greeting);
            return ChatReply::plain(Intent::Greeting, text, false);
        }

        let applied = profile.apply_updates(&parsed.profile_updates);
        let profile_was_updated = !applied.is_empty();
        if profile_was_updated {
            info!(
                user_id = %profile.user_id,
                dietary_preference = %profile.dietary_preference,
                "profile updated from query"
            );
        }

        if parsed.intent == Intent::ProfileUpdate && !parsed.has_ingredients() {
            let text = composer::compose_profile_update(&applied, false);
            return ChatReply::plain(Intent::ProfileUpdate, text, profile_was_updated);
        }

        if parsed.intent == Intent::GeneralQuestion && !parsed.has_ingredients() {
            let text = self
                .llm_response
                .as_ref()
                .and_then(|c| c.compose_general(query, Some(profile)))
                .unwrap_or_else(composer::compose_general_question);
            return ChatReply::plain(Intent::GeneralQuestion, text, profile_was_updated);
        }

        if parsed.ingredients.is_empty() {
            return ChatReply::plain(
                parsed.intent,
                composer::compose_no_ingredients(),
                profile_was_updated,
            );
        }

        // Compound expansion, then label preprocessing with trace flags.
        let (expanded, display_map) = expand_compounds(&parsed.ingredients);
        let (atoms, trace_keys) = preprocess_ingredient_list(&expanded);

        let restriction_ids = build_restriction_ids(profile);
        let options = EvaluateOptions {
            trace_keys,
            profile_context: Some(profile_context(profile)),
            ..EvaluateOptions::default()
        };
        let verdict = self.engine.evaluate(&atoms, Some(&restriction_ids), &options);
        info!(
            status = %verdict.status,
            confidence = verdict.confidence_score,
            triggered = ?verdict.triggered_restrictions,
            "verdict computed"
        );

        let applied_ref = if profile_was_updated { Some(&applied) } else { None };
        let text = self
            .llm_response
            .as_ref()
            .and_then(|c| c.compose_verdict(&verdict, profile, &atoms, applied_ref))
            .unwrap_or_else(|| {
                let display = if display_map.is_empty() {
                    None
                } else {
                    Some(&display_map)
                };
                composer::compose_verdict(&verdict, profile, &atoms, applied_ref, display)
            });

        ChatReply {
            intent: parsed.intent,
            text,
            verdict: Some(verdict),
            profile_was_updated,
        }
    }
}
