//! Intent detection for conversational food-safety queries.
//!
//! The rule-based [`IntentDetector`] is fully deterministic pattern
//! matching; it never calls a model. The optional [`llm`] module extracts
//! intent with a local LLM only when the rules could not parse the query,
//! and its output is reconciled against the rule-based result.
//!
//! Detected intents: PROFILE_UPDATE, INGREDIENT_QUERY, MIXED, GREETING,
//! GENERAL_QUESTION.

pub mod detector;
pub mod llm;

pub use detector::{
    canonical_diet, IntentDetector, Intent, ParsedIntent, ProfileUpdates,
};
pub use llm::{LlmIntent, LlmIntentExtractor};

/// Parse a natural-language query with the default detector.
pub fn detect_intent(query: &str) -> ParsedIntent {
    detector::IntentDetector::shared().detect(query)
}
