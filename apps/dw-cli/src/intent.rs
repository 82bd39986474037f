//! `dw intent` - run the intent detector over a query.

use anyhow::Result;
use clap::Args;

use dw_foundation::Settings;
use dw_intent::{llm, IntentDetector, LlmIntentExtractor};

#[derive(Args)]
pub struct IntentArgs {
    /// Natural-language query
    query: String,

    /// Try the LLM fallback when the rules cannot parse the query
    #[clap(long)]
    llm_fallback: bool,
}

pub fn handle_command(args: IntentArgs) -> Result<()> {
    let mut parsed = IntentDetector::shared().detect(&args.query);

    if args.llm_fallback
        && parsed.intent == dw_intent::Intent::GeneralQuestion
        && !parsed.has_ingredients()
        && !parsed.has_profile_update()
    {
        let settings = Settings::from_env();
        let extractor = LlmIntentExtractor::new(&settings);
        if let Some(extracted) = extractor.extract(&args.query) {
            if let Some(reconciled) = llm::reconcile(&parsed, extracted) {
                parsed = reconciled;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
