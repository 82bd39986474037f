//! `dw ask` - conversational assistant over the compliance engine.
//!
//! Routes the query by detected intent: greetings and general questions
//! get conversational replies, profile statements update the session
//! profile, and anything with ingredients runs the full evaluation
//! pipeline and a composed verdict response.

use anyhow::{Context, Result};
use clap::Args;

use dw_engine::{ChatAssistant, ComplianceEngine, UserProfile};
use dw_foundation::{Config, Settings};

#[derive(Args)]
pub struct AskArgs {
    /// Natural-language query ("can I eat garlic pasta?", "hello", ...)
    query: String,

    /// Dietary preference for this session (e.g. Vegan, Jain, Halal)
    #[clap(short, long)]
    diet: Option<String>,

    /// Allergen (repeatable)
    #[clap(short, long = "allergen")]
    allergens: Vec<String>,

    /// Lifestyle flag, e.g. "no alcohol" (repeatable)
    #[clap(short, long = "lifestyle")]
    lifestyle: Vec<String>,

    /// Compose replies with the local LLM (validated, template fallback)
    #[clap(long)]
    llm: bool,

    /// Print the session profile after the reply
    #[clap(long)]
    show_profile: bool,
}

pub fn handle_command(args: AskArgs) -> Result<()> {
    let settings = Settings::from_env();
    settings.validate().context("Invalid settings")?;
    settings.log_summary();

    let engine = ComplianceEngine::from_settings(&settings)
        .context("Failed to initialize compliance engine")?;
    let assistant = if args.llm {
        ChatAssistant::new(engine).with_llm(&settings)
    } else {
        ChatAssistant::new(engine)
    };

    let mut profile = UserProfile::new("cli");
    if let Some(diet) = &args.diet {
        profile.dietary_preference = diet.clone();
    }
    profile.allergens = args.allergens.clone();
    profile.lifestyle = args.lifestyle.clone();

    let reply = assistant.respond(&args.query, &mut profile);

    println!("{}", reply.text);
    if let Some(verdict) = &reply.verdict {
        println!();
        println!(
            "status={} confidence={:.2} ontology={}",
            verdict.status, verdict.confidence_score, verdict.ontology_version
        );
    }
    if args.show_profile || reply.profile_was_updated {
        println!();
        println!("profile: {}", serde_json::to_string(&profile)?);
    }

    Ok(())
}
