//! `dw check` - evaluate an ingredient list against a dietary profile.

use anyhow::{Context, Result};
use clap::Args;

use dw_engine::{
    build_restriction_ids, composer, ComplianceEngine, EvaluateOptions, UserProfile,
};
use dw_foundation::{Config, Settings};
use dw_parser::{expand_compounds, flatten_ingredients, get_trace_keys, preprocess_ingredients};
use std::collections::HashSet;

#[derive(Args)]
pub struct CheckArgs {
    /// Raw ingredient list (label text or comma-separated names)
    ingredients: String,

    /// Dietary preference (e.g. Vegan, Jain, Halal)
    #[clap(short, long)]
    diet: Option<String>,

    /// Allergen (repeatable)
    #[clap(short, long = "allergen")]
    allergens: Vec<String>,

    /// Lifestyle flag, e.g. "no alcohol" (repeatable)
    #[clap(short, long = "lifestyle")]
    lifestyle: Vec<String>,

    /// Explicit restriction id (repeatable; overrides the profile flags)
    #[clap(short, long = "restriction")]
    restrictions: Vec<String>,

    /// Region scope filter (e.g. US, EU)
    #[clap(long)]
    region: Option<String>,

    /// Disable external-API fallback for unknown ingredients
    #[clap(long)]
    no_api: bool,

    /// Output format (text, json)
    #[clap(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {s}. Valid options: text, json")),
        }
    }
}

pub fn handle_command(args: CheckArgs) -> Result<()> {
    let settings = Settings::from_env();
    settings.validate().context("Invalid settings")?;
    settings.log_summary();
    let engine = ComplianceEngine::from_settings(&settings)
        .context("Failed to initialize compliance engine")?;

    let mut profile = UserProfile::new("cli");
    if let Some(diet) = &args.diet {
        profile.dietary_preference = diet.clone();
    }
    profile.allergens = args.allergens.clone();
    profile.lifestyle = args.lifestyle.clone();

    let restriction_ids = if args.restrictions.is_empty() {
        build_restriction_ids(&profile)
    } else {
        args.restrictions.clone()
    };
    if restriction_ids.is_empty() {
        anyhow::bail!(
            "no restrictions selected; pass --diet/--allergen/--lifestyle or --restriction"
        );
    }

    // Label preprocessing (trace detection over the whole string), then
    // compound expansion ("garlic pasta" -> garlic), then flattening.
    let items = preprocess_ingredients(&args.ingredients);
    let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
    let trace_names = get_trace_keys(&items);
    let (expanded, display_map) = expand_compounds(&names);

    let mut atoms: Vec<String> = Vec::new();
    let mut trace_keys: HashSet<String> = HashSet::new();
    for name in &expanded {
        let was_trace = trace_names.contains(&name.to_lowercase());
        for atom in flatten_ingredients(name) {
            if was_trace {
                trace_keys.insert(atom.clone());
            }
            atoms.push(atom);
        }
    }

    let options = EvaluateOptions {
        region_scope: args.region.clone(),
        trace_keys,
        use_api_fallback: !args.no_api,
        profile_context: None,
    };
    let verdict = engine.evaluate(&atoms, Some(&restriction_ids), &options);

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        OutputFormat::Text => {
            let display = if display_map.is_empty() {
                None
            } else {
                Some(&display_map)
            };
            let text = composer::compose_verdict(&verdict, &profile, &atoms, None, display);
            println!("{text}");
            println!();
            println!(
                "status={} confidence={:.2} ontology={}",
                verdict.status, verdict.confidence_score, verdict.ontology_version
            );
        }
    }

    Ok(())
}
