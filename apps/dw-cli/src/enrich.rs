//! `dw enrich` - promote logged unknown ingredients into the dynamic
//! ontology.
//!
//! Reads the unknown-ingredient log, fetches every key seen at least
//! `--min-frequency` times, and appends high-confidence results to
//! `dynamic_ontology.json`. Run periodically (cron or a scheduler).

use anyhow::{Context, Result};
use clap::Args;

use dw_connectors::{FetcherConfig, IngredientFetcher};
use dw_engine::run_enrichment;
use dw_foundation::Settings;
use dw_ontology::{DynamicOntology, UnknownIngredientsLog};

#[derive(Args)]
pub struct EnrichArgs {
    /// Minimum times an unknown key must have been seen
    #[clap(long, default_value = "1")]
    min_frequency: u64,

    /// Report what would be added without writing
    #[clap(long)]
    dry_run: bool,
}

pub fn handle_command(args: EnrichArgs) -> Result<()> {
    let settings = Settings::from_env();
    settings.log_summary();

    let log = UnknownIngredientsLog::load(&settings.unknown_log_path());
    let mut dynamic = DynamicOntology::load(&settings.dynamic_ontology_path())
        .context("Failed to load dynamic ontology")?;
    let fetcher = IngredientFetcher::new(FetcherConfig::default());

    let stats = run_enrichment(&log, &mut dynamic, &fetcher, args.min_frequency, args.dry_run)
        .context("Enrichment run failed")?;

    println!(
        "examined={} added={} skipped={}{}",
        stats.examined,
        stats.added,
        stats.skipped,
        if args.dry_run { " (dry-run)" } else { "" }
    );
    Ok(())
}
