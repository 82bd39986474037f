use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

mod ask;
mod check;
mod enrich;
mod intent;
mod parse;

/// dw - dietary-compliance engine CLI
///
/// Ask the conversational assistant, evaluate ingredient lists against
/// dietary restrictions, inspect the label parser and intent detector,
/// and run the unknown-ingredient enrichment job.
#[derive(Parser)]
#[clap(name = "dw")]
#[clap(about = "Dietary-compliance engine CLI")]
#[clap(version)]
struct Cli {
    /// Enable verbose logging
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the conversational assistant (intent-routed replies)
    Ask(ask::AskArgs),

    /// Evaluate an ingredient list against a dietary profile
    Check(check::CheckArgs),

    /// Flatten a raw ingredient label and show trace flags
    Parse(parse::ParseArgs),

    /// Run the intent detector over a query
    Intent(intent::IntentArgs),

    /// Promote logged unknown ingredients into the dynamic ontology
    Enrich(enrich::EnrichArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Ask(args) => {
            if let Err(e) = ask::handle_command(args) {
                error!("Ask error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Check(args) => {
            if let Err(e) = check::handle_command(args) {
                error!("Check error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Parse(args) => {
            if let Err(e) = parse::handle_command(args) {
                error!("Parse error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Intent(args) => {
            if let Err(e) = intent::handle_command(args) {
                error!("Intent error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Enrich(args) => {
            if let Err(e) = enrich::handle_command(args) {
                error!("Enrichment error: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
