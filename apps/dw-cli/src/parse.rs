//! `dw parse` - flatten a raw ingredient label and show trace flags.

use anyhow::Result;
use clap::Args;

use dw_parser::{flatten_ingredients, preprocess_ingredients};

#[derive(Args)]
pub struct ParseArgs {
    /// Raw ingredient label text
    label: String,

    /// Print the flat atom list only (no trace flags)
    #[clap(long)]
    flat: bool,
}

pub fn handle_command(args: ParseArgs) -> Result<()> {
    if args.flat {
        for atom in flatten_ingredients(&args.label) {
            println!("{atom}");
        }
        return Ok(());
    }

    let items = preprocess_ingredients(&args.label);
    if items.is_empty() {
        println!("(no ingredients parsed)");
        return Ok(());
    }
    for item in items {
        let marker = if item.trace { " [trace <2%]" } else { "" };
        println!("{}{marker}", item.name);
        for atom in flatten_ingredients(&item.name) {
            if atom != item.name {
                println!("  -> {atom}");
            }
        }
    }
    Ok(())
}
