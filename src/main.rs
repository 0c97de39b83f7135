use anyhow::Result;
use clap::Parser;

use cell_editor::cli::{self, CliArgs};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    cell_editor::tracing::init();

    let config = args.editor_config()?;
    let text = args.read_input()?;
    tracing::info!(kind = ?args.kind, format = ?args.format, chars = text.chars().count(), "styling cell");

    let out = cli::run(&args, config, &text)?;
    println!("{out}");
    Ok(())
}
