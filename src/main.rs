// SPDX-License-Identifier: MIT OR Apache-2.0

//! linefill - expand the current line from matches across the project
//!
//! A ripgrep-backed completion backend: finds lines elsewhere in the
//! project that start like the current one and offers them, or the whole
//! block they open, as replacements.

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, OutputFormat};
use commands::expand::{self, Mode};
use linefill::config::{Config, ConfigOutputFormat};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load();
    let format = resolve_format(cli.format, &config);

    match cli.command {
        Commands::Line { opts } => expand::run(Mode::Line, opts, format, &config)?,
        Commands::Block { opts } => expand::run(Mode::Block, opts, format, &config)?,
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LINEFILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_format(cli_format: Option<OutputFormat>, config: &Config) -> OutputFormat {
    cli_format
        .or_else(|| {
            config.output_format().map(|format| match format {
                ConfigOutputFormat::Text => OutputFormat::Text,
                ConfigOutputFormat::Json => OutputFormat::Json,
            })
        })
        .unwrap_or(OutputFormat::Text)
}
