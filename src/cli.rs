// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// linefill - expand the current line from matches across the project
///
/// Searches the project for lines that start with the text before the
/// cursor and offers them - or the whole block they open - as replacements
/// for the current line.
#[derive(Parser, Debug)]
#[command(name = "linefill")]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Quickstart:\n  linefill line src/main.rs --line 42\n  linefill block web/panel.tsx --line 17 --write\n\nEditor integrations shell out with --format json and apply the edit themselves."
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options shared by both expansion modes
#[derive(Debug, clap::Args)]
pub struct ExpandOpts {
    /// File the cursor is in
    pub file: PathBuf,

    /// 1-based line number of the cursor
    #[arg(short, long)]
    pub line: usize,

    /// Cursor column: the search text is the first COL characters of the
    /// line (defaults to the whole line)
    #[arg(short, long)]
    pub col: Option<usize>,

    /// Search root (defaults to the file's parent directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Restrict the search to a ripgrep file type (repeatable)
    #[arg(short = 't', long = "type")]
    pub file_types: Vec<String>,

    /// Apply the chosen candidate to the file instead of listing
    #[arg(short, long)]
    pub write: bool,

    /// Candidate to apply in --write mode when several match (1-based)
    #[arg(long)]
    pub pick: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Offer single-line completions for the current line
    #[command(visible_alias = "l")]
    Line {
        #[command(flatten)]
        opts: ExpandOpts,
    },

    /// Offer whole-block completions for the current line
    #[command(visible_alias = "b")]
    Block {
        #[command(flatten)]
        opts: ExpandOpts,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
