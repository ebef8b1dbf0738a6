// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line/block expansion command: search, extract, present, apply

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::cli::{ExpandOpts, OutputFormat};
use linefill::config::Config;
use linefill::document::{Cursor, Document};
use linefill::expand::{self, single_line, Candidate, Origin, Outcome};
use linefill::output::print_json;
use linefill::picker::{self, PickItem, PickerLifecycle, PickerPhase};
use linefill::rg::{self, RgEvent, SearchOptions};

/// Delay before the pending picker becomes visible; fast searches never
/// flash UI.
const PICKER_SHOW_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Line,
    Block,
}

/// Run one expansion interaction end to end.
pub fn run(mode: Mode, opts: ExpandOpts, format: OutputFormat, config: &Config) -> Result<()> {
    let mut document = Document::load(&opts.file)?;

    // Invalid invocations abort silently: a blank line or an empty search
    // prefix is not worth an error in front of an editor integration.
    let Some(target) = document.line(opts.line) else {
        debug!(line = opts.line, "invalid invocation: line out of range");
        return Ok(());
    };
    if target.trim().is_empty() {
        debug!("invalid invocation: blank line");
        return Ok(());
    }
    let search_text = match opts.col {
        Some(col) => target.chars().take(col).collect::<String>(),
        None => target.to_string(),
    };
    let search_text = search_text.trim().to_string();
    if search_text.is_empty() {
        debug!("invalid invocation: empty search text");
        return Ok(());
    }

    let root = search_root(&opts);
    let binary = rg::resolve_binary(config.rg_binary.as_deref())?;
    let origin = Origin::new(&opts.file, opts.line as u64);

    let mut options = SearchOptions {
        pattern: rg::line_anchored_pattern(&search_text),
        file_types: config.merge_file_types(&opts.file_types),
        ..SearchOptions::default()
    };
    if mode == Mode::Block {
        options.before_context = Some(config.before_context());
        options.after_context = Some(config.after_context());
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let Some(events) = runtime.block_on(search_with_lifecycle(&binary, &root, &options))? else {
        // Dismissed while pending: discard the result, apply nothing.
        return Ok(());
    };

    let candidates = match mode {
        Mode::Line => single_line::candidates(&events, &search_text, &origin),
        Mode::Block => expand::block_candidates(&events, &origin),
    };

    match Outcome::from_candidates(candidates) {
        Outcome::NoResults => report_no_results(format, &search_text),
        Outcome::Single(candidate) if opts.write => {
            apply(&mut document, opts.line, &candidate, &root, format, config)
        }
        Outcome::Single(candidate) => present(&[candidate], &root, format, &search_text),
        Outcome::Multiple(candidates) if opts.write => {
            match choose(&candidates, &root, opts.pick)? {
                Some(candidate) => {
                    apply(&mut document, opts.line, &candidate, &root, format, config)
                }
                // Dismissed after the picker was shown: no edit.
                None => Ok(()),
            }
        }
        Outcome::Multiple(candidates) => present(&candidates, &root, format, &search_text),
    }
}

/// Run the search with the picker lifecycle attached: a cancellable timer
/// shows the pending spinner after a delay, Ctrl-C dismisses the
/// interaction and the result is discarded. Returns None on dismissal.
async fn search_with_lifecycle(
    binary: &Path,
    root: &Path,
    options: &SearchOptions,
) -> Result<Option<Vec<RgEvent>>> {
    let lifecycle = Arc::new(Mutex::new(PickerLifecycle::new()));
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Searching the project...");

    let timer_lifecycle = Arc::clone(&lifecycle);
    let timer_spinner = spinner.clone();
    let timer = tokio::spawn(async move {
        tokio::time::sleep(PICKER_SHOW_DELAY).await;
        let mut lifecycle = timer_lifecycle.lock().expect("picker lifecycle poisoned");
        if lifecycle.timer_fired() {
            timer_spinner.enable_steady_tick(Duration::from_millis(80));
        }
    });

    let outcome = tokio::select! {
        result = rg::search(binary, root, options) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    timer.abort();
    let mut lifecycle = lifecycle.lock().expect("picker lifecycle poisoned");
    if lifecycle.phase() == PickerPhase::Shown {
        spinner.finish_and_clear();
    }

    match outcome {
        Some(result) if lifecycle.accepts_result() => Ok(Some(result?)),
        Some(_) => Ok(None),
        None => {
            lifecycle.dismiss();
            debug!("search dismissed before completion; result discarded");
            Ok(None)
        }
    }
}

fn search_root(opts: &ExpandOpts) -> PathBuf {
    if let Some(root) = &opts.root {
        return root.clone();
    }
    match opts.file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Pick one of several candidates: `--pick` wins, otherwise an
/// interactive terminal picker. Returns None when the picker is
/// dismissed without a selection.
fn choose(candidates: &[Candidate], root: &Path, pick: Option<usize>) -> Result<Option<Candidate>> {
    if let Some(number) = pick {
        if number == 0 || number > candidates.len() {
            bail!(
                "--pick {number} is out of range (1..={})",
                candidates.len()
            );
        }
        return Ok(Some(candidates[number - 1].clone()));
    }

    if !console::user_attended() {
        bail!(
            "{} candidates found; re-run with --pick N to choose one non-interactively",
            candidates.len()
        );
    }

    let labels: Vec<String> = candidates
        .iter()
        .map(|candidate| {
            let first_line = candidate.text.lines().next().unwrap_or_default();
            format!(
                "{first_line}  ({})",
                picker::source_annotation(candidate, root)
            )
        })
        .collect();

    let selection = dialoguer::Select::new()
        .with_prompt("Apply which candidate?")
        .items(&labels)
        .default(0)
        .interact_opt()
        .context("interactive picker failed")?;

    Ok(selection.map(|index| candidates[index].clone()))
}

#[derive(Debug, Serialize)]
struct AppliedPayload<'a> {
    applied: bool,
    file: String,
    line: usize,
    lines_inserted: usize,
    cursor: Cursor,
    source: SourceRef<'a>,
}

#[derive(Debug, Serialize)]
struct SourceRef<'a> {
    path: &'a str,
    line: u64,
}

fn apply(
    document: &mut Document,
    line: usize,
    candidate: &Candidate,
    root: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    if let Some(style) = config.indent_override() {
        document.set_indent_style(style);
    }
    let edit = document.replace_line(line, &candidate.text)?;
    document.save()?;

    match format {
        OutputFormat::Json => print_json(&AppliedPayload {
            applied: true,
            file: document.path().display().to_string(),
            line,
            lines_inserted: edit.lines_inserted,
            cursor: edit.cursor,
            source: SourceRef {
                path: &candidate.source_file,
                line: candidate.source_line,
            },
        }),
        OutputFormat::Text => {
            println!(
                "{} Applied {} ({} line{}), cursor at {}:{}",
                "✓".green(),
                picker::source_annotation(candidate, root).cyan(),
                edit.lines_inserted,
                if edit.lines_inserted == 1 { "" } else { "s" },
                edit.cursor.line,
                edit.cursor.column
            );
            Ok(())
        }
    }
}

fn present(
    candidates: &[Candidate],
    root: &Path,
    format: OutputFormat,
    search_text: &str,
) -> Result<()> {
    let items: Vec<PickItem> = candidates
        .iter()
        .map(|candidate| PickItem::for_candidate(candidate, root))
        .collect();

    match format {
        OutputFormat::Json => print_json(&items),
        OutputFormat::Text => {
            println!(
                "\n{} {} result{} for: {}\n",
                "🔍".cyan(),
                candidates.len(),
                if candidates.len() == 1 { "" } else { "s" },
                search_text.yellow()
            );
            for (index, item) in items.iter().enumerate() {
                let detail = item.detail.as_deref().unwrap_or_default();
                println!("  {} {}", format!("[{}]", index + 1).blue(), detail.cyan());
                for line in item.label.lines() {
                    println!("      {line}");
                }
            }
            Ok(())
        }
    }
}

fn report_no_results(format: OutputFormat, search_text: &str) -> Result<()> {
    match format {
        // The explicit pseudo-entry: not selectable, value-less.
        OutputFormat::Json => print_json(&vec![PickItem::status("No results found")]),
        OutputFormat::Text => {
            println!(
                "{} No results found for: {}",
                "✗".red(),
                search_text.yellow()
            );
            Ok(())
        }
    }
}
