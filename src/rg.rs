// SPDX-License-Identifier: MIT OR Apache-2.0

//! ripgrep client: argument construction, invocation, JSON event parsing
//!
//! One invocation per interaction, output fully buffered before parsing.
//! Events are the newline-delimited JSON objects of ripgrep's `--json`
//! output mode.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::errors::SearchError;

/// Leading-context window for block mode: effectively "the whole file
/// before the match", so file contents can be reconstructed.
pub const WHOLE_FILE_BEFORE_CONTEXT: u32 = 9999;

/// Trailing-context window for block mode: bounds how far a block may
/// continue past its match line.
pub const BLOCK_AFTER_CONTEXT: u32 = 100;

/// Options for one backend invocation. `pattern` is a full regex, already
/// escaped and anchored by the caller.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub pattern: String,
    /// ripgrep file-type filters (`-t`).
    pub file_types: Vec<String>,
    /// Let the pattern match across line boundaries (`--multiline`).
    pub multiline: bool,
    /// Lines of leading context per match.
    pub before_context: Option<u32>,
    /// Lines of trailing context per match.
    pub after_context: Option<u32>,
}

/// One parsed line of `--json` output.
///
/// Per-file ordering is `begin`, interleaved `match`/`context` in file
/// line order, `end`. The run-level `summary` event is parsed so a real
/// ripgrep binary does not trip the malformed-output check, and ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum RgEvent {
    Begin(FileData),
    Match(LineData),
    Context(LineData),
    End(FileData),
    Summary(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileData {
    pub path: TextPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineData {
    pub path: TextPayload,
    pub lines: TextPayload,
    /// 1-based. Absent on context lines when line numbers are disabled.
    pub line_number: Option<u64>,
    #[serde(default)]
    pub submatches: Vec<SubMatch>,
}

/// ripgrep reports non-UTF-8 content as base64 `bytes` instead of `text`;
/// such payloads are skipped by the extractors.
#[derive(Debug, Clone, Deserialize)]
pub struct TextPayload {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubMatch {
    #[serde(rename = "match")]
    pub matched: TextPayload,
    pub start: usize,
    pub end: usize,
}

/// Build the pattern for a literal search text: anchored to line start
/// with leading whitespace allowed, text matched literally.
pub fn line_anchored_pattern(search_text: &str) -> String {
    format!("^[ \\t]*{}", regex::escape(search_text))
}

/// Resolve the backend binary: `LINEFILL_RG`, then the configured name,
/// then `rg`. Bare names are looked up on PATH.
pub fn resolve_binary(configured: Option<&str>) -> Result<PathBuf, SearchError> {
    let name = std::env::var("LINEFILL_RG")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| "rg".to_string());

    if name.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(name));
    }

    which::which(&name).map_err(|_| SearchError::BackendNotFound { binary: name })
}

/// Invoke the backend once and parse its buffered output.
///
/// Exit status 1 with empty stderr is ripgrep's "no matches" and yields an
/// empty event list; any other non-success status is a backend failure.
pub async fn search(
    binary: &Path,
    root: &Path,
    options: &SearchOptions,
) -> Result<Vec<RgEvent>, SearchError> {
    let args = build_args(root, options);
    debug!(binary = %binary.display(), ?args, "invoking search backend");

    let output = Command::new(binary)
        .args(&args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => SearchError::BackendNotFound {
                binary: binary.display().to_string(),
            },
            _ => SearchError::Spawn {
                binary: binary.display().to_string(),
                source,
            },
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let no_matches = output.status.code() == Some(1) && stderr.trim().is_empty();
    if !output.status.success() && !no_matches {
        return Err(SearchError::BackendFailed {
            status: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    parse_events(&String::from_utf8_lossy(&output.stdout))
}

fn build_args(root: &Path, options: &SearchOptions) -> Vec<String> {
    let mut args = vec!["--json".to_string(), "-e".to_string(), options.pattern.clone()];

    for file_type in &options.file_types {
        args.push("-t".to_string());
        args.push(file_type.clone());
    }

    if options.multiline {
        args.push("--multiline".to_string());
    }

    if let Some(lines) = options.before_context {
        args.push(format!("--before-context={lines}"));
    }

    if let Some(lines) = options.after_context {
        args.push(format!("--after-context={lines}"));
    }

    // Case-insensitive iff the pattern is all lowercase.
    args.push("--smart-case".to_string());

    args.push("--".to_string());
    args.push(root.display().to_string());
    args
}

/// Parse newline-delimited JSON events. A malformed line fails the whole
/// operation.
pub fn parse_events(stdout: &str) -> Result<Vec<RgEvent>, SearchError> {
    let mut events = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|source| SearchError::MalformedOutput {
            line: line.to_string(),
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Reconstruct full file contents from the events between each file's
/// begin/end pair. Line payloads carry their own terminators, so the
/// concatenation is split on `\r?\n` afterwards; `content[n - 1]` is the
/// 1-based line `n` reported by the backend.
pub fn file_contents(events: &[RgEvent]) -> HashMap<String, Vec<String>> {
    let mut contents = HashMap::new();
    let mut current: Option<(String, String)> = None;

    for event in events {
        match event {
            RgEvent::Begin(data) => {
                current = data.path.text.clone().map(|path| (path, String::new()));
            }
            RgEvent::Match(data) | RgEvent::Context(data) => {
                if let (Some((_, buffer)), Some(text)) =
                    (current.as_mut(), data.lines.text.as_deref())
                {
                    buffer.push_str(text);
                }
            }
            RgEvent::End(_) => {
                if let Some((path, buffer)) = current.take() {
                    contents.insert(path, split_lines(&buffer));
                }
            }
            RgEvent::Summary(_) => {}
        }
    }

    contents
}

fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(at) = rest.find('\n') {
        let line = &rest[..at];
        lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
        rest = &rest[at + 1..];
    }
    lines.push(rest.to_string());
    lines
}
