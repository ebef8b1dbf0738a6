// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! Only genuine backend failures live here. A search that finds nothing is
//! not an error, and an invalid invocation (blank line, empty search text)
//! aborts silently before any of these can occur.

use thiserror::Error;

/// Errors from one external search backend invocation.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The backend binary could not be resolved.
    #[error(
        "Search backend '{binary}' not found\n\n\
         Suggestion: install ripgrep and make sure it is on your PATH.\n\
         Example: apt install ripgrep (or: brew install ripgrep)\n\
         Or point linefill at a binary: rg_binary in .linefillrc.toml, or LINEFILL_RG"
    )]
    BackendNotFound { binary: String },

    /// Spawning or reading the backend process failed.
    #[error("Failed to run search backend '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend ran and reported a failure. A no-match exit (status 1
    /// with empty stderr) never lands here.
    #[error("Search backend failed{}: {stderr}", exit_label(.status))]
    BackendFailed { status: Option<i32>, stderr: String },

    /// A line of backend output was not a valid JSON event. The whole
    /// operation fails rather than silently skipping the line.
    #[error("Malformed search backend output: {line}")]
    MalformedOutput {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (exit code {code})"),
        None => String::new(),
    }
}
