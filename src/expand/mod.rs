// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate assembly shared by the line and block modes

pub mod block;
pub mod single_line;

use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rg::{self, RgEvent};

/// A deduplicated, origin-excluded completion offered to the user.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub text: String,
    pub source_file: String,
    pub source_line: u64,
}

/// The invocation site. A match at the exact file+line the command was
/// run from is never a candidate.
#[derive(Debug, Clone)]
pub struct Origin {
    file: PathBuf,
    line: u64,
}

impl Origin {
    pub fn new(file: &Path, line: u64) -> Self {
        Self {
            file: canonical(file),
            line,
        }
    }

    /// True when a reported match points back at the invocation site.
    pub fn is_at(&self, path: &str, line_number: u64) -> bool {
        self.line == line_number && canonical(Path::new(path)) == self.file
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Insertion-ordered candidate collection with exact-text deduplication:
/// the first occurrence wins, later duplicates are dropped.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen: HashSet<String>,
    items: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line mode seeds the seen-set with the search text so the query
    /// itself never comes back as a candidate. Block mode does not.
    pub fn seeded(search_text: &str) -> Self {
        let mut set = Self::default();
        set.seen.insert(search_text.to_string());
        set
    }

    pub fn push(&mut self, candidate: Candidate) -> bool {
        if self.seen.contains(&candidate.text) {
            return false;
        }
        self.seen.insert(candidate.text.clone());
        self.items.push(candidate);
        true
    }

    pub fn into_items(self) -> Vec<Candidate> {
        self.items
    }
}

/// Result-count rule: nothing to offer, auto-apply, or present all.
#[derive(Debug)]
pub enum Outcome {
    NoResults,
    Single(Candidate),
    Multiple(Vec<Candidate>),
}

impl Outcome {
    pub fn from_candidates(mut candidates: Vec<Candidate>) -> Self {
        match candidates.len() {
            0 => Self::NoResults,
            1 => Self::Single(candidates.remove(0)),
            _ => Self::Multiple(candidates),
        }
    }
}

/// Block mode: reconstruct file contents from the event stream, then run
/// boundary detection on every match. Matches whose block never
/// terminates are dropped without becoming candidates.
pub fn block_candidates(events: &[RgEvent], origin: &Origin) -> Vec<Candidate> {
    let contents = rg::file_contents(events);
    let mut set = CandidateSet::new();

    for event in events {
        let RgEvent::Match(data) = event else {
            continue;
        };
        let (Some(path), Some(line_number)) = (data.path.text.as_deref(), data.line_number) else {
            continue;
        };
        if origin.is_at(path, line_number) {
            continue;
        }
        let Some(file_lines) = contents.get(path) else {
            continue;
        };
        let Some(text) = block::extract_at(file_lines, line_number) else {
            continue;
        };
        set.push(Candidate {
            text,
            source_file: path.to_string(),
            source_line: line_number,
        });
    }

    set.into_items()
}
