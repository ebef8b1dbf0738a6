// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result-picker entries and lifecycle
//!
//! `PickItem` is the explicit record handed to whatever selection UI is in
//! front: the replacement text travels in `value`, not in hidden metadata
//! attached to a display row. `PickerLifecycle` is the state machine behind
//! the delayed picker show: the picker starts pending, a cancellable timer
//! shows it, and dismissal from either state disposes it. A search result
//! arriving after disposal is discarded, never applied.

use serde::Serialize;
use std::path::Path;

use crate::expand::Candidate;

/// One selectable entry. Entries without a `value` are status rows
/// ("no results", errors) and cannot be applied.
#[derive(Debug, Clone, Serialize)]
pub struct PickItem {
    pub label: String,
    pub detail: Option<String>,
    pub value: Option<String>,
}

impl PickItem {
    pub fn status(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
            value: None,
        }
    }

    /// Entry for a candidate, annotated with its source relative to the
    /// search root plus the 1-based line number.
    pub fn for_candidate(candidate: &Candidate, root: &Path) -> Self {
        Self {
            label: candidate.text.clone(),
            detail: Some(source_annotation(candidate, root)),
            value: Some(candidate.text.clone()),
        }
    }
}

/// `relative/path:line` disambiguation text for a candidate.
pub fn source_annotation(candidate: &Candidate, root: &Path) -> String {
    let path = Path::new(&candidate.source_file);
    let relative = path.strip_prefix(root).unwrap_or(path);
    format!("{}:{}", relative.display(), candidate.source_line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    Pending,
    Shown,
    Disposed,
}

/// Explicit pending/shown/disposed state machine for the results picker.
#[derive(Debug)]
pub struct PickerLifecycle {
    phase: PickerPhase,
}

impl PickerLifecycle {
    pub fn new() -> Self {
        Self {
            phase: PickerPhase::Pending,
        }
    }

    pub fn phase(&self) -> PickerPhase {
        self.phase
    }

    /// The scheduled show timer fired. Returns true when this call is the
    /// one that showed the picker; a fire after dismissal is a no-op.
    pub fn timer_fired(&mut self) -> bool {
        if self.phase == PickerPhase::Pending {
            self.phase = PickerPhase::Shown;
            return true;
        }
        false
    }

    /// User dismissal, from pending or shown.
    pub fn dismiss(&mut self) {
        self.phase = PickerPhase::Disposed;
    }

    /// Whether a search result arriving now should still be processed.
    pub fn accepts_result(&self) -> bool {
        self.phase != PickerPhase::Disposed
    }
}

impl Default for PickerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
