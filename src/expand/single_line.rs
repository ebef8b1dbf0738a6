// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-line extraction: trimmed, deduplicated, origin-excluded matches

use crate::expand::{Candidate, CandidateSet, Origin};
use crate::rg::RgEvent;

/// Turn the raw match stream into single-line candidates, in first-seen
/// order. The invocation site and the search text itself are skipped.
pub fn candidates(events: &[RgEvent], search_text: &str, origin: &Origin) -> Vec<Candidate> {
    let mut set = CandidateSet::seeded(search_text);

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
        let Some(text) = data.lines.text.as_deref() else {
            continue;
        };
        set.push(Candidate {
            text: text.trim().to_string(),
            source_file: path.to_string(),
            source_line: line_number,
        });
    }

    set.into_items()
}
