// SPDX-License-Identifier: MIT OR Apache-2.0

//! Block boundary detection
//!
//! Given a matched line and the file content after it, decide how many of
//! the following lines belong to the same logical block using only
//! indentation and two syntactic heuristics. No language parser: the
//! indentation width of the match line is the proxy for block scope, a
//! leading `<` specializes for markup, and a flat run of siblings falls
//! back to blank-line termination.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*").expect("valid indent regex"));

/// Width in characters of a line's leading space/tab run.
pub fn indent_width(line: &str) -> usize {
    LEADING_INDENT.find(line).map_or(0, |hit| hit.end())
}

/// Exact-width indent test: the first `indent` characters are all
/// space/tab and the character right after them exists and is neither.
/// A blank line never satisfies it, and neither does a line indented
/// less (or more) than `indent`.
fn has_exact_indent(line: &str, indent: usize) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() <= indent {
        return false;
    }
    bytes[..indent].iter().all(|b| *b == b' ' || *b == b'\t')
        && bytes[indent] != b' '
        && bytes[indent] != b'\t'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Terminated by the next line back at the match's indentation.
    SameIndent,
    /// Terminated by a same-indent closing tag (`</...`).
    TagClose,
    /// Terminated by the next blank line.
    EmptyLine,
}

/// Inclusive end offset of the block within `lines`, where index 0 is the
/// match line. `None` means no terminator appeared before the content ran
/// out; such a match is dropped as ambiguous rather than guessed at.
fn end_offset(lines: &[String], indent: usize) -> Option<usize> {
    let mut strategy = if lines[0].trim_start().starts_with('<') {
        Strategy::TagClose
    } else {
        Strategy::SameIndent
    };

    for (offset, line) in lines.iter().enumerate().skip(1) {
        match strategy {
            Strategy::SameIndent => {
                let same_indent = has_exact_indent(line, indent);
                if same_indent && offset == 1 && !line.trim().is_empty() {
                    // The line right after the match is a sibling, so this
                    // is flat content: the block runs to the next blank
                    // line instead of the next same-indent line.
                    strategy = Strategy::EmptyLine;
                    continue;
                }
                if same_indent {
                    return Some(offset);
                }
            }
            Strategy::TagClose => {
                if has_exact_indent(line, indent) && line.trim_start().starts_with("</") {
                    return Some(offset);
                }
            }
            Strategy::EmptyLine => {
                if line.trim().is_empty() {
                    return Some(offset - 1);
                }
            }
        }
    }

    None
}

/// Extract the block opened at `lines[0]`: locate its end, strip the match
/// line's indentation from every member line, join with `\n`.
pub fn extract(lines: &[String]) -> Option<String> {
    let first = lines.first()?;
    let indent = indent_width(first);
    let end = end_offset(lines, indent)?;
    let block: Vec<&str> = lines[..=end]
        .iter()
        .map(|line| strip_indent(line, indent))
        .collect();
    Some(block.join("\n"))
}

/// Extract the block for a 1-based match line within full file content.
pub fn extract_at(content: &[String], line_number: u64) -> Option<String> {
    let start = usize::try_from(line_number.checked_sub(1)?).ok()?;
    if start >= content.len() {
        return None;
    }
    extract(&content[start..])
}

/// Strip exactly `indent` leading whitespace characters when the line has
/// them; shallower lines (blank ones included) are left untouched.
fn strip_indent(line: &str, indent: usize) -> &str {
    let bytes = line.as_bytes();
    if bytes.len() >= indent && bytes[..indent].iter().all(|b| *b == b' ' || *b == b'\t') {
        &line[indent..]
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn same_indent_terminator_is_included() {
        let content = lines(&["if (x) {", "  y();", "}", "z();"]);
        assert_eq!(extract(&content).as_deref(), Some("if (x) {\n  y();\n}"));
    }

    #[test]
    fn sibling_on_next_line_switches_to_blank_line_termination() {
        let content = lines(&["x = 1", "y = 2", "", "z = 3"]);
        assert_eq!(extract(&content).as_deref(), Some("x = 1\ny = 2"));
    }

    #[test]
    fn tag_close_at_same_indent_ends_the_block() {
        let content = lines(&["<div>", "  <p>hi</p>", "</div>", "<span/>"]);
        assert_eq!(
            extract(&content).as_deref(),
            Some("<div>\n  <p>hi</p>\n</div>")
        );
    }

    #[test]
    fn deeper_closing_tag_is_skipped() {
        let content = lines(&["<div>", "  <section>", "  </section>", "</div>"]);
        assert_eq!(
            extract(&content).as_deref(),
            Some("<div>\n  <section>\n  </section>\n</div>")
        );
    }

    #[test]
    fn unterminated_block_is_dropped() {
        assert_eq!(extract(&lines(&["if (x) {", "  y();"])), None);
        assert_eq!(extract(&lines(&["<div>", "  <p>"])), None);
    }

    #[test]
    fn less_indented_line_does_not_terminate() {
        // The test is for exactly the match's indentation, so a dedented
        // line is scanned past until an exact-width line appears.
        let content = lines(&["    inner {", "  odd", "    }", "done"]);
        assert_eq!(extract(&content).as_deref(), Some("inner {\n  odd\n}"));
    }

    #[test]
    fn dedent_normalizes_first_line_and_preserves_relative_indent() {
        let content = lines(&["    if (x) {", "        y();", "    }"]);
        let block = extract(&content).expect("block");
        assert_eq!(block, "if (x) {\n    y();\n}");
        let first = block.lines().next().expect("first line");
        assert_eq!(indent_width(first), 0);
    }

    #[test]
    fn blank_member_lines_survive_dedent_untouched() {
        let content = lines(&["  open {", "", "  }"]);
        assert_eq!(extract(&content).as_deref(), Some("open {\n\n}"));
    }

    #[test]
    fn tab_indentation_counts_like_spaces() {
        let content = lines(&["\tfn f() {", "\t\tbody();", "\t}", "\tnext"]);
        assert_eq!(extract(&content).as_deref(), Some("fn f() {\n\tbody();\n}"));
    }

    #[test]
    fn extract_at_guards_out_of_range_lines() {
        let content = lines(&["a", "b"]);
        assert_eq!(extract_at(&content, 0), None);
        assert_eq!(extract_at(&content, 3), None);
    }

    #[test]
    fn empty_line_fallback_keeps_scanning_over_nonblank_siblings() {
        let content = lines(&["a = 1", "b = 2", "c = 3", "", "d = 4"]);
        assert_eq!(extract(&content).as_deref(), Some("a = 1\nb = 2\nc = 3"));
    }
}
