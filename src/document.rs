// SPDX-License-Identifier: MIT OR Apache-2.0

//! Editable document surface: line access, indentation and line-ending
//! conventions, and the edit applier that substitutes a chosen candidate
//! for the current line.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::expand::block;

/// Indent character the document uses when fresh indentation is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces,
    Tabs,
}

impl IndentStyle {
    pub fn character(self) -> char {
        match self {
            Self::Spaces => ' ',
            Self::Tabs => '\t',
        }
    }
}

/// Line-ending convention of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// Cursor position after a replacement: end of the replaced region,
/// 1-based line and character column.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

/// Outcome of a successful line replacement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AppliedEdit {
    pub lines_inserted: usize,
    pub cursor: Cursor,
}

/// A text document loaded from disk, split into lines with its EOL and
/// indent conventions detected up front.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    lines: Vec<String>,
    line_ending: LineEnding,
    indent_style: IndentStyle,
    trailing_newline: bool,
}

impl Document {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::from_text(path, &raw))
    }

    pub fn from_text(path: &Path, raw: &str) -> Self {
        let line_ending = if raw.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        };
        let trailing_newline = raw.ends_with('\n');
        let lines: Vec<String> = raw.lines().map(str::to_string).collect();
        let indent_style = detect_indent(&lines);

        Self {
            path: path.to_path_buf(),
            lines,
            line_ending,
            indent_style,
            trailing_newline,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based line access.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    pub fn indent_style(&self) -> IndentStyle {
        self.indent_style
    }

    pub fn set_indent_style(&mut self, style: IndentStyle) {
        self.indent_style = style;
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Replace line `number`'s full text with the candidate. Every
    /// candidate line is prefixed with the target line's leading
    /// indentation, rendered in the document's indent character; the
    /// candidate's own first line is already dedented to zero, so its
    /// relative indentation survives intact.
    pub fn replace_line(&mut self, number: usize, candidate: &str) -> Result<AppliedEdit> {
        let target = self
            .line(number)
            .with_context(|| format!("line {number} out of range"))?;
        let indent_chars = block::indent_width(target);
        let prefix: String = std::iter::repeat(self.indent_style.character())
            .take(indent_chars)
            .collect();

        let inserted: Vec<String> = candidate
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .map(|line| format!("{prefix}{line}"))
            .collect();

        let lines_inserted = inserted.len();
        let last_column = inserted.last().map_or(0, |line| line.chars().count());
        self.lines.splice(number - 1..number, inserted);

        Ok(AppliedEdit {
            lines_inserted,
            cursor: Cursor {
                line: number + lines_inserted - 1,
                column: last_column,
            },
        })
    }

    /// Full document text in the document's own EOL convention, trailing
    /// newline preserved as loaded.
    pub fn render(&self) -> String {
        let mut text = self.lines.join(self.line_ending.as_str());
        if self.trailing_newline {
            text.push_str(self.line_ending.as_str());
        }
        text
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.render())
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

fn detect_indent(lines: &[String]) -> IndentStyle {
    for line in lines {
        match line.as_bytes().first() {
            Some(b'\t') => return IndentStyle::Tabs,
            Some(b' ') => return IndentStyle::Spaces,
            _ => continue,
        }
    }
    IndentStyle::Spaces
}
