//! Markdown heading recognition.
//!
//! A heading is a line that begins with 1–6 `#` characters followed by a
//! space. Fenced code blocks are not special-cased: a `# comment` line inside
//! a fence is a heading as far as the document is concerned.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6}) (.*)$").expect("heading pattern is valid")
});

/// A heading found in the shared document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Depth, 1..=6
    pub level: u8,
    /// Heading text with surrounding whitespace trimmed
    pub text: String,
}

impl Heading {
    /// Parse a single line (without its trailing newline).
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let caps = HEADING_LINE.captures(line)?;
        Some(Self {
            level: caps[1].len() as u8,
            text: caps[2].trim().to_string(),
        })
    }

    /// Render as a markdown line (no trailing newline).
    pub fn to_markdown(&self) -> String {
        format!("{} {}", "#".repeat(self.level as usize), self.text)
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_markdown())
    }
}

/// A line of the document together with its byte span.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineSpan<'a> {
    /// Line text without the newline
    pub text: &'a str,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset just past the newline (or end of document)
    pub next: usize,
    /// Whether the line is terminated by `\n`
    pub terminated: bool,
}

/// Iterate over the lines of `doc` with byte offsets.
pub(crate) fn line_spans(doc: &str) -> impl Iterator<Item = LineSpan<'_>> {
    let mut offset = 0;
    doc.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let terminated = raw.ends_with('\n');
        LineSpan {
            text: raw.strip_suffix('\n').unwrap_or(raw),
            start,
            next: offset,
            terminated,
        }
    })
}
