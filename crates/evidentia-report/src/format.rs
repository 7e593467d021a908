//! Report formats and the text helpers shared by the renderers.

use std::fmt;
use std::str::FromStr;

use evidentia_contracts::{
    error::EvidentiaError,
    result::{MatchResult, Verdict},
};

/// Longest step description shown in the results table.
pub const DESCRIPTION_WIDTH: usize = 60;
/// Longest test failure message shown in the cross-reference.
pub const FAILURE_WIDTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Markdown,
    Html,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Markdown => f.write_str("markdown"),
            ReportFormat::Html => f.write_str("html"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = EvidentiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" | "htm" => Ok(ReportFormat::Html),
            other => Err(EvidentiaError::ReportFailed {
                reason: format!("unsupported report format '{other}'"),
            }),
        }
    }
}

/// Cut `text` to at most `width` characters, ending in `...` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Cut `text` to at most `width` characters without a marker.
pub fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// The text a report shows for a step.
pub fn step_label(result: &MatchResult) -> &str {
    if result.step.description.trim().is_empty() {
        result.step.match_text()
    } else {
        &result.step.description
    }
}

/// `☑ Observed` or `✗ Deviation (kind)`.
pub fn verdict_label(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Observed => "☑ Observed".to_string(),
        Verdict::Deviation(kind) => format!("✗ Deviation ({kind})"),
    }
}

pub(crate) fn note_or_dash(result: &MatchResult) -> &str {
    if result.note.trim().is_empty() {
        "-"
    } else {
        &result.note
    }
}
