//! HTML renderer. All user-supplied text is escaped.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use evidentia_contracts::{observation::format_offset, result::WorkflowSummary};

use crate::format::{
    clip, escape_html, note_or_dash, step_label, truncate, verdict_label, DESCRIPTION_WIDTH,
    FAILURE_WIDTH,
};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
.observed { color: green; }
.deviation { color: red; }";

pub(crate) fn render(
    summary: &WorkflowSummary,
    generated_at: DateTime<Utc>,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"UTF-8\">")?;
    writeln!(out, "<title>Deviation Report</title>")?;
    writeln!(out, "<style>\n{STYLE}\n</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>Deviation Report</h1>")?;
    writeln!(
        out,
        "<p>Generated: {}</p>",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    // ── Summary ──────────────────────────────────────────────────────────────
    writeln!(out, "<h2>Summary</h2>")?;
    writeln!(out, "<ul>")?;
    writeln!(out, "<li><strong>Total Steps:</strong> {}</li>", summary.total_steps)?;
    writeln!(out, "<li><strong>Observed:</strong> {}</li>", summary.observed_count)?;
    writeln!(out, "<li><strong>Deviations:</strong> {}</li>", summary.deviation_count)?;
    writeln!(
        out,
        "<li><strong>Corroborated by test failures:</strong> {}</li>",
        summary.corroborated_count()
    )?;
    writeln!(out, "</ul>")?;

    // ── Cross-reference ──────────────────────────────────────────────────────
    let xref = &summary.cross_reference;
    writeln!(out, "<h2>Test Output Cross-Reference</h2>")?;
    writeln!(out, "<ul>")?;
    writeln!(out, "<li><strong>Test Outcome:</strong> {}</li>", xref.test_outcome)?;
    if !xref.failure_messages.is_empty() {
        writeln!(
            out,
            "<li><strong>Failures:</strong> {}<ul>",
            xref.failure_messages.len()
        )?;
        for message in &xref.failure_messages {
            writeln!(out, "<li>{}</li>", escape_html(&clip(message, FAILURE_WIDTH)))?;
        }
        writeln!(out, "</ul></li>")?;
    }
    writeln!(out, "</ul>")?;

    // ── Detailed results ─────────────────────────────────────────────────────
    writeln!(out, "<h2>Detailed Results</h2>")?;
    writeln!(out, "<table>")?;
    writeln!(
        out,
        "<tr><th>#</th><th>Step Description</th><th>Result</th><th>Notes</th></tr>"
    )?;
    for result in &summary.results {
        let class = if result.is_observed() { "observed" } else { "deviation" };
        writeln!(out, "<tr class=\"{class}\">")?;
        writeln!(out, "<td>{}</td>", result.step.index)?;
        writeln!(
            out,
            "<td>{}</td>",
            escape_html(&truncate(step_label(result), DESCRIPTION_WIDTH))
        )?;
        writeln!(out, "<td>{}</td>", verdict_label(&result.verdict))?;
        writeln!(out, "<td>{}</td>", escape_html(note_or_dash(result)))?;
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;

    // ── Deviations detail ────────────────────────────────────────────────────
    let deviations: Vec<_> = summary.deviations().collect();
    if !deviations.is_empty() {
        writeln!(out, "<h2>Deviations Detail</h2>")?;
        for (n, result) in deviations.iter().enumerate() {
            let kind = result
                .deviation_kind()
                .map(|k| k.to_string())
                .unwrap_or_default();
            writeln!(
                out,
                "<h3>Deviation {}: {} (step {})</h3>",
                n + 1,
                kind,
                result.step.index
            )?;
            writeln!(out, "<dl>")?;
            writeln!(
                out,
                "<dt>Planned Action</dt><dd>{}</dd>",
                escape_html(step_label(result))
            )?;
            if let Some(action) = &result.matched_action {
                writeln!(
                    out,
                    "<dt>Closest Match</dt><dd>{} at {}</dd>",
                    escape_html(&action.description),
                    format_offset(action.timestamp)
                )?;
                writeln!(
                    out,
                    "<dt>Similarity Score</dt><dd>{:.2}</dd>",
                    result.similarity
                )?;
            }
            if let Some(failure) = &result.test_corroboration {
                writeln!(out, "<dt>Test Failure</dt><dd>{}</dd>", escape_html(failure))?;
            }
            writeln!(out, "</dl>")?;
        }
    }

    writeln!(out, "</body>")?;
    write!(out, "</html>")?;

    Ok(out)
}
