//! Markdown renderer.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use evidentia_contracts::{
    observation::format_offset,
    result::{DeviationKind, WorkflowSummary},
};

use crate::format::{
    clip, note_or_dash, step_label, truncate, verdict_label, DESCRIPTION_WIDTH, FAILURE_WIDTH,
};

/// Pipes would split a table cell; newlines would end the row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

pub(crate) fn render(
    summary: &WorkflowSummary,
    generated_at: DateTime<Utc>,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# Deviation Report")?;
    writeln!(out)?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out)?;

    // ── Summary ──────────────────────────────────────────────────────────────
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "- **Total Steps:** {}", summary.total_steps)?;
    writeln!(out, "- **Observed:** {}", summary.observed_count)?;
    writeln!(out, "- **Deviations:** {}", summary.deviation_count)?;
    for kind in [DeviationKind::Skipped, DeviationKind::Altered, DeviationKind::NotVisible] {
        let count = summary.count_of(kind);
        if count > 0 {
            writeln!(out, "  - {kind}: {count}")?;
        }
    }
    writeln!(
        out,
        "- **Corroborated by test failures:** {}",
        summary.corroborated_count()
    )?;
    writeln!(out)?;

    // ── Cross-reference ──────────────────────────────────────────────────────
    let xref = &summary.cross_reference;
    writeln!(out, "## Test Output Cross-Reference")?;
    writeln!(out)?;
    writeln!(out, "- **Test Outcome:** {}", xref.test_outcome)?;
    if !xref.failure_messages.is_empty() {
        writeln!(out, "- **Failures:** {}", xref.failure_messages.len())?;
        for message in &xref.failure_messages {
            writeln!(out, "  - {}", clip(message, FAILURE_WIDTH))?;
        }
    }
    writeln!(out)?;

    // ── Detailed results ─────────────────────────────────────────────────────
    writeln!(out, "## Detailed Results")?;
    writeln!(out)?;
    writeln!(out, "| # | Step Description | Result | Notes |")?;
    writeln!(out, "|---|------------------|--------|-------|")?;
    for result in &summary.results {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            result.step.index,
            cell(&truncate(step_label(result), DESCRIPTION_WIDTH)),
            verdict_label(&result.verdict),
            cell(note_or_dash(result)),
        )?;
    }
    writeln!(out)?;

    // ── Deviations detail ────────────────────────────────────────────────────
    let deviations: Vec<_> = summary.deviations().collect();
    if !deviations.is_empty() {
        writeln!(out, "## Deviations Detail")?;
        writeln!(out)?;
        for (n, result) in deviations.iter().enumerate() {
            let kind = result
                .deviation_kind()
                .map(|k| k.to_string())
                .unwrap_or_default();
            writeln!(out, "### Deviation {}: {} (step {})", n + 1, kind, result.step.index)?;
            writeln!(out)?;
            writeln!(out, "**Planned Action:** {}", step_label(result))?;
            writeln!(out)?;
            if let Some(action) = &result.matched_action {
                writeln!(
                    out,
                    "**Closest Match:** {} at {}",
                    action.description,
                    format_offset(action.timestamp)
                )?;
                writeln!(out)?;
                writeln!(out, "**Similarity Score:** {:.2}", result.similarity)?;
                writeln!(out)?;
            }
            if let Some(failure) = &result.test_corroboration {
                writeln!(out, "**Test Failure:** {}", failure)?;
                writeln!(out)?;
            }
        }
    }

    Ok(out)
}
