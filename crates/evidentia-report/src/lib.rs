//! # evidentia-report
//!
//! Human-readable deviation reports for a `WorkflowSummary`.
//!
//! ```rust,ignore
//! use evidentia_report::{render, ReportFormat};
//!
//! let markdown = render(&summary, ReportFormat::Markdown, chrono::Utc::now())?;
//! ```
//!
//! Both formats carry the same sections: summary counts, the test output
//! cross-reference, a per-step results table, and a detail block for every
//! deviation. Rendering never reorders or recounts steps; it shows exactly
//! what the summary holds.

pub mod format;
mod html;
mod markdown;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    result::WorkflowSummary,
};

pub use format::ReportFormat;

/// Render `summary` in the requested format.
///
/// `generated_at` is supplied by the caller so output stays reproducible.
pub fn render(
    summary: &WorkflowSummary,
    format: ReportFormat,
    generated_at: DateTime<Utc>,
) -> EvidentiaResult<String> {
    let rendered = match format {
        ReportFormat::Markdown => markdown::render(summary, generated_at),
        ReportFormat::Html => html::render(summary, generated_at),
    };
    rendered.map_err(|e| EvidentiaError::ReportFailed {
        reason: format!("failed to render {format} report: {e}"),
    })
}

/// Write a rendered report to `path`, creating parent directories.
pub fn save_report(content: &str, path: &Path) -> EvidentiaResult<()> {
    let io_err = |e: std::io::Error| EvidentiaError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)?;
    info!(path = %path.display(), bytes = content.len(), "report written");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use evidentia_contracts::{
        error::EvidentiaError,
        evidence::TestOutcome,
        observation::ObservedAction,
        plan::PlannedStep,
        result::{CrossReference, DeviationKind, MatchCause, MatchResult, Verdict, WorkflowSummary},
    };

    use crate::format::{escape_html, truncate};
    use crate::{render, save_report, ReportFormat};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn generated_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn observed(index: usize, text: &str) -> MatchResult {
        MatchResult {
            step: PlannedStep::action(index, text),
            verdict: Verdict::Observed,
            matched_action: Some(ObservedAction::new(5.0, text, "screen")),
            similarity: 0.9,
            cause: MatchCause::Matched,
            test_corroboration: None,
            note: "observed at 00:05 (score 0.90)".to_string(),
        }
    }

    fn altered(index: usize, text: &str) -> MatchResult {
        MatchResult {
            step: PlannedStep::action(index, text),
            verdict: Verdict::Deviation(DeviationKind::Altered),
            matched_action: Some(ObservedAction::new(9.0, "opened filter panel", "screen")),
            similarity: 0.38,
            cause: MatchCause::BelowAcceptThreshold,
            test_corroboration: Some("filter not applied".to_string()),
            note: "altered: closest match 'opened filter panel' at 00:09 (score 0.38)".to_string(),
        }
    }

    fn summary(results: Vec<MatchResult>, failures: Vec<&str>) -> WorkflowSummary {
        let observed_count = results.iter().filter(|r| r.is_observed()).count();
        WorkflowSummary {
            total_steps: results.len(),
            observed_count,
            deviation_count: results.len() - observed_count,
            results,
            cross_reference: CrossReference {
                test_outcome: TestOutcome::Failed,
                failure_messages: failures.into_iter().map(str::to_string).collect(),
            },
        }
    }

    // ── Helpers under test ────────────────────────────────────────────────────

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 60), "short");
        let long = "x".repeat(61);
        let cut = truncate(&long, 60);
        assert_eq!(cut.chars().count(), 60);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate(&"é".repeat(70), 60).chars().count(), 60);
    }

    #[test]
    fn escape_html_covers_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&lt;/a&gt;"
        );
    }

    #[test]
    fn format_parses_aliases() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert!(matches!(
            "pdf".parse::<ReportFormat>(),
            Err(EvidentiaError::ReportFailed { .. })
        ));
    }

    // ── Markdown ──────────────────────────────────────────────────────────────

    #[test]
    fn markdown_has_all_sections() {
        let s = summary(
            vec![observed(1, "Click search"), altered(2, "Apply filter")],
            vec!["AssertionError: filter not applied"],
        );

        let md = render(&s, ReportFormat::Markdown, generated_at()).unwrap();

        assert!(md.starts_with("# Deviation Report\n"));
        assert!(md.contains("Generated: 2026-03-14 09:30:00 UTC"));
        assert!(md.contains("- **Total Steps:** 2"));
        assert!(md.contains("- **Observed:** 1"));
        assert!(md.contains("- **Deviations:** 1"));
        assert!(md.contains("  - altered: 1"));
        assert!(md.contains("- **Corroborated by test failures:** 1"));
        assert!(md.contains("- **Test Outcome:** failed"));
        assert!(md.contains("  - AssertionError: filter not applied"));
        assert!(md.contains("| 1 | Click search | ☑ Observed | observed at 00:05 (score 0.90) |"));
        assert!(md.contains("| 2 | Apply filter | ✗ Deviation (altered) |"));
        assert!(md.contains("### Deviation 1: altered (step 2)"));
        assert!(md.contains("**Closest Match:** opened filter panel at 00:09"));
        assert!(md.contains("**Similarity Score:** 0.38"));
        assert!(md.contains("**Test Failure:** filter not applied"));
    }

    #[test]
    fn markdown_truncates_long_text() {
        let long_step = "Navigate to the account settings page and open the notification preferences tab";
        let long_failure = "E".repeat(150);
        let s = summary(vec![observed(1, long_step)], vec![long_failure.as_str()]);

        let md = render(&s, ReportFormat::Markdown, generated_at()).unwrap();

        let table_cell = format!("| 1 | {} |", truncate(long_step, 60));
        assert!(md.contains(&table_cell));
        assert!(md.contains(&format!("  - {}\n", "E".repeat(100))));
        assert!(!md.contains(&"E".repeat(101)));
    }

    #[test]
    fn markdown_escapes_table_pipes() {
        let s = summary(vec![observed(1, "choose A | B")], vec![]);

        let md = render(&s, ReportFormat::Markdown, generated_at()).unwrap();

        assert!(md.contains("choose A \\| B"));
    }

    #[test]
    fn markdown_without_deviations_has_no_detail_section() {
        let s = summary(vec![observed(1, "Click search")], vec![]);

        let md = render(&s, ReportFormat::Markdown, generated_at()).unwrap();

        assert!(!md.contains("## Deviations Detail"));
        assert!(!md.contains("- **Failures:**"));
    }

    #[test]
    fn empty_summary_renders() {
        let md = render(&WorkflowSummary::default(), ReportFormat::Markdown, generated_at()).unwrap();
        assert!(md.contains("- **Total Steps:** 0"));
        assert!(md.contains("- **Test Outcome:** unknown"));
    }

    // ── HTML ──────────────────────────────────────────────────────────────────

    #[test]
    fn html_escapes_user_text() {
        let s = summary(
            vec![altered(1, "Click <Save> & \"continue\"")],
            vec!["<script>alert(1)</script>"],
        );

        let html = render(&s, ReportFormat::Html, generated_at()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("Click &lt;Save&gt; &amp; &quot;continue&quot;"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<tr class=\"deviation\">"));
        assert!(html.contains("<h3>Deviation 1: altered (step 1)</h3>"));
    }

    #[test]
    fn html_marks_observed_rows() {
        let s = summary(vec![observed(1, "Click search")], vec![]);

        let html = render(&s, ReportFormat::Html, generated_at()).unwrap();

        assert!(html.contains("<tr class=\"observed\">"));
        assert!(html.contains("<td>☑ Observed</td>"));
        assert!(!html.contains("Deviations Detail"));
    }

    // ── Saving ────────────────────────────────────────────────────────────────

    #[test]
    fn save_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.md");

        save_report("# Deviation Report\n", &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Deviation Report\n");
    }
}
