//! Per-step match results and the workflow summary built from them.
//!
//! A `MatchResult` is created once per planned step by the matcher. Later
//! stages (classifier, aggregator) never patch a result in place; they build
//! a new one with struct-update syntax.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    evidence::TestOutcome,
    observation::ObservedAction,
    plan::PlannedStep,
};

/// How a planned step deviated from the recorded execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationKind {
    /// Candidates existed in the search window but none resembled the step.
    Skipped,
    /// A related but not faithful action occurred.
    Altered,
    /// The timeline has nothing at or after the expected window.
    NotVisible,
}

impl fmt::Display for DeviationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviationKind::Skipped => "skipped",
            DeviationKind::Altered => "altered",
            DeviationKind::NotVisible => "not visible",
        };
        f.write_str(s)
    }
}

/// The verdict for one planned step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Observed,
    Deviation(DeviationKind),
}

impl Verdict {
    pub fn is_observed(&self) -> bool {
        matches!(self, Verdict::Observed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Observed => f.write_str("observed"),
            Verdict::Deviation(kind) => write!(f, "deviation ({kind})"),
        }
    }
}

/// Machine-readable reason the matcher reached its verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum MatchCause {
    /// Best candidate met the accept threshold in order.
    Matched,
    /// Visually matched, but a near-identical assertion failed.
    AssertionFailed { message: String },
    /// Best candidate met the accept threshold but precedes the previous
    /// accepted match (inside the backward slack).
    OutOfOrder { previous_timestamp: f64 },
    /// Best candidate scored between the alter and accept thresholds.
    BelowAcceptThreshold,
    /// Best candidate scored under the alter threshold.
    BelowAlterThreshold,
    /// No unconsumed timeline entry at or after the search window.
    TimelineExhausted,
}

/// The classification of one planned step against the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub step: PlannedStep,
    pub verdict: Verdict,
    /// Best available evidence: the accepted action, the closest candidate,
    /// or a diagnostic full-timeline match when the window was empty.
    pub matched_action: Option<ObservedAction>,
    /// Similarity of `matched_action` to the step; 0.0 when there is none.
    pub similarity: f64,
    pub cause: MatchCause,
    /// Failing assertion message that independently corroborates a deviation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_corroboration: Option<String>,
    /// Human-readable explanation written by the deviation classifier.
    #[serde(default)]
    pub note: String,
}

impl MatchResult {
    pub fn is_observed(&self) -> bool {
        self.verdict.is_observed()
    }

    /// `None` for observed steps.
    pub fn deviation_kind(&self) -> Option<DeviationKind> {
        match self.verdict {
            Verdict::Observed => None,
            Verdict::Deviation(kind) => Some(kind),
        }
    }
}

/// Test-result evidence attached verbatim to the summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub test_outcome: TestOutcome,
    pub failure_messages: Vec<String>,
}

/// The reconciled view of one run, consumed by the report renderer.
///
/// Counts are derived from `results` by the aggregator and never edited by
/// hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub total_steps: usize,
    pub observed_count: usize,
    pub deviation_count: usize,
    pub results: Vec<MatchResult>,
    pub cross_reference: CrossReference,
}

impl WorkflowSummary {
    pub fn count_of(&self, kind: DeviationKind) -> usize {
        self.results
            .iter()
            .filter(|r| r.deviation_kind() == Some(kind))
            .count()
    }

    /// Deviations that a failing assertion independently confirms.
    pub fn corroborated_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.is_observed() && r.test_corroboration.is_some())
            .count()
    }

    pub fn deviations(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| !r.is_observed())
    }
}
