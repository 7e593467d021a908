//! Step matcher: assigns each planned step a verdict against the timeline.
//!
//! Scoring and acceptance are split in two phases:
//!
//! 1. **Score** every (step, entry) pair into a `ScoreMatrix`. Pure and
//!    order-independent.
//! 2. **Fold** the steps sequentially in plan order. Each step sees only
//!    unconsumed entries at or after `last_accepted - backward_slack`; an
//!    accepted match consumes its entry and moves `last_accepted` forward.
//!
//! Verdicts, with the configured thresholds:
//!
//! - no candidate in the window            → `Deviation(NotVisible)`
//! - best < alter                          → `Deviation(Skipped)`
//! - alter ≤ best < accept                 → `Deviation(Altered)`
//! - best ≥ accept, before last accepted   → `Deviation(Altered)`, out of order,
//!   unless an entry at or after it also clears accept
//! - best ≥ accept, assertion step failed  → `Deviation(Altered)`
//! - best ≥ accept                         → `Observed`

use tracing::{debug, warn};

use evidentia_contracts::{
    config::MatchConfig,
    evidence::AssertionRecord,
    plan::PlannedStep,
    observation::Timeline,
    result::{DeviationKind, MatchCause, MatchResult, Verdict},
};

use crate::{
    classify::assertion_override,
    traits::{clamp_score, SimilarityScorer},
};

/// Similarity of every planned step against every timeline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: Vec<Vec<f64>>,
}

impl ScoreMatrix {
    /// Score each step's match text against each entry's primary description.
    pub fn compute(steps: &[PlannedStep], timeline: &Timeline, scorer: &dyn SimilarityScorer) -> Self {
        let rows = steps
            .iter()
            .map(|step| {
                timeline
                    .actions()
                    .map(|action| clamp_score(scorer.score(step.match_text(), &action.description)))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn row(&self, step: usize) -> &[f64] {
        self.rows.get(step).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Sequential search state carried from one step to the next.
struct Cursor {
    last_accepted: Option<f64>,
    consumed: Vec<bool>,
}

impl Cursor {
    fn new(entries: usize) -> Self {
        Self {
            last_accepted: None,
            consumed: vec![false; entries],
        }
    }

    fn is_candidate(&self, idx: usize, timestamp: f64, slack: f64) -> bool {
        if self.consumed[idx] {
            return false;
        }
        match self.last_accepted {
            Some(last) => timestamp >= last - slack,
            None => true,
        }
    }

    fn is_forward(&self, timestamp: f64) -> bool {
        self.last_accepted.map_or(true, |last| timestamp >= last)
    }

    fn accept(&mut self, idx: usize, timestamp: f64) {
        self.consumed[idx] = true;
        self.last_accepted = Some(self.last_accepted.map_or(timestamp, |t| t.max(timestamp)));
    }
}

/// Highest-scoring entry among those `filter` admits; ties go to the
/// earliest entry.
fn best_in(row: &[f64], mut filter: impl FnMut(usize) -> bool) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in row.iter().enumerate() {
        if !filter(idx) {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    best
}

/// Match every planned step against the merged timeline.
///
/// Returns exactly one `MatchResult` per step, in plan order. `assertions`
/// is consulted only for assertion steps that were visually matched. Notes
/// are left empty for the deviation classifier to fill in.
pub fn match_steps(
    steps: &[PlannedStep],
    timeline: &Timeline,
    assertions: &[AssertionRecord],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Vec<MatchResult> {
    let scores = ScoreMatrix::compute(steps, timeline, scorer);
    let mut cursor = Cursor::new(timeline.len());
    let mut results = Vec::with_capacity(steps.len());

    for (row, step) in steps.iter().enumerate() {
        let result = match_one(
            step,
            scores.row(row),
            timeline,
            &mut cursor,
            assertions,
            scorer,
            config,
        );
        debug!(
            step = step.index,
            verdict = %result.verdict,
            similarity = result.similarity,
            "step classified"
        );
        results.push(result);
    }

    results
}

fn match_one(
    step: &PlannedStep,
    row: &[f64],
    timeline: &Timeline,
    cursor: &mut Cursor,
    assertions: &[AssertionRecord],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> MatchResult {
    let entries = timeline.entries();
    let candidate =
        |idx: usize| cursor.is_candidate(idx, entries[idx].timestamp(), config.backward_slack_secs);
    // An acceptable entry at or after the last accepted one wins over any
    // slack-zone entry, however close the slack-zone score is.
    let forward = best_in(row, |idx| candidate(idx) && cursor.is_forward(entries[idx].timestamp()))
        .filter(|&(_, s)| s >= config.accept_threshold);
    let in_window = forward.or_else(|| best_in(row, candidate));

    let Some((idx, score)) = in_window else {
        // Nothing left at or after the window. Look at the whole timeline
        // once, for diagnostics only; the cursor does not move.
        let diagnostic = best_in(row, |_| true).filter(|&(_, s)| s > 0.0);
        return MatchResult {
            step: step.clone(),
            verdict: Verdict::Deviation(DeviationKind::NotVisible),
            matched_action: diagnostic.map(|(i, _)| entries[i].action.clone()),
            similarity: diagnostic.map_or(0.0, |(_, s)| s),
            cause: MatchCause::TimelineExhausted,
            test_corroboration: None,
            note: String::new(),
        };
    };

    let entry = &entries[idx];
    let evidence = (score > 0.0).then(|| entry.action.clone());

    let (verdict, cause) = if score >= config.accept_threshold {
        match cursor.last_accepted {
            Some(previous) if entry.timestamp() < previous => (
                Verdict::Deviation(DeviationKind::Altered),
                MatchCause::OutOfOrder {
                    previous_timestamp: previous,
                },
            ),
            _ => {
                cursor.accept(idx, entry.timestamp());
                let failed = if step.is_assertion {
                    assertion_override(step, assertions, scorer, config)
                } else {
                    None
                };
                match failed {
                    Some(record) => {
                        warn!(
                            step = step.index,
                            assertion = %record.description,
                            "assertion step visually present but assertion failed"
                        );
                        (
                            Verdict::Deviation(DeviationKind::Altered),
                            MatchCause::AssertionFailed {
                                message: record.message.clone(),
                            },
                        )
                    }
                    None => (Verdict::Observed, MatchCause::Matched),
                }
            }
        }
    } else if score >= config.alter_threshold {
        (
            Verdict::Deviation(DeviationKind::Altered),
            MatchCause::BelowAcceptThreshold,
        )
    } else {
        (
            Verdict::Deviation(DeviationKind::Skipped),
            MatchCause::BelowAlterThreshold,
        )
    };

    MatchResult {
        step: step.clone(),
        verdict,
        similarity: if evidence.is_some() { score } else { 0.0 },
        matched_action: evidence,
        cause,
        test_corroboration: None,
        note: String::new(),
    }
}
