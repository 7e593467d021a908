//! Deviation classifier: attaches test-output corroboration and a human
//! readable note to every matched step.
//!
//! The matcher decides the verdict. This module never changes it, except
//! through `assertion_override`, which the matcher calls for assertion steps
//! that were visually accepted.

use evidentia_contracts::{
    config::MatchConfig,
    evidence::AssertionRecord,
    observation::format_offset,
    plan::PlannedStep,
    result::{MatchCause, MatchResult, Verdict},
};

use crate::traits::{clamp_score, SimilarityScorer};

/// The failing assertion that corresponds to `step`, if any.
///
/// An assertion corresponds when its description scores at or above
/// `assertion_match` against the step's description or summary. The best
/// scoring record wins; ties go to the earlier record.
pub fn assertion_override<'a>(
    step: &PlannedStep,
    assertions: &'a [AssertionRecord],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Option<&'a AssertionRecord> {
    let mut best: Option<(&AssertionRecord, f64)> = None;
    for record in assertions.iter().filter(|a| a.is_failed()) {
        let score = best_against_step(step, &record.description, scorer);
        if score < config.assertion_match {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((record, score));
        }
    }
    best.map(|(record, _)| record)
}

/// Best score of `text` against either the step description or summary.
fn best_against_step(step: &PlannedStep, text: &str, scorer: &dyn SimilarityScorer) -> f64 {
    let by_description = clamp_score(scorer.score(&step.description, text));
    let by_summary = clamp_score(scorer.score(&step.summary, text));
    by_description.max(by_summary)
}

/// A failure message from the test run that relates to this step.
///
/// A failed assertion relates when either its message or its description
/// scores at or above `corroboration_threshold` against the step. The
/// message is reported, falling back to the description when blank.
fn corroborating_failure(
    step: &PlannedStep,
    assertions: &[AssertionRecord],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Option<String> {
    let mut best: Option<(&AssertionRecord, f64)> = None;
    for record in assertions.iter().filter(|a| a.is_failed()) {
        let by_message = best_against_step(step, &record.message, scorer);
        let by_description = best_against_step(step, &record.description, scorer);
        let score = by_message.max(by_description);
        if score < config.corroboration_threshold {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((record, score));
        }
    }
    best.map(|(record, _)| {
        if record.message.trim().is_empty() {
            record.description.clone()
        } else {
            record.message.clone()
        }
    })
}

/// Fill in `test_corroboration` and `note` for one match result.
pub fn annotate(
    result: MatchResult,
    assertions: &[AssertionRecord],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> MatchResult {
    let kind = match result.verdict {
        Verdict::Observed => {
            let note = match &result.matched_action {
                Some(action) => format!(
                    "observed at {} (score {:.2})",
                    format_offset(action.timestamp),
                    result.similarity
                ),
                None => "observed".to_string(),
            };
            return MatchResult { note, ..result };
        }
        Verdict::Deviation(kind) => kind,
    };

    let corroboration = match &result.cause {
        MatchCause::AssertionFailed { message } if !message.trim().is_empty() => {
            Some(message.clone())
        }
        _ => corroborating_failure(&result.step, assertions, scorer, config),
    };

    let mut note = match (&result.cause, &result.matched_action) {
        (MatchCause::OutOfOrder { previous_timestamp }, Some(action)) => format!(
            "{kind}: '{}' seen at {}, before the previous accepted step at {}",
            action.description,
            format_offset(action.timestamp),
            format_offset(*previous_timestamp)
        ),
        (MatchCause::AssertionFailed { .. }, Some(action)) => format!(
            "{kind}: visible at {} but the test assertion failed",
            format_offset(action.timestamp)
        ),
        (MatchCause::TimelineExhausted, Some(action)) => format!(
            "{kind}: recording ended; nearest earlier action '{}' at {} (score {:.2})",
            action.description,
            format_offset(action.timestamp),
            result.similarity
        ),
        (MatchCause::TimelineExhausted, None) => {
            format!("{kind}: recording ended before this step")
        }
        (_, Some(action)) => format!(
            "{kind}: closest match '{}' at {} (score {:.2})",
            action.description,
            format_offset(action.timestamp),
            result.similarity
        ),
        (_, None) => format!("{kind}: no candidate found"),
    };

    if let Some(message) = &corroboration {
        note.push_str(&format!("; corroborated by test failure: {message}"));
    }

    MatchResult {
        test_corroboration: corroboration,
        note,
        ..result
    }
}

/// Annotate every result, preserving order.
pub fn classify_all(
    results: Vec<MatchResult>,
    assertions: &[AssertionRecord],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Vec<MatchResult> {
    results
        .into_iter()
        .map(|r| annotate(r, assertions, scorer, config))
        .collect()
}
