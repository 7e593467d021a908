//! The EVIDENTIA reconciler: the fixed-order reconciliation pipeline.
//!
//!   Sources → Merge → Score/Match → Classify → Audit → Aggregate
//!
//! A run is deterministic for a given input and configuration. The only
//! side effect is the audit trail: one `DecisionRecord` per planned step,
//! followed by a single `finalize` call. No summary is returned unless every
//! record was written.

use chrono::Utc;
use tracing::{debug, info, warn};

use evidentia_contracts::{
    config::MatchConfig,
    error::EvidentiaResult,
    evidence::TestEvidence,
    observation::SourceTimeline,
    plan::PlannedStep,
    result::WorkflowSummary,
    run::{DecisionRecord, RunId},
};

use crate::{
    aggregate::aggregate,
    classify::classify_all,
    matcher::match_steps,
    merge::merge_timelines,
    traits::{AuditWriter, SimilarityScorer},
};

/// Everything one reconciliation run consumes.
#[derive(Debug, Clone, Default)]
pub struct ReconcileInput {
    pub steps: Vec<PlannedStep>,
    pub sources: Vec<SourceTimeline>,
    pub evidence: TestEvidence,
}

/// Drives a reconciliation run.
///
/// The reconciler owns the trusted components (scorer and audit writer) and
/// a validated `MatchConfig`. One reconciler may serve many runs; each run is
/// identified by its own `RunId`.
pub struct Reconciler {
    scorer: Box<dyn SimilarityScorer>,
    audit: Box<dyn AuditWriter>,
    config: MatchConfig,
}

impl Reconciler {
    /// Build a reconciler. Fails with `ConfigError` when `config` is invalid.
    pub fn new(
        scorer: Box<dyn SimilarityScorer>,
        audit: Box<dyn AuditWriter>,
        config: MatchConfig,
    ) -> EvidentiaResult<Self> {
        config.validate()?;
        Ok(Self { scorer, audit, config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Reconcile a plan against its recorded evidence.
    ///
    /// # Errors
    ///
    /// Returns `AuditWriteFailed` (or whatever the audit writer reports) if
    /// any decision record cannot be written or the run cannot be finalized.
    /// Matching itself never fails: absent evidence yields deviations.
    pub fn run(&self, run_id: RunId, input: &ReconcileInput) -> EvidentiaResult<WorkflowSummary> {
        info!(
            run_id = %run_id,
            steps = input.steps.len(),
            sources = input.sources.len(),
            "reconciliation starting"
        );

        // ── Merge ────────────────────────────────────────────────────────────
        let timeline = merge_timelines(&input.sources, self.scorer.as_ref(), &self.config);
        if timeline.is_empty() && !input.steps.is_empty() {
            warn!(run_id = %run_id, "no observed actions; every step will be not visible");
        }

        // ── Match + classify ─────────────────────────────────────────────────
        let assertions = &input.evidence.assertions;
        let matched = match_steps(
            &input.steps,
            &timeline,
            assertions,
            self.scorer.as_ref(),
            &self.config,
        );
        let classified = classify_all(matched, assertions, self.scorer.as_ref(), &self.config);

        // ── Audit ────────────────────────────────────────────────────────────
        //
        // Every decision is on record before the summary leaves the engine.
        for result in &classified {
            let record = DecisionRecord {
                run_id,
                step_index: result.step.index,
                result: result.clone(),
                recorded_at: Utc::now(),
            };
            self.audit.write(&record)?;
            if result.is_observed() {
                debug!(run_id = %run_id, step = result.step.index, "decision recorded");
            } else {
                warn!(
                    run_id = %run_id,
                    step = result.step.index,
                    verdict = %result.verdict,
                    note = %result.note,
                    "deviation recorded"
                );
            }
        }
        self.audit.finalize(&run_id)?;

        // ── Aggregate ────────────────────────────────────────────────────────
        let summary = aggregate(classified, &input.evidence);

        info!(
            run_id = %run_id,
            observed = summary.observed_count,
            deviations = summary.deviation_count,
            test_outcome = %summary.cross_reference.test_outcome,
            "reconciliation complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use evidentia_contracts::{
        config::MatchConfig,
        error::EvidentiaError,
        evidence::{AssertionOutcome, AssertionRecord, TestEvidence, TestOutcome},
        observation::SourceTimeline,
        plan::PlannedStep,
        result::{DeviationKind, Verdict},
        run::RunId,
    };

    use crate::testing::{action, steps, BrokenAudit, RecordingAudit, TableScorer};

    use super::{ReconcileInput, Reconciler};

    fn scorer() -> TableScorer {
        TableScorer::new()
            .with("open search", "clicked search", 0.9)
            .with("type query", "typed text", 0.8)
            .with("apply filter", "opened filter panel", 0.38)
    }

    fn input() -> ReconcileInput {
        ReconcileInput {
            steps: steps(&["open search", "type query", "apply filter", "export csv"]),
            sources: vec![SourceTimeline::new(
                "cam-a",
                vec![
                    action(2.0, "clicked search"),
                    action(5.0, "typed text"),
                    action(9.0, "opened filter panel"),
                ],
            )],
            evidence: TestEvidence {
                test_outcome: TestOutcome::Failed,
                failure_messages: vec!["TimeoutError: export csv never appeared".to_string()],
                assertions: vec![AssertionRecord::new(
                    "download available",
                    AssertionOutcome::Failed,
                    "export csv never appeared",
                )],
            },
        }
    }

    #[test]
    fn run_produces_summary_and_audits_every_step() {
        let audit = RecordingAudit::default();
        let scorer = scorer().with("export csv", "export csv never appeared", 0.6);
        let reconciler =
            Reconciler::new(Box::new(scorer), Box::new(audit.clone()), MatchConfig::default())
                .unwrap();
        let run_id = RunId::new();

        let summary = reconciler.run(run_id, &input()).unwrap();

        let verdicts: Vec<Verdict> = summary.results.iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::Observed,
                Verdict::Observed,
                Verdict::Deviation(DeviationKind::Altered),
                Verdict::Deviation(DeviationKind::Skipped),
            ]
        );
        assert_eq!(summary.total_steps, 4);
        assert_eq!(summary.observed_count, 2);
        assert_eq!(summary.deviation_count, 2);
        assert_eq!(summary.cross_reference.test_outcome, TestOutcome::Failed);
        assert_eq!(
            summary.results[3].test_corroboration.as_deref(),
            Some("export csv never appeared")
        );

        let records = audit.records.lock().unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.run_id == run_id));
        let indices: Vec<usize> = records.iter().map(|r| r.step_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(*audit.finalized.lock().unwrap(), vec![run_id]);
    }

    #[test]
    fn runs_are_deterministic() {
        let reconciler = Reconciler::new(
            Box::new(scorer()),
            Box::new(RecordingAudit::default()),
            MatchConfig::default(),
        )
        .unwrap();

        let first = reconciler.run(RunId::new(), &input()).unwrap();
        let second = reconciler.run(RunId::new(), &input()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn no_sources_means_everything_not_visible() {
        let reconciler = Reconciler::new(
            Box::new(scorer()),
            Box::new(RecordingAudit::default()),
            MatchConfig::default(),
        )
        .unwrap();
        let input = ReconcileInput {
            steps: steps(&["a", "b"]),
            ..ReconcileInput::default()
        };

        let summary = reconciler.run(RunId::new(), &input).unwrap();

        assert_eq!(summary.count_of(DeviationKind::NotVisible), 2);
        assert_eq!(summary.cross_reference.test_outcome, TestOutcome::Unknown);
    }

    #[test]
    fn empty_plan_still_finalizes() {
        let audit = RecordingAudit::default();
        let reconciler =
            Reconciler::new(Box::new(scorer()), Box::new(audit.clone()), MatchConfig::default())
                .unwrap();

        let summary = reconciler.run(RunId::new(), &ReconcileInput::default()).unwrap();

        assert_eq!(summary.total_steps, 0);
        assert!(audit.records.lock().unwrap().is_empty());
        assert_eq!(audit.finalized.lock().unwrap().len(), 1);
    }

    #[test]
    fn audit_failure_aborts_run() {
        let reconciler =
            Reconciler::new(Box::new(scorer()), Box::new(BrokenAudit), MatchConfig::default())
                .unwrap();

        match reconciler.run(RunId::new(), &input()) {
            Err(EvidentiaError::AuditWriteFailed { reason }) => {
                assert!(reason.contains("disk full"), "unexpected reason: {reason}");
            }
            other => panic!("expected AuditWriteFailed, got {:?}", other),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MatchConfig {
            alter_threshold: 0.9,
            ..MatchConfig::default()
        };

        let result = Reconciler::new(
            Box::new(scorer()),
            Box::new(RecordingAudit::default()),
            config,
        );

        assert!(matches!(result, Err(EvidentiaError::ConfigError { .. })));
    }

    #[test]
    fn assertion_step_failure_flows_through_pipeline() {
        let reconciler = Reconciler::new(
            Box::new(TableScorer::new()),
            Box::new(RecordingAudit::default()),
            MatchConfig::default(),
        )
        .unwrap();
        let input = ReconcileInput {
            steps: vec![PlannedStep::assertion(1, "cart shows 2 items")],
            sources: vec![SourceTimeline::new(
                "cam-a",
                vec![action(3.0, "cart shows 2 items")],
            )],
            evidence: TestEvidence {
                test_outcome: TestOutcome::Failed,
                failure_messages: vec![],
                assertions: vec![AssertionRecord::new(
                    "cart shows 2 items",
                    AssertionOutcome::Failed,
                    "expected 2, found 1",
                )],
            },
        };

        let summary = reconciler.run(RunId::new(), &input).unwrap();

        let result = &summary.results[0];
        assert_eq!(result.verdict, Verdict::Deviation(DeviationKind::Altered));
        assert_eq!(result.test_corroboration.as_deref(), Some("expected 2, found 1"));
    }
}
