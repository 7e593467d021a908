//! Wires the EVIDENTIA components into one run.

use evidentia_audit::{AuditLog, InMemoryAuditWriter};
use evidentia_contracts::{
    config::MatchConfig,
    error::EvidentiaResult,
    result::WorkflowSummary,
    run::RunId,
};
use evidentia_core::{ReconcileInput, Reconciler};
use evidentia_similarity::TokenSimilarity;

/// The summary of a run plus its sealed audit trail.
pub struct RunOutcome {
    pub summary: WorkflowSummary,
    pub audit: AuditLog,
}

/// Reconcile `input` with the default scorer and an in-memory audit chain.
pub fn reconcile(input: &ReconcileInput, config: MatchConfig) -> EvidentiaResult<RunOutcome> {
    let run_id = RunId::new();
    let audit = InMemoryAuditWriter::new(run_id);

    let reconciler = Reconciler::new(
        Box::new(TokenSimilarity::new()),
        Box::new(audit.clone()),
        config,
    )?;
    let summary = reconciler.run(run_id, input)?;

    Ok(RunOutcome {
        summary,
        audit: audit.export_log()?,
    })
}
