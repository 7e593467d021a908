//! Core trait definitions for the EVIDENTIA pipeline.
//!
//! Two seams separate the engine from its collaborators:
//!
//! - `SimilarityScorer`: pure text comparison, swappable for calibration
//! - `AuditWriter`:      trusted sink recording every classification decision
//!
//! The `Reconciler` wires them together with the merger, matcher,
//! classifier and aggregator in a fixed order.

use evidentia_contracts::{
    error::EvidentiaResult,
    run::{DecisionRecord, RunId},
};

/// Computes a normalized similarity between two descriptions.
///
/// Implementations MUST be deterministic and pure: the same pair always
/// yields the same score, with no I/O and no randomness. Scores are expected
/// in [0, 1]; the engine clamps anything outside that range (NaN becomes 0).
pub trait SimilarityScorer: Send + Sync {
    /// Score `a` (typically the planned step) against `b` (the observation).
    ///
    /// Must return 0.0 when either input is empty after normalization.
    fn score(&self, a: &str, b: &str) -> f64;
}

/// The audit writer: the immutable record of a reconciliation run.
///
/// Every planned step produces exactly one `DecisionRecord`. A failed write
/// is fatal for the run and surfaces as `EvidentiaError::AuditWriteFailed`.
pub trait AuditWriter: Send + Sync {
    /// Append one decision record. Append-only; records are never modified.
    fn write(&self, record: &DecisionRecord) -> EvidentiaResult<()>;

    /// Mark a run as complete. Implementations may flush or seal here.
    fn finalize(&self, run_id: &RunId) -> EvidentiaResult<()>;
}

/// Clamp a raw scorer output into [0, 1].
pub(crate) fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}
