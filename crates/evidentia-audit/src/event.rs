//! Audit event and log types.
//!
//! `AuditEvent` wraps a `DecisionRecord` with its chain position and the
//! hashes that make tampering detectable. `AuditLog` is the sealed record of
//! one reconciliation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evidentia_contracts::run::{DecisionRecord, RunId};

/// A single entry in the hash chain for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub run_id: RunId,

    /// The classification decision for one planned step.
    pub record: DecisionRecord,

    /// Hash of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash over (run_id, sequence, prev_hash, record).
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed audit log for a single run.
///
/// `terminal_hash` is the `this_hash` of the last event and commits to the
/// whole log. It is empty when the run had no steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub run_id: RunId,
    pub events: Vec<AuditEvent>,
    /// `true` once the reconciler called `finalize` for this run.
    pub finalized: bool,
    pub exported_at: DateTime<Utc>,
    pub terminal_hash: String,
}
