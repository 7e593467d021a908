//! Run identity and the per-decision audit record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::MatchResult;

/// Unique identifier for a single reconciliation run.
///
/// Appears on every `DecisionRecord` written during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An immutable record of one classification decision, written to the audit
/// trail. Exactly one per planned step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub run_id: RunId,
    /// The planned step's 1-based index.
    pub step_index: usize,
    /// The final, annotated result for the step.
    pub result: MatchResult,
    /// Wall-clock time the record was created (UTC).
    pub recorded_at: DateTime<Utc>,
}
