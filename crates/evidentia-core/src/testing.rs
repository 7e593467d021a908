//! Mock collaborators shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    observation::ObservedAction,
    plan::PlannedStep,
    run::{DecisionRecord, RunId},
};

use crate::traits::{AuditWriter, SimilarityScorer};

/// A scorer driven by a lookup table of `(a, b)` pairs. Unlisted pairs
/// score 1.0 when the strings are equal and 0.0 otherwise.
#[derive(Default)]
pub(crate) struct TableScorer {
    table: HashMap<(String, String), f64>,
}

impl TableScorer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, a: &str, b: &str, score: f64) -> Self {
        self.table.insert((a.to_string(), b.to_string()), score);
        self
    }
}

impl SimilarityScorer for TableScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if let Some(score) = self.table.get(&(a.to_string(), b.to_string())) {
            return *score;
        }
        if let Some(score) = self.table.get(&(b.to_string(), a.to_string())) {
            return *score;
        }
        if a == b {
            1.0
        } else {
            0.0
        }
    }
}

/// An audit writer that records every call for later inspection.
#[derive(Clone, Default)]
pub(crate) struct RecordingAudit {
    pub(crate) records: Arc<Mutex<Vec<DecisionRecord>>>,
    pub(crate) finalized: Arc<Mutex<Vec<RunId>>>,
}

impl AuditWriter for RecordingAudit {
    fn write(&self, record: &DecisionRecord) -> EvidentiaResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn finalize(&self, run_id: &RunId) -> EvidentiaResult<()> {
        self.finalized.lock().unwrap().push(*run_id);
        Ok(())
    }
}

/// An audit writer whose writes always fail.
pub(crate) struct BrokenAudit;

impl AuditWriter for BrokenAudit {
    fn write(&self, _record: &DecisionRecord) -> EvidentiaResult<()> {
        Err(EvidentiaError::AuditWriteFailed {
            reason: "disk full".to_string(),
        })
    }

    fn finalize(&self, _run_id: &RunId) -> EvidentiaResult<()> {
        Ok(())
    }
}

pub(crate) fn steps(texts: &[&str]) -> Vec<PlannedStep> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| PlannedStep::action(i + 1, *t))
        .collect()
}

pub(crate) fn action(ts: f64, text: &str) -> ObservedAction {
    ObservedAction::new(ts, text, "cam-a")
}
