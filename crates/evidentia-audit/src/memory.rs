//! In-memory implementation of `AuditWriter`.
//!
//! `InMemoryAuditWriter` keeps the chain in a `Vec` behind `Arc<Mutex<_>>`.
//! Clones share the same chain, so a caller can hand one clone to the
//! `Reconciler` and keep another to export the sealed log afterwards.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    run::{DecisionRecord, RunId},
};
use evidentia_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    pub(crate) events: Vec<AuditEvent>,
    /// Next sequence number to assign.
    pub(crate) sequence: u64,
    /// `this_hash` of the last event, or `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,
    pub(crate) finalized: bool,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An append-only decision writer for one run, backed by a SHA-256 chain.
///
/// Records for any other run are rejected, as are writes after `finalize`.
#[derive(Clone)]
pub struct InMemoryAuditWriter {
    run_id: RunId,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    pub fn new(run_id: RunId) -> Self {
        let state = InMemoryState {
            events: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
            finalized: false,
        };
        Self {
            run_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    fn lock(&self) -> EvidentiaResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| EvidentiaError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }

    /// Export a sealed `AuditLog` with every event written so far.
    pub fn export_log(&self) -> EvidentiaResult<AuditLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(AuditLog {
            run_id: self.run_id,
            events: state.events.clone(),
            finalized: state.finalized,
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// Re-verify the in-memory chain. A poisoned lock counts as a failure.
    pub fn verify_integrity(&self) -> bool {
        match self.lock() {
            Ok(state) => verify_chain(&state.events),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    fn write(&self, record: &DecisionRecord) -> EvidentiaResult<()> {
        if record.run_id != self.run_id {
            return Err(EvidentiaError::AuditWriteFailed {
                reason: format!(
                    "record for run {} written to the audit trail of run {}",
                    record.run_id, self.run_id
                ),
            });
        }

        let mut state = self.lock()?;
        if state.finalized {
            return Err(EvidentiaError::AuditWriteFailed {
                reason: format!("audit trail for run {} is already finalized", self.run_id),
            });
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.run_id, sequence, record, &prev_hash)?;

        debug!(
            run_id = %self.run_id,
            sequence,
            step = record.step_index,
            "decision appended to audit chain"
        );

        state.events.push(AuditEvent {
            sequence,
            run_id: self.run_id,
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }

    fn finalize(&self, run_id: &RunId) -> EvidentiaResult<()> {
        if *run_id != self.run_id {
            return Err(EvidentiaError::AuditWriteFailed {
                reason: format!("cannot finalize run {run_id} on the trail of run {}", self.run_id),
            });
        }

        let mut state = self.lock()?;
        state.finalized = true;

        info!(
            run_id = %run_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "audit log finalized"
        );

        Ok(())
    }
}
