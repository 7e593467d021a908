//! Hash-chain primitives: hashing and chain verification.
//!
//! Hash input layout (bytes, in order):
//!   1. run id as UTF-8 bytes (hyphenated UUID)
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the decision record

use sha2::{Digest, Sha256};

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    run::{DecisionRecord, RunId},
};

use crate::event::{AuditEvent, AuditLog};

/// Compute the SHA-256 hash for one decision in the chain.
///
/// Returns a lowercase 64-character hex string, or `AuditWriteFailed` if the
/// record cannot be serialized.
pub fn hash_event(
    run_id: &RunId,
    sequence: u64,
    record: &DecisionRecord,
    prev_hash: &str,
) -> EvidentiaResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| EvidentiaError::AuditWriteFailed {
        reason: format!("decision record for step {} is not serializable: {}", record.step_index, e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(run_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Where a chain first fails verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainBreak {
    /// `prev_hash` does not link to the preceding event.
    BrokenLink { sequence: u64 },
    /// `this_hash` does not match the recomputed hash.
    HashMismatch { sequence: u64 },
    /// Sequence numbers are not 0, 1, 2, ...
    OutOfSequence { expected: u64, found: u64 },
}

/// Locate the first event that breaks the chain, if any.
///
/// An empty chain is valid.
pub fn find_break(events: &[AuditEvent]) -> Option<ChainBreak> {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        let expected_seq = position as u64;
        if event.sequence != expected_seq {
            return Some(ChainBreak::OutOfSequence {
                expected: expected_seq,
                found: event.sequence,
            });
        }
        if event.prev_hash != expected_prev {
            return Some(ChainBreak::BrokenLink {
                sequence: event.sequence,
            });
        }
        match hash_event(&event.run_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => {
                return Some(ChainBreak::HashMismatch {
                    sequence: event.sequence,
                })
            }
        }
        expected_prev = event.this_hash.clone();
    }

    None
}

/// `true` when every link and hash in `events` checks out.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    find_break(events).is_none()
}

/// Verify an exported log: the chain itself plus the sealed terminal hash.
pub fn verify_log(log: &AuditLog) -> bool {
    let terminal = log
        .events
        .last()
        .map(|e| e.this_hash.as_str())
        .unwrap_or_default();
    verify_chain(&log.events)
        && terminal == log.terminal_hash
        && log.events.iter().all(|e| e.run_id == log.run_id)
}
