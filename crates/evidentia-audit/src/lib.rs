//! # evidentia-audit
//!
//! Append-only, SHA-256 hash-chained decision trail for EVIDENTIA runs.
//!
//! ## Overview
//!
//! Every `DecisionRecord` the reconciler writes is wrapped in an
//! `AuditEvent` that links to the previous event via its SHA-256 hash.
//! Changing any recorded verdict, score or note breaks the chain and is
//! detected by `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use evidentia_audit::InMemoryAuditWriter;
//!
//! let writer = InMemoryAuditWriter::new(run_id);
//! let reconciler = Reconciler::new(scorer, Box::new(writer.clone()), config)?;
//! reconciler.run(run_id, &input)?;
//!
//! let log = writer.export_log()?;
//! assert!(evidentia_audit::verify_log(&log));
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{find_break, hash_event, verify_chain, verify_log, ChainBreak};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────
