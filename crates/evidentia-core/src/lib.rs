//! # evidentia-core
//!
//! The deterministic reconciliation engine for EVIDENTIA.
//!
//! This crate provides:
//! - The two seams (`SimilarityScorer`, `AuditWriter`)
//! - The pipeline stages: merger, matcher, classifier, aggregator
//! - The `Reconciler` that wires them together in a fixed order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use evidentia_core::{Reconciler, ReconcileInput, traits::{SimilarityScorer, AuditWriter}};
//! ```

pub mod aggregate;
pub mod classify;
pub mod matcher;
pub mod merge;
pub mod reconciler;
pub mod traits;

#[cfg(test)]
mod testing;

pub use reconciler::{ReconcileInput, Reconciler};
