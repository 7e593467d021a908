//! Error types for the EVIDENTIA reconciliation pipeline.
//!
//! The matching core itself never fails: "no match" is a verdict, not an
//! error. Only the boundary crates (config, ingest, report) and the audit
//! sink return `EvidentiaResult<T>`.

use thiserror::Error;

/// The unified error type for the EVIDENTIA crates.
#[derive(Debug, Error)]
pub enum EvidentiaError {
    /// A threshold or window value is missing, malformed, or out of range.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An evidence document failed JSON Schema validation at the boundary.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A boundary document could not be interpreted at all (e.g. it is not
    /// JSON). Individual malformed fields are defaulted instead.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A file could not be read or written.
    #[error("i/o error on '{path}': {reason}")]
    Io { path: String, reason: String },

    /// The audit writer could not persist a decision record.
    ///
    /// Fatal for the run: a classification that cannot be audited is not
    /// reported.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The report renderer could not serialize the summary.
    #[error("report rendering failed: {reason}")]
    ReportFailed { reason: String },
}

/// Convenience alias used throughout the EVIDENTIA crates.
pub type EvidentiaResult<T> = Result<T, EvidentiaError>;
