//! # evidentia-contracts
//!
//! Shared types, thresholds, and error contracts for the EVIDENTIA
//! reconciliation engine.
//!
//! All crates in the workspace import from here. No matching logic lives in
//! this crate, only data definitions, configuration defaults and error types.

pub mod config;
pub mod error;
pub mod evidence;
pub mod observation;
pub mod plan;
pub mod result;
pub mod run;
