//! # evidentia-config
//!
//! TOML-driven threshold configuration for the EVIDENTIA matcher.
//!
//! ## Overview
//!
//! [`ConfigLoader`] reads a small TOML document with `[thresholds]` and
//! `[windows]` tables. Every key is optional; missing keys keep the
//! [`MatchConfig`](evidentia_contracts::config::MatchConfig) defaults. The
//! merged result is validated before it is returned.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use evidentia_config::ConfigLoader;
//!
//! let config = ConfigLoader::from_file(Path::new("thresholds.toml"))?.config();
//! // Pass `config` to `evidentia_core::Reconciler::new(...)`.
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_or_default, ConfigLoader};
pub use schema::{ConfigFile, ThresholdTable, WindowTable};

// ── Tests ─────────────────────────────────────────────────────────────────────
