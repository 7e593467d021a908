//! # evidentia-ingest
//!
//! Boundary parsing for EVIDENTIA: turns the planner log and the evidence
//! bundle into typed inputs for the reconciler.
//!
//! - [`plan_log`]: planner-agent JSON log → `PlannedStep`s
//! - [`evidence`]: schema-validated evidence bundle → `SourceTimeline`s and
//!   `TestEvidence`
//! - [`test_result`]: JUnit XML or pytest-html report → `TestEvidence`
//! - [`assertion`]: `EXPECTED RESULT:` / `ACTUAL RESULT:` extraction
//!
//! Malformed individual records are defaulted and logged. Only unreadable
//! files, non-JSON text, malformed XML and schema violations are errors.

pub mod assertion;
pub mod evidence;
pub mod plan_log;
pub mod test_result;

pub use assertion::split_expected_actual;
pub use evidence::{load_bundle, load_bundle_from_file, EvidenceBundle};
pub use plan_log::{parse_plan_log, parse_plan_log_from_file, PlanLog};
pub use test_result::{
    parse_plan_text, parse_test_result, parse_test_result_from_file, TestReport, TestResultFormat,
};
