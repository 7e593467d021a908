//! Planner-agent log parsing.
//!
//! The automated test agent writes its inner log as JSON:
//!
//! ```json
//! { "planner_agent": [
//!     { "role": "assistant", "name": "planner_agent",
//!       "content": { "plan": "1. Open ...", "next_step": "Click the search icon",
//!                    "next_step_summary": "click search icon", "terminate": "no",
//!                    "is_assert": false, "assert_summary": "", "is_passed": false } }
//! ] }
//! ```
//!
//! Only assistant messages from `planner_agent` whose content is an object
//! become steps. Fields are read leniently: anything missing or of the wrong
//! type falls back to an empty string or `false`.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    evidence::{AssertionOutcome, AssertionRecord},
    plan::PlannedStep,
};

use crate::assertion::enrich;

const PLANNER: &str = "planner_agent";

/// What the planner log yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanLog {
    /// The planner's free-text plan, from the first entry that carries one.
    pub plan: Option<String>,
    /// Planned steps in log order, indexed from 1.
    pub steps: Vec<PlannedStep>,
    /// The planner's own verdicts on its assertion steps.
    pub assertions: Vec<AssertionRecord>,
}

impl PlanLog {
    pub fn assertion_steps(&self) -> impl Iterator<Item = &PlannedStep> {
        self.steps.iter().filter(|s| s.is_assertion)
    }
}

/// Parse a planner log document.
///
/// # Errors
///
/// `InvalidInput` when the text is not JSON or the top level is not an
/// object. Individual malformed entries are skipped, never fatal.
pub fn parse_plan_log(json: &str) -> EvidentiaResult<PlanLog> {
    let doc: Value = serde_json::from_str(json).map_err(|e| EvidentiaError::InvalidInput {
        reason: format!("plan log is not valid JSON: {}", e),
    })?;
    let root = doc.as_object().ok_or_else(|| EvidentiaError::InvalidInput {
        reason: "plan log must be a JSON object".to_string(),
    })?;

    let entries: &[Value] = match root.get(PLANNER) {
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(_) => {
            warn!("'planner_agent' is not an array; treating the plan as empty");
            &[]
        }
        None => {
            warn!("plan log has no 'planner_agent' entries");
            &[]
        }
    };

    let mut log = PlanLog::default();
    for (position, entry) in entries.iter().enumerate() {
        let Some(content) = planner_content(entry) else {
            continue;
        };

        if log.plan.is_none() {
            log.plan = text(content, "plan").filter(|p| !p.trim().is_empty());
        }

        match step_from(content, log.steps.len() + 1) {
            Some((step, assertion)) => {
                debug!(
                    index = step.index,
                    is_assertion = step.is_assertion,
                    summary = %step.summary,
                    "planned step parsed"
                );
                log.steps.push(step);
                log.assertions.extend(assertion);
            }
            None => debug!(position, "planner entry has no step text; skipped"),
        }
    }

    Ok(log)
}

/// Read and parse a planner log file.
pub fn parse_plan_log_from_file(path: &Path) -> EvidentiaResult<PlanLog> {
    let contents = std::fs::read_to_string(path).map_err(|e| EvidentiaError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_plan_log(&contents)
}

/// The content object of an assistant message from the planner.
fn planner_content(entry: &Value) -> Option<&Map<String, Value>> {
    let role = entry.get("role").and_then(Value::as_str);
    let name = entry.get("name").and_then(Value::as_str);
    if role != Some("assistant") || name != Some(PLANNER) {
        return None;
    }
    entry.get("content").and_then(Value::as_object)
}

fn step_from(
    content: &Map<String, Value>,
    index: usize,
) -> Option<(PlannedStep, Option<AssertionRecord>)> {
    let next_step = text(content, "next_step").unwrap_or_default();
    let summary = text(content, "next_step_summary").unwrap_or_default();
    let is_assertion = flag(content, "is_assert");
    let assert_summary = text(content, "assert_summary").unwrap_or_default();

    let description = if next_step.trim().is_empty() && is_assertion {
        assert_summary.clone()
    } else {
        next_step
    };
    if description.trim().is_empty() && summary.trim().is_empty() {
        return None;
    }

    let step = PlannedStep {
        index,
        description,
        summary,
        is_assertion,
        terminates: flag(content, "terminate"),
    };

    let record = (is_assertion && !assert_summary.trim().is_empty()).then(|| {
        let outcome = if flag(content, "is_passed") {
            AssertionOutcome::Passed
        } else {
            AssertionOutcome::Failed
        };
        enrich(AssertionRecord::new(
            step.match_text(),
            outcome,
            assert_summary.clone(),
        ))
    });

    Some((step, record))
}

fn text(content: &Map<String, Value>, key: &str) -> Option<String> {
    content.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Booleans may arrive as `true`/`false` or as `"yes"`/`"no"` strings.
fn flag(content: &Map<String, Value>, key: &str) -> bool {
    match content.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "true"),
        _ => false,
    }
}
