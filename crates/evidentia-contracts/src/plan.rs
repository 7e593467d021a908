//! Planned-step records produced by the plan-log ingester.

use serde::{Deserialize, Serialize};

/// One intended action from the test plan.
///
/// Plan order (`index`) is the expected execution order. The matcher uses it
/// to sequence the search window; video timestamps stay authoritative for
/// *when* something happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
    /// 1-based position in the plan.
    pub index: usize,
    /// Full description of the step as written by the planner.
    #[serde(default)]
    pub description: String,
    /// Short summary of the step. Preferred for matching when non-empty.
    #[serde(default)]
    pub summary: String,
    /// True when the step is a test assertion rather than a UI action.
    #[serde(default)]
    pub is_assertion: bool,
    /// True when the planner marked this step as the last one.
    #[serde(default)]
    pub terminates: bool,
}

impl PlannedStep {
    /// Build a plain action step with the same text as description and summary.
    pub fn action(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            description: text.clone(),
            summary: text,
            is_assertion: false,
            terminates: false,
        }
    }

    /// Build an assertion step with the same text as description and summary.
    pub fn assertion(index: usize, text: impl Into<String>) -> Self {
        Self {
            is_assertion: true,
            ..Self::action(index, text)
        }
    }

    /// The text compared against observed actions: `summary` when it carries
    /// anything, otherwise `description`.
    pub fn match_text(&self) -> &str {
        if self.summary.trim().is_empty() {
            &self.description
        } else {
            &self.summary
        }
    }
}
