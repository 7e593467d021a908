//! Test-result evidence: per-assertion outcomes and the overall verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single test assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionOutcome {
    Passed,
    Failed,
}

/// One assertion found in the test-result evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionRecord {
    /// What the assertion checks.
    #[serde(default)]
    pub description: String,
    pub outcome: AssertionOutcome,
    /// The raw failure or success message.
    #[serde(default)]
    pub message: String,
    /// `EXPECTED RESULT:` segment of `message`, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// `ACTUAL RESULT:` segment of `message`, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl AssertionRecord {
    pub fn new(
        description: impl Into<String>,
        outcome: AssertionOutcome,
        message: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            outcome,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == AssertionOutcome::Failed
    }
}

/// Overall verdict of the test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed,
    #[default]
    Unknown,
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestOutcome::Passed => "passed",
            TestOutcome::Failed => "failed",
            TestOutcome::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Everything the test-result parser hands to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestEvidence {
    #[serde(default)]
    pub test_outcome: TestOutcome,
    /// Suite-level failure messages, carried verbatim into the summary.
    #[serde(default)]
    pub failure_messages: Vec<String>,
    #[serde(default)]
    pub assertions: Vec<AssertionRecord>,
}

impl TestEvidence {
    pub fn failing_assertions(&self) -> impl Iterator<Item = &AssertionRecord> {
        self.assertions.iter().filter(|a| a.is_failed())
    }

    /// Fold evidence from another report into this one.
    ///
    /// A known outcome in `other` replaces ours. Failure messages already
    /// present are not repeated; assertions are appended.
    pub fn absorb(&mut self, other: TestEvidence) {
        if other.test_outcome != TestOutcome::Unknown {
            self.test_outcome = other.test_outcome;
        }
        for message in other.failure_messages {
            if !self.failure_messages.contains(&message) {
                self.failure_messages.push(message);
            }
        }
        self.assertions.extend(other.assertions);
    }
}
