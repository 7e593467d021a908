//! Numeric thresholds and windows that tune the matching engine.
//!
//! These are calibration defaults, not contracts. `evidentia-config` loads
//! overrides from TOML and calls `validate()` before handing the value on.

use serde::{Deserialize, Serialize};

use crate::error::{EvidentiaError, EvidentiaResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Similarity at or above which a step is `Observed`.
    pub accept_threshold: f64,
    /// Similarity at or above which a non-accepted step is `Altered`
    /// rather than `Skipped`.
    pub alter_threshold: f64,
    /// Two actions from different sources closer than this are merge
    /// candidates.
    pub merge_window_secs: f64,
    /// Similarity at or above which two nearby actions are the same event.
    pub merge_similarity: f64,
    /// How far before the previous accepted match the search window opens.
    pub backward_slack_secs: f64,
    /// Similarity at which an assertion record describes an assertion step.
    pub assertion_match: f64,
    /// Similarity at which a failing assertion message corroborates a
    /// deviation.
    pub corroboration_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.6,
            alter_threshold: 0.3,
            merge_window_secs: 1.0,
            merge_similarity: 0.85,
            backward_slack_secs: 2.0,
            assertion_match: 0.85,
            corroboration_threshold: 0.5,
        }
    }
}

impl MatchConfig {
    /// Check every value is in range and the thresholds are ordered.
    pub fn validate(&self) -> EvidentiaResult<()> {
        let unit = [
            ("accept_threshold", self.accept_threshold),
            ("alter_threshold", self.alter_threshold),
            ("merge_similarity", self.merge_similarity),
            ("assertion_match", self.assertion_match),
            ("corroboration_threshold", self.corroboration_threshold),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvidentiaError::ConfigError {
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }

        let windows = [
            ("merge_window_secs", self.merge_window_secs),
            ("backward_slack_secs", self.backward_slack_secs),
        ];
        for (name, value) in windows {
            if !value.is_finite() || value < 0.0 {
                return Err(EvidentiaError::ConfigError {
                    reason: format!("{name} must be a non-negative number of seconds, got {value}"),
                });
            }
        }

        if self.alter_threshold > self.accept_threshold {
            return Err(EvidentiaError::ConfigError {
                reason: format!(
                    "alter_threshold ({}) must not exceed accept_threshold ({})",
                    self.alter_threshold, self.accept_threshold
                ),
            });
        }

        Ok(())
    }
}
