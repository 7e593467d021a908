//! On-disk shape of the threshold configuration.
//!
//! Every table and key is optional. Anything left out keeps the
//! `MatchConfig` default.
//!
//! ```toml
//! [thresholds]
//! accept = 0.6
//! alter = 0.3
//! merge_similarity = 0.85
//! assertion_match = 0.85
//! corroboration = 0.5
//!
//! [windows]
//! merge_secs = 1.0
//! backward_slack_secs = 2.0
//! ```

use serde::{Deserialize, Serialize};

use evidentia_contracts::config::MatchConfig;

/// The `[thresholds]` table. All values are similarities in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdTable {
    pub accept: Option<f64>,
    pub alter: Option<f64>,
    pub merge_similarity: Option<f64>,
    pub assertion_match: Option<f64>,
    pub corroboration: Option<f64>,
}

/// The `[windows]` table. All values are seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowTable {
    pub merge_secs: Option<f64>,
    pub backward_slack_secs: Option<f64>,
}

/// The top-level structure deserialized from a threshold TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub windows: WindowTable,
}

impl ConfigFile {
    /// Overlay the values present in this file onto `base`.
    pub fn apply(&self, base: MatchConfig) -> MatchConfig {
        let t = &self.thresholds;
        let w = &self.windows;
        MatchConfig {
            accept_threshold: t.accept.unwrap_or(base.accept_threshold),
            alter_threshold: t.alter.unwrap_or(base.alter_threshold),
            merge_similarity: t.merge_similarity.unwrap_or(base.merge_similarity),
            assertion_match: t.assertion_match.unwrap_or(base.assertion_match),
            corroboration_threshold: t.corroboration.unwrap_or(base.corroboration_threshold),
            merge_window_secs: w.merge_secs.unwrap_or(base.merge_window_secs),
            backward_slack_secs: w.backward_slack_secs.unwrap_or(base.backward_slack_secs),
        }
    }

    /// The keys this file actually sets, for logging.
    pub fn overridden_keys(&self) -> Vec<&'static str> {
        let t = &self.thresholds;
        let w = &self.windows;
        [
            ("thresholds.accept", t.accept.is_some()),
            ("thresholds.alter", t.alter.is_some()),
            ("thresholds.merge_similarity", t.merge_similarity.is_some()),
            ("thresholds.assertion_match", t.assertion_match.is_some()),
            ("thresholds.corroboration", t.corroboration.is_some()),
            ("windows.merge_secs", w.merge_secs.is_some()),
            ("windows.backward_slack_secs", w.backward_slack_secs.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
        .collect()
    }
}
