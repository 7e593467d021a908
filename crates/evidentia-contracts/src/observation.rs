//! Observed-action evidence and the merged timeline.
//!
//! `ObservedAction`s arrive per video source. The merger folds them into a
//! single `Timeline` of `TimelineEntry`s, each keeping its primary action and
//! every cross-source action that corroborates it, so provenance survives
//! the merge.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One action description observed in a video at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedAction {
    /// Seconds from the start of the timeline.
    pub timestamp: f64,
    /// Natural-language description produced upstream.
    #[serde(default)]
    pub description: String,
    /// Which video produced this action.
    #[serde(default)]
    pub source_id: String,
    /// Upstream vision confidence in [0, 1], when reported.
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl ObservedAction {
    pub fn new(timestamp: f64, description: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            description: description.into(),
            source_id: source_id.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Confidence used for ranking; a missing value ranks lowest.
    pub fn effective_confidence(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }

    /// Chronological order, ties broken by `source_id` for determinism.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .total_cmp(&other.timestamp)
            .then_with(|| self.source_id.cmp(&other.source_id))
    }
}

/// The ordered action sequence of a single video source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTimeline {
    pub source_id: String,
    pub actions: Vec<ObservedAction>,
}

impl SourceTimeline {
    pub fn new(source_id: impl Into<String>, actions: Vec<ObservedAction>) -> Self {
        Self {
            source_id: source_id.into(),
            actions,
        }
    }
}

/// A merged timeline position.
///
/// `action` is the record the matcher compares against. `corroborated_by`
/// holds same-event observations from other sources, never discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub action: ObservedAction,
    #[serde(default)]
    pub corroborated_by: Vec<ObservedAction>,
}

impl TimelineEntry {
    pub fn new(action: ObservedAction) -> Self {
        Self {
            action,
            corroborated_by: Vec::new(),
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.action.timestamp
    }

    pub fn is_corroborated(&self) -> bool {
        !self.corroborated_by.is_empty()
    }

    /// Every source that reported this event, primary first.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.action.source_id.as_str())
            .chain(self.corroborated_by.iter().map(|a| a.source_id.as_str()))
    }
}

/// Chronologically ordered sequence of timeline entries.
///
/// Invariant: entries are non-decreasing by timestamp, ties ordered by
/// primary `source_id`. `Timeline::new` enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Build a timeline, sorting entries into chronological order.
    pub fn new(mut entries: Vec<TimelineEntry>) -> Self {
        entries.sort_by(|a, b| a.action.chronological_cmp(&b.action));
        Self { entries }
    }

    /// A timeline with one uncorroborated entry per action.
    pub fn from_actions(actions: Vec<ObservedAction>) -> Self {
        Self::new(actions.into_iter().map(TimelineEntry::new).collect())
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&TimelineEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    /// The primary actions in timeline order.
    pub fn actions(&self) -> impl Iterator<Item = &ObservedAction> {
        self.entries.iter().map(|e| &e.action)
    }
}

/// Format a timeline offset as `mm:ss`.
pub fn format_offset(secs: f64) -> String {
    let whole = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
