//! Timeline merger: folds per-source action sequences into one timeline.
//!
//! Algorithm:
//!
//! 1. Restamp each action with the `source_id` of the sequence it arrived in,
//!    flatten, and sort by (timestamp, source_id).
//! 2. Drop verbatim repeats (same source, timestamp and description).
//! 3. Walk the actions in order. An action joins an existing entry when the
//!    entry has no action from the same source yet, lies within the merge
//!    window, and its primary description scores at or above the merge
//!    similarity. The higher-confidence action becomes primary (ties go to
//!    the lexically earlier source); the other is kept as a corroboration.
//! 4. Everything else becomes its own entry. Nothing is dropped.

use std::collections::HashSet;

use tracing::debug;

use evidentia_contracts::{
    config::MatchConfig,
    observation::{ObservedAction, SourceTimeline, Timeline, TimelineEntry},
};

use crate::traits::{clamp_score, SimilarityScorer};

/// Merge one or more source timelines into a single chronological timeline.
pub fn merge_timelines(
    sources: &[SourceTimeline],
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Timeline {
    let mut actions: Vec<ObservedAction> = sources
        .iter()
        .flat_map(|src| {
            src.actions.iter().map(move |a| ObservedAction {
                source_id: src.source_id.clone(),
                ..a.clone()
            })
        })
        .collect();
    actions.sort_by(|a, b| a.chronological_cmp(b));

    let mut seen: HashSet<(String, u64, String)> = HashSet::new();
    actions.retain(|a| {
        seen.insert((
            a.source_id.clone(),
            a.timestamp.to_bits(),
            a.description.clone(),
        ))
    });

    let mut entries: Vec<TimelineEntry> = Vec::with_capacity(actions.len());
    for action in actions {
        match find_same_event(&entries, &action, scorer, config) {
            Some(idx) => absorb(&mut entries[idx], action),
            None => entries.push(TimelineEntry::new(action)),
        }
    }

    debug!(
        sources = sources.len(),
        entries = entries.len(),
        corroborated = entries.iter().filter(|e| e.is_corroborated()).count(),
        "timeline merged"
    );

    Timeline::new(entries)
}

/// Index of the entry that describes the same real-world event as `action`,
/// if any. The best-scoring entry wins; ties go to the earlier entry.
fn find_same_event(
    entries: &[TimelineEntry],
    action: &ObservedAction,
    scorer: &dyn SimilarityScorer,
    config: &MatchConfig,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, entry) in entries.iter().enumerate() {
        if entry.sources().any(|s| s == action.source_id) {
            continue;
        }
        if (entry.timestamp() - action.timestamp).abs() > config.merge_window_secs {
            continue;
        }
        let score = clamp_score(scorer.score(&entry.action.description, &action.description));
        if score < config.merge_similarity {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }

    best.map(|(idx, _)| idx)
}

/// Fold `action` into `entry`, promoting it to primary when it outranks the
/// current primary.
fn absorb(entry: &mut TimelineEntry, action: ObservedAction) {
    debug!(
        timestamp = action.timestamp,
        source = %action.source_id,
        primary_source = %entry.action.source_id,
        "cross-source corroboration"
    );

    if outranks(&action, &entry.action) {
        let demoted = std::mem::replace(&mut entry.action, action);
        entry.corroborated_by.push(demoted);
    } else {
        entry.corroborated_by.push(action);
    }
    entry
        .corroborated_by
        .sort_by(|a, b| a.chronological_cmp(b));
}

/// Higher confidence wins; equal confidence goes to the earlier source id.
fn outranks(candidate: &ObservedAction, current: &ObservedAction) -> bool {
    match candidate
        .effective_confidence()
        .total_cmp(&current.effective_confidence())
    {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => candidate.source_id < current.source_id,
    }
}
