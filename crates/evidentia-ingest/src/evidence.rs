//! Evidence bundle loading.
//!
//! The bundle carries what was observed (one action list per video source)
//! and what the test harness reported:
//!
//! ```json
//! { "sources": [ { "source_id": "screen", "actions": [
//!       { "timestamp": 3.2, "description": "click search icon", "confidence": 0.9 } ] } ],
//!   "test": { "outcome": "failed", "failure_messages": ["..."],
//!             "assertions": [ { "description": "...", "outcome": "failed", "message": "..." } ] } }
//! ```
//!
//! Loading runs in two phases:
//!
//! 1. **Structural**: the raw JSON is validated against `bundle_schema()`
//!    with `jsonschema`. Every violation is collected before returning.
//! 2. **Typed**: the document is deserialized and sanitized. Negative
//!    timestamps become 0.0; confidences are clamped into [0, 1].

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    evidence::{AssertionRecord, TestEvidence, TestOutcome},
    observation::{ObservedAction, SourceTimeline},
};

use crate::assertion::enrich;

/// A loaded, sanitized evidence bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceBundle {
    pub sources: Vec<SourceTimeline>,
    pub evidence: TestEvidence,
}

impl EvidenceBundle {
    pub fn action_count(&self) -> usize {
        self.sources.iter().map(|s| s.actions.len()).sum()
    }
}

// ── Wire shape ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BundleFile {
    sources: Vec<SourceTimeline>,
    #[serde(default)]
    test: TestSection,
}

#[derive(Debug, Default, Deserialize)]
struct TestSection {
    #[serde(default)]
    outcome: TestOutcome,
    #[serde(default)]
    failure_messages: Vec<String>,
    #[serde(default)]
    assertions: Vec<AssertionRecord>,
}

/// The JSON Schema every bundle must satisfy.
pub fn bundle_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["sources"],
        "properties": {
            "sources": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["source_id", "actions"],
                    "properties": {
                        "source_id": { "type": "string", "minLength": 1 },
                        "actions": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["timestamp", "description"],
                                "properties": {
                                    "timestamp": { "type": "number" },
                                    "description": { "type": "string" },
                                    "confidence": { "type": ["number", "null"] }
                                }
                            }
                        }
                    }
                }
            },
            "test": {
                "type": "object",
                "properties": {
                    "outcome": { "enum": ["passed", "failed", "unknown"] },
                    "failure_messages": { "type": "array", "items": { "type": "string" } },
                    "assertions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["outcome"],
                            "properties": {
                                "description": { "type": "string" },
                                "outcome": { "enum": ["passed", "failed"] },
                                "message": { "type": "string" },
                                "expected": { "type": ["string", "null"] },
                                "actual": { "type": ["string", "null"] }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Validate `doc` against the bundle schema, collecting every violation.
fn validate(doc: &Value) -> EvidentiaResult<()> {
    let schema = bundle_schema();
    let validator = jsonschema::validator_for(&schema).map_err(|e| EvidentiaError::SchemaValidation {
        reason: format!("invalid bundle schema: {e}"),
    })?;

    let failures: Vec<String> = validator
        .iter_errors(doc)
        .map(|error| format!("at '{}': {}", error.instance_path, error))
        .collect();

    if failures.is_empty() {
        return Ok(());
    }
    for failure in &failures {
        warn!(%failure, "evidence bundle schema violation");
    }
    Err(EvidentiaError::SchemaValidation {
        reason: format!(
            "evidence bundle has {} violation(s): {}",
            failures.len(),
            failures.join("; ")
        ),
    })
}

/// Parse, validate and sanitize an evidence bundle.
///
/// # Errors
///
/// `InvalidInput` when the text is not JSON; `SchemaValidation` listing
/// every structural violation otherwise.
pub fn load_bundle(json: &str) -> EvidentiaResult<EvidenceBundle> {
    let doc: Value = serde_json::from_str(json).map_err(|e| EvidentiaError::InvalidInput {
        reason: format!("evidence bundle is not valid JSON: {}", e),
    })?;
    validate(&doc)?;

    let file: BundleFile = serde_json::from_value(doc).map_err(|e| EvidentiaError::SchemaValidation {
        reason: format!("evidence bundle does not match the expected shape: {}", e),
    })?;

    let sources: Vec<SourceTimeline> = file.sources.into_iter().map(sanitize_source).collect();
    let evidence = TestEvidence {
        test_outcome: file.test.outcome,
        failure_messages: file.test.failure_messages,
        assertions: file.test.assertions.into_iter().map(enrich).collect(),
    };

    let bundle = EvidenceBundle { sources, evidence };
    debug!(
        sources = bundle.sources.len(),
        actions = bundle.action_count(),
        assertions = bundle.evidence.assertions.len(),
        outcome = %bundle.evidence.test_outcome,
        "evidence bundle loaded"
    );
    Ok(bundle)
}

/// Read and load an evidence bundle file.
pub fn load_bundle_from_file(path: &Path) -> EvidentiaResult<EvidenceBundle> {
    let contents = std::fs::read_to_string(path).map_err(|e| EvidentiaError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    load_bundle(&contents)
}

fn sanitize_source(source: SourceTimeline) -> SourceTimeline {
    let source_id = source.source_id;
    let actions = source
        .actions
        .into_iter()
        .map(|action| sanitize_action(&source_id, action))
        .collect();
    SourceTimeline { source_id, actions }
}

fn sanitize_action(source_id: &str, action: ObservedAction) -> ObservedAction {
    let timestamp = if action.timestamp.is_finite() && action.timestamp >= 0.0 {
        action.timestamp
    } else {
        warn!(
            source = %source_id,
            timestamp = action.timestamp,
            "invalid timestamp replaced with 0.0"
        );
        0.0
    };
    let confidence = action.confidence.map(|c| {
        if c.is_nan() {
            0.0
        } else {
            c.clamp(0.0, 1.0)
        }
    });
    ObservedAction {
        timestamp,
        confidence,
        source_id: source_id.to_string(),
        ..action
    }
}
