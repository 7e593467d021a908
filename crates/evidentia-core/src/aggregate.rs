//! Result aggregator: rolls classified steps into a `WorkflowSummary`.

use evidentia_contracts::{
    evidence::TestEvidence,
    result::{CrossReference, MatchResult, WorkflowSummary},
};

/// Build the run summary. Results are kept in plan order; counts are derived
/// from them so `observed_count + deviation_count == total_steps` always holds.
pub fn aggregate(results: Vec<MatchResult>, evidence: &TestEvidence) -> WorkflowSummary {
    let observed_count = results.iter().filter(|r| r.is_observed()).count();

    WorkflowSummary {
        total_steps: results.len(),
        observed_count,
        deviation_count: results.len() - observed_count,
        cross_reference: CrossReference {
            test_outcome: evidence.test_outcome,
            failure_messages: evidence.failure_messages.clone(),
        },
        results,
    }
}
