//! Built-in sample: a product-search test recorded by two cameras.
//!
//! The agent searched and typed as planned, opened the price filter menu
//! without applying the filter, and never added anything to the cart. The
//! test failed on the cart assertion.

use evidentia_contracts::{
    evidence::{AssertionOutcome, AssertionRecord, TestEvidence, TestOutcome},
    observation::{ObservedAction, SourceTimeline},
    plan::PlannedStep,
};
use evidentia_core::ReconcileInput;

pub fn input() -> ReconcileInput {
    let steps = vec![
        PlannedStep::action(1, "Click the Search icon on the homepage"),
        PlannedStep::action(2, "Type 'wireless headphones' into the search box"),
        PlannedStep::action(3, "Apply the 'Under $50' price filter"),
        PlannedStep::action(4, "Add the first result to the cart"),
    ];

    let screen = SourceTimeline::new(
        "screen",
        vec![
            ObservedAction::new(3.0, "click search icon", "screen").with_confidence(0.95),
            ObservedAction::new(6.5, "type wireless headphones into search box", "screen")
                .with_confidence(0.9),
            ObservedAction::new(10.0, "open price filter menu", "screen").with_confidence(0.8),
            ObservedAction::new(14.0, "scroll results", "screen").with_confidence(0.7),
        ],
    );
    let webcam = SourceTimeline::new(
        "webcam",
        vec![ObservedAction::new(3.4, "click search icon", "webcam").with_confidence(0.6)],
    );

    let evidence = TestEvidence {
        test_outcome: TestOutcome::Failed,
        failure_messages: vec![
            "AssertionError: EXPECTED RESULT: cart contains 1 item ACTUAL RESULT: cart is empty"
                .to_string(),
        ],
        assertions: vec![AssertionRecord {
            expected: Some("cart contains 1 item".to_string()),
            actual: Some("cart is empty".to_string()),
            ..AssertionRecord::new(
                "first result added to cart",
                AssertionOutcome::Failed,
                "cart is empty",
            )
        }],
    };

    ReconcileInput {
        steps,
        sources: vec![screen, webcam],
        evidence,
    }
}
