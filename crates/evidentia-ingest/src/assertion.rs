//! Expected/actual extraction from assertion messages.
//!
//! Test harnesses in this pipeline report assertion failures as free text
//! with two markers:
//!
//! ```text
//! Search results are filtered. EXPECTED RESULT: 3 rows ACTUAL RESULT: 0 rows
//! ```

use evidentia_contracts::evidence::AssertionRecord;

const EXPECTED_MARKER: &str = "EXPECTED RESULT:";
const ACTUAL_MARKER: &str = "ACTUAL RESULT:";

/// Split `message` into its expected and actual parts.
///
/// The expected part runs from `EXPECTED RESULT:` up to `ACTUAL RESULT:` (or
/// the end of the text); the actual part runs from `ACTUAL RESULT:` to the
/// end. Missing markers and blank parts yield `None`.
pub fn split_expected_actual(message: &str) -> (Option<String>, Option<String>) {
    let expected = message.find(EXPECTED_MARKER).and_then(|at| {
        let rest = &message[at + EXPECTED_MARKER.len()..];
        let end = rest.find(ACTUAL_MARKER).unwrap_or(rest.len());
        non_blank(&rest[..end])
    });
    let actual = message
        .find(ACTUAL_MARKER)
        .and_then(|at| non_blank(&message[at + ACTUAL_MARKER.len()..]));
    (expected, actual)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Fill in `expected` / `actual` from the message where they are missing.
pub fn enrich(record: AssertionRecord) -> AssertionRecord {
    if record.expected.is_some() && record.actual.is_some() {
        return record;
    }
    let (expected, actual) = split_expected_actual(&record.message);
    AssertionRecord {
        expected: record.expected.or(expected),
        actual: record.actual.or(actual),
        ..record
    }
}
