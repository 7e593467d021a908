//! Test-harness result parsing: JUnit XML and pytest-html reports.
//!
//! Both formats carry the same information for EVIDENTIA:
//!
//! - the overall outcome (suite failure counts, or the `outcome-*` class),
//! - the failure messages,
//! - the agent's properties: `plan`, `next_step`, `next_step_summary`,
//!   `is_passed` and any `*assert*` property holding an assertion summary.
//!
//! ```xml
//! <testsuites>
//!   <testsuite tests="1" failures="1">
//!     <testcase name="test_search">
//!       <properties>
//!         <property name="next_step" value="Click the search icon"/>
//!         <property name="assert_summary" value="EXPECTED RESULT: 3 rows ACTUAL RESULT: 0 rows"/>
//!       </properties>
//!       <failure message="AssertionError: no rows">traceback</failure>
//!     </testcase>
//!   </testsuite>
//! </testsuites>
//! ```

use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use evidentia_contracts::{
    error::{EvidentiaError, EvidentiaResult},
    evidence::{AssertionOutcome, AssertionRecord, TestEvidence, TestOutcome},
    plan::PlannedStep,
};

use crate::assertion::enrich;

/// Which report format a test-result file is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResultFormat {
    JunitXml,
    Html,
}

impl TestResultFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> EvidentiaResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse().map_err(|_| EvidentiaError::InvalidInput {
            reason: format!(
                "unsupported test result format '{}' for '{}' (expected .xml or .html)",
                ext,
                path.display()
            ),
        })
    }
}

impl FromStr for TestResultFormat {
    type Err = EvidentiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" | "junit" => Ok(TestResultFormat::JunitXml),
            "html" | "htm" => Ok(TestResultFormat::Html),
            other => Err(EvidentiaError::InvalidInput {
                reason: format!("unknown test result format '{}'", other),
            }),
        }
    }
}

/// What a test-result file yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestReport {
    pub evidence: TestEvidence,
    /// The agent's free-text plan property, when present.
    pub plan: Option<String>,
    /// Steps from `next_step` properties, or from the plan text when there
    /// are none.
    pub steps: Vec<PlannedStep>,
    /// Every property in document order.
    pub properties: Vec<(String, String)>,
    /// Sum of the suites' `tests` attributes (JUnit only).
    pub total_tests: Option<u32>,
}

impl TestReport {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a test-result document in the given format.
pub fn parse_test_result(contents: &str, format: TestResultFormat) -> EvidentiaResult<TestReport> {
    match format {
        TestResultFormat::JunitXml => parse_junit_xml(contents),
        TestResultFormat::Html => parse_html_report(contents),
    }
}

/// Read a test-result file, choosing the parser by extension.
pub fn parse_test_result_from_file(path: &Path) -> EvidentiaResult<TestReport> {
    let format = TestResultFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path).map_err(|e| EvidentiaError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let report = parse_test_result(&contents, format)?;
    debug!(
        path = %path.display(),
        outcome = %report.evidence.test_outcome,
        failures = report.evidence.failure_messages.len(),
        assertions = report.evidence.assertions.len(),
        "test result parsed"
    );
    Ok(report)
}

// ── JUnit XML ─────────────────────────────────────────────────────────────────

/// Parse a JUnit XML report.
///
/// The outcome is `failed` when any suite counts failures or errors, or any
/// `<failure>`/`<error>` element is present; `passed` when at least one
/// suite was seen otherwise; `unknown` with no suite at all.
///
/// # Errors
///
/// `InvalidInput` for XML that is not well formed.
pub fn parse_junit_xml(xml: &str) -> EvidentiaResult<TestReport> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut suites = 0usize;
    let mut counted_failures = 0u32;
    let mut total_tests = 0u32;
    let mut failures: Vec<String> = Vec::new();
    let mut properties: Vec<(String, String)> = Vec::new();
    // Index into `failures` while inside a <failure>/<error> element.
    let mut open_failure: Option<usize> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(EvidentiaError::InvalidInput {
                    reason: format!(
                        "test result XML is malformed at byte {}: {}",
                        reader.buffer_position(),
                        e
                    ),
                })
            }
        };

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                match e.local_name().as_ref() {
                    b"testsuite" => {
                        suites += 1;
                        counted_failures += count_attr(e, "failures")? + count_attr(e, "errors")?;
                        total_tests += count_attr(e, "tests")?;
                    }
                    b"failure" | b"error" => {
                        failures.push(attr(e, "message")?.unwrap_or_default());
                        if is_start {
                            open_failure = Some(failures.len() - 1);
                        }
                    }
                    b"property" => {
                        let name = attr(e, "name")?.unwrap_or_default();
                        let value = attr(e, "value")?.unwrap_or_default();
                        if !name.is_empty() {
                            properties.push((name, value));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                if let Some(idx) = open_failure {
                    let text = t.unescape().map_err(xml_error)?;
                    fill_blank(&mut failures[idx], &text);
                }
            }
            Event::CData(ref c) => {
                if let Some(idx) = open_failure {
                    fill_blank(&mut failures[idx], &String::from_utf8_lossy(c));
                }
            }
            Event::End(ref e) => {
                if matches!(e.local_name().as_ref(), b"failure" | b"error") {
                    open_failure = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let test_outcome = if counted_failures > 0 || !failures.is_empty() {
        TestOutcome::Failed
    } else if suites > 0 {
        TestOutcome::Passed
    } else {
        warn!("test result XML has no <testsuite>; outcome unknown");
        TestOutcome::Unknown
    };

    let failure_messages: Vec<String> = failures.into_iter().filter(|m| !m.trim().is_empty()).collect();
    let mut report = from_properties(properties, test_outcome, failure_messages);
    report.total_tests = (suites > 0).then_some(total_tests);
    Ok(report)
}

fn attr(e: &BytesStart<'_>, name: &str) -> EvidentiaResult<Option<String>> {
    match e.try_get_attribute(name).map_err(xml_error)? {
        Some(a) => Ok(Some(a.unescape_value().map_err(xml_error)?.into_owned())),
        None => Ok(None),
    }
}

/// A numeric count attribute; missing or unparsable counts are 0.
fn count_attr(e: &BytesStart<'_>, name: &str) -> EvidentiaResult<u32> {
    Ok(attr(e, name)?
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0))
}

fn fill_blank(message: &mut String, text: &str) {
    if message.trim().is_empty() {
        *message = text.trim().to_string();
    }
}

fn xml_error(e: impl std::fmt::Display) -> EvidentiaError {
    EvidentiaError::InvalidInput {
        reason: format!("test result XML is malformed: {}", e),
    }
}

// ── HTML ──────────────────────────────────────────────────────────────────────

/// Parse a pytest-html style report.
///
/// Reads the `outcome-failed` / `outcome-passed` marker, the cell next to a
/// `Failed` header, and every `table.proplist` row of `<th>name</th><td>value</td>`.
pub fn parse_html_report(html: &str) -> EvidentiaResult<TestReport> {
    let doc = Html::parse_document(html);
    let failed_marker = selector(".outcome-failed")?;
    let passed_marker = selector(".outcome-passed")?;
    let th = selector("th")?;
    let td = selector("td")?;
    let prop_rows = selector("table.proplist tr")?;

    let test_outcome = if doc.select(&failed_marker).next().is_some() {
        TestOutcome::Failed
    } else if doc.select(&passed_marker).next().is_some() {
        TestOutcome::Passed
    } else {
        warn!("test result HTML has no outcome marker; outcome unknown");
        TestOutcome::Unknown
    };

    let failure_messages: Vec<String> = doc
        .select(&th)
        .filter(|header| text_of(*header) == "Failed")
        .filter_map(|header| {
            header
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| sibling.value().name() == "td")
        })
        .map(text_of)
        .filter(|m| !m.is_empty())
        .collect();

    let properties: Vec<(String, String)> = doc
        .select(&prop_rows)
        .filter_map(|row| {
            let name = text_of(row.select(&th).next()?);
            let value = text_of(row.select(&td).next()?);
            (!name.is_empty()).then_some((name, value))
        })
        .collect();

    Ok(from_properties(properties, test_outcome, failure_messages))
}

fn selector(css: &str) -> EvidentiaResult<Selector> {
    Selector::parse(css).map_err(|e| EvidentiaError::InvalidInput {
        reason: format!("bad selector '{}': {:?}", css, e),
    })
}

/// Visible text with each fragment trimmed, joined by single spaces.
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Properties ────────────────────────────────────────────────────────────────

fn from_properties(
    properties: Vec<(String, String)>,
    test_outcome: TestOutcome,
    failure_messages: Vec<String>,
) -> TestReport {
    let plan = properties
        .iter()
        .find(|(name, value)| name == "plan" && !value.trim().is_empty())
        .map(|(_, value)| value.clone());

    let mut steps = steps_from_properties(&properties);
    if steps.is_empty() {
        steps = plan.as_deref().map(parse_plan_text).unwrap_or_default();
    }

    let passed_flag = properties
        .iter()
        .rev()
        .find(|(name, _)| name == "is_passed")
        .and_then(|(_, value)| flag(value));
    let outcome = match passed_flag {
        Some(true) => AssertionOutcome::Passed,
        Some(false) => AssertionOutcome::Failed,
        None if test_outcome == TestOutcome::Failed => AssertionOutcome::Failed,
        None => AssertionOutcome::Passed,
    };

    let assertions = properties
        .iter()
        .filter(|(name, value)| name.to_ascii_lowercase().contains("assert") && flag(value).is_none())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(name, value)| enrich(AssertionRecord::new(name.clone(), outcome, value.clone())))
        .collect();

    TestReport {
        evidence: TestEvidence {
            test_outcome,
            failure_messages,
            assertions,
        },
        plan,
        steps,
        properties,
        total_tests: None,
    }
}

/// One step per `next_step` property. Its summary is the first
/// `next_step_summary` before the following `next_step`.
fn steps_from_properties(properties: &[(String, String)]) -> Vec<PlannedStep> {
    let mut steps: Vec<PlannedStep> = Vec::new();
    for (name, value) in properties {
        match name.as_str() {
            "next_step" if !value.trim().is_empty() => {
                steps.push(PlannedStep::action(steps.len() + 1, value.trim()));
            }
            "next_step_summary" => {
                if let Some(step) = steps.last_mut().filter(|s| s.summary.is_empty()) {
                    step.summary = value.trim().to_string();
                }
            }
            _ => {}
        }
    }
    steps
}

/// `Some(bool)` for flag-like values (`true`, `no`, ...), `None` otherwise.
fn flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Split a numbered or bulleted plan into steps, indexed from 1.
///
/// Lines that start with a digit (`1.`, `2)`, `3:`) or a bullet (`-`, `*`)
/// are steps; anything else is prose and ignored.
pub fn parse_plan_text(plan: &str) -> Vec<PlannedStep> {
    let mut steps = Vec::new();
    for line in plan.lines() {
        let Some(text) = strip_marker(line.trim()) else {
            continue;
        };
        if !text.is_empty() {
            steps.push(PlannedStep::action(steps.len() + 1, text));
        }
    }
    steps
}

fn strip_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix(|c: char| c == '-' || c == '*') {
        return Some(rest.trim());
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest
        .strip_prefix(|c: char| c == '.' || c == ')' || c == ':')
        .unwrap_or(rest);
    Some(rest.trim())
}
