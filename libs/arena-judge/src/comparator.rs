/// Result Comparator - Marker Parsing and Verdict Classification
///
/// **Core Responsibility:**
/// Recover per-test-case results from the combined stdout of one sandbox run
/// and classify the submission.
///
/// **Critical Properties:**
/// - Knows nothing about languages or the sandbox
/// - Pure function: (stdout, test cases, memory) → verdict
/// - Never fails: garbled output degrades into `failed` outcomes
///
/// **Classification Rules (per test case, in order):**
/// 1. observed time > expected time limit → exceeded-time-limit
/// 2. normalized output equality → passed, else failed
///
/// **Normalization Rules:**
/// - All whitespace removed from both sides
/// - Array-of-arrays answers are order-insensitive (inner arrays sorted,
///   then the outer array sorted); everything else is compared as text
///
/// **Aggregation:**
/// - Any failed → WRONG_ANSWER (wins over time limit)
/// - Else any exceeded → TIME_LIMIT_EXCEEDED
/// - Else ACCEPTED

use crate::literal;
use arena_common::markers;
use arena_common::types::{
    ComparisonVerdict, ExecutionOutcome, FailureSnapshot, OutcomeStatus, TestCase, VerdictStatus,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info};

/// One marker line, already split from its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    Start(usize),
    Output(&'a str),
    Time(u64),
    End(usize),
}

impl<'a> Marker<'a> {
    /// Recognize a marker at the start of `line`; malformed numbers are not markers
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some(rest) = line.strip_prefix(markers::TC_START) {
            rest.trim().parse().ok().map(Marker::Start)
        } else if let Some(rest) = line.strip_prefix(markers::OUTPUT) {
            Some(Marker::Output(rest))
        } else if let Some(rest) = line.strip_prefix(markers::TIME) {
            rest.trim().parse().ok().map(Marker::Time)
        } else if let Some(rest) = line.strip_prefix(markers::TC_END) {
            rest.trim().parse().ok().map(Marker::End)
        } else {
            None
        }
    }
}

/// Record under construction between TC_START and TC_END
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRecord {
    pub index: usize,
    pub output: Option<String>,
    pub time_ms: Option<u64>,
}

/// Committed record for one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub output: String,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserState {
    #[default]
    Idle,
    Open(PendingRecord),
}

impl ParserState {
    /// Transition table. Returns the next state and, on TC_END, the committed record.
    pub fn step(self, marker: Option<Marker<'_>>) -> (ParserState, Option<(usize, ParsedRecord)>) {
        match (self, marker) {
            (ParserState::Idle, Some(Marker::Start(index))) => (
                ParserState::Open(PendingRecord {
                    index,
                    ..PendingRecord::default()
                }),
                None,
            ),
            // anything else while idle is incidental output
            (ParserState::Idle, _) => (ParserState::Idle, None),
            // no nesting: a second start only retargets the pending record
            (ParserState::Open(mut pending), Some(Marker::Start(index))) => {
                pending.index = index;
                (ParserState::Open(pending), None)
            }
            (ParserState::Open(mut pending), Some(Marker::Output(text))) => {
                pending.output = Some(text.to_string());
                (ParserState::Open(pending), None)
            }
            (ParserState::Open(mut pending), Some(Marker::Time(ms))) => {
                pending.time_ms = Some(ms);
                (ParserState::Open(pending), None)
            }
            (ParserState::Open(pending), Some(Marker::End(end_index))) => {
                if end_index != pending.index {
                    debug!(
                        start_index = pending.index,
                        end_index, "Mismatched TC_END index; keeping start index"
                    );
                }
                let record = ParsedRecord {
                    output: pending.output.unwrap_or_default(),
                    time_ms: pending.time_ms.unwrap_or(0),
                };
                (ParserState::Idle, Some((pending.index, record)))
            }
            (open @ ParserState::Open(_), None) => (open, None),
        }
    }
}

/// Scan captured stdout into records keyed by test case index.
/// A later record for the same index replaces an earlier one.
pub fn parse_records(captured_stdout: &str) -> HashMap<usize, ParsedRecord> {
    let mut records = HashMap::new();
    let mut state = ParserState::Idle;

    for line in captured_stdout.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (next, committed) = state.step(Marker::parse(line));
        state = next;
        if let Some((index, record)) = committed {
            records.insert(index, record);
        }
    }

    if let ParserState::Open(pending) = state {
        debug!(index = pending.index, "Output ended inside an open record; discarded");
    }

    records
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True for an array whose every element is itself an array
fn is_array_of_arrays(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.iter().all(Value::is_array))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by kind, then numerically or lexicographically
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => compare_sequences(x, y),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_sequences(a: &[Value], b: &[Value]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_values(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Sort each inner array ascending, then the outer array lexicographically
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut rows: Vec<Value> = items
                .into_iter()
                .map(|row| match row {
                    Value::Array(mut cells) => {
                        cells.sort_by(compare_values);
                        Value::Array(cells)
                    }
                    other => other,
                })
                .collect();
            rows.sort_by(compare_values);
            Value::Array(rows)
        }
        other => other,
    }
}

/// Canonical comparison text for one side of the equality check
fn comparable(stripped: String) -> String {
    match serde_json::from_str::<Value>(&stripped) {
        Ok(value) if is_array_of_arrays(&value) => canonicalize(value).to_string(),
        _ => stripped,
    }
}

/// Compact JSON form of an expected output, as used for comparison and display
pub fn stringify_expected(expected: &Value) -> String {
    expected.to_string()
}

/// Domain equality between observed text and the expected value
pub fn outputs_match(observed: &str, expected: &Value) -> bool {
    let observed = strip_whitespace(observed);
    let expected = strip_whitespace(&stringify_expected(expected));

    match serde_json::from_str::<Value>(&observed) {
        Ok(value) if is_array_of_arrays(&value) => {
            canonicalize(value).to_string() == comparable(expected)
        }
        _ => observed == expected,
    }
}

/// Render test case input as `key = value` lines
pub fn describe_input(test_case: &TestCase) -> String {
    test_case
        .input
        .iter()
        .map(|(key, value)| format!("{} = {}", key, literal::display(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Classify a single test case against its (possibly missing) record
pub fn classify(record: Option<&ParsedRecord>, test_case: &TestCase) -> (String, u64, OutcomeStatus) {
    let Some(record) = record else {
        return (markers::NO_OUTPUT.to_string(), 0, OutcomeStatus::Failed);
    };

    let status = if record.time_ms > test_case.expected_time_limit {
        OutcomeStatus::ExceededTimeLimit
    } else if outputs_match(&record.output, &test_case.expected_output) {
        OutcomeStatus::Passed
    } else {
        OutcomeStatus::Failed
    };

    (record.output.clone(), record.time_ms, status)
}

fn snapshot(outcome: &ExecutionOutcome<'_>) -> FailureSnapshot {
    FailureSnapshot {
        index: outcome.index,
        input: describe_input(outcome.test_case),
        observed_output: outcome.observed_output.clone(),
        expected_output: stringify_expected(&outcome.test_case.expected_output),
    }
}

/// Aggregate per-test outcomes into the final verdict
pub fn aggregate<'a>(
    per_test_case: Vec<ExecutionOutcome<'a>>,
    memory_used_bytes: u64,
) -> ComparisonVerdict<'a> {
    let first_failure = per_test_case
        .iter()
        .find(|outcome| outcome.status == OutcomeStatus::Failed)
        .map(snapshot);
    let first_time_exceeded = per_test_case
        .iter()
        .find(|outcome| outcome.status == OutcomeStatus::ExceededTimeLimit)
        .map(snapshot);

    let overall_status = if first_failure.is_some() {
        VerdictStatus::WrongAnswer
    } else if first_time_exceeded.is_some() {
        VerdictStatus::TimeLimitExceeded
    } else {
        VerdictStatus::Accepted
    };

    let max_observed_time_ms = per_test_case
        .iter()
        .map(|outcome| outcome.observed_time_ms)
        .max()
        .unwrap_or(0);

    ComparisonVerdict {
        all_passed: overall_status == VerdictStatus::Accepted,
        per_test_case,
        overall_status,
        first_failure,
        first_time_exceeded,
        max_observed_time_ms,
        memory_used_bytes,
    }
}

/// Compare one sandbox run against its test cases.
///
/// This is the main entry point. It delegates to:
/// - `parse_records` for the marker state machine
/// - `classify` for each test case, joined by index
/// - `aggregate` for the overall status and snapshots
pub fn compare<'a>(
    captured_stdout: &str,
    test_cases: &'a [TestCase],
    memory_used_bytes: u64,
) -> ComparisonVerdict<'a> {
    let records = parse_records(captured_stdout);

    debug!(
        records = records.len(),
        test_cases = test_cases.len(),
        "Parsed marker records"
    );

    let per_test_case: Vec<ExecutionOutcome<'a>> = test_cases
        .iter()
        .enumerate()
        .map(|(index, test_case)| {
            let (observed_output, observed_time_ms, status) =
                classify(records.get(&index), test_case);

            debug!(
                index,
                status = ?status,
                observed_time_ms,
                time_limit_ms = test_case.expected_time_limit,
                "Test case classified"
            );

            ExecutionOutcome {
                index,
                test_case,
                observed_output,
                observed_time_ms,
                status,
            }
        })
        .collect();

    let verdict = aggregate(per_test_case, memory_used_bytes);

    info!(
        status = %verdict.overall_status,
        passed = verdict.passed_count(),
        total = verdict.per_test_case.len(),
        max_time_ms = verdict.max_observed_time_ms,
        memory_bytes = verdict.memory_used_bytes,
        "Comparison complete"
    );

    verdict
}
