use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Target languages the harness can assemble programs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Cpp,
    Python,
    Javascript,
}

/// Alias table used to resolve user-supplied language names.
/// Lookups are case-insensitive; every key here is lowercase.
pub const LANGUAGE_ALIASES: &[(&str, Language)] = &[
    ("java", Language::Java),
    ("cpp", Language::Cpp),
    ("c++", Language::Cpp),
    ("python", Language::Python),
    ("python3", Language::Python),
    ("py", Language::Python),
    ("javascript", Language::Javascript),
    ("js", Language::Javascript),
    ("node", Language::Javascript),
    ("nodejs", Language::Javascript),
];

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::Cpp,
        Language::Python,
        Language::Javascript,
    ];

    /// Resolve a language name or alias (case-insensitive)
    pub fn from_alias(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        LANGUAGE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == needle)
            .map(|(_, language)| *language)
    }

    /// Normalized tag understood by the execution sandbox
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::Javascript => "javascript",
        }
    }

    /// All aliases that resolve to this language
    pub fn aliases(&self) -> Vec<&'static str> {
        LANGUAGE_ALIASES
            .iter()
            .filter(|(_, language)| language == self)
            .map(|(alias, _)| *alias)
            .collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One input/expected-output pair for a problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Named parameters, in the order they are passed to the user's function
    pub input: Map<String, Value>,
    pub expected_output: Value,
    /// Wall time budget in milliseconds
    pub expected_time_limit: u64,
}

/// Program text produced by the assembler, ready for the sandbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledProgram {
    pub source_text: String,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
    ExceededTimeLimit,
}

/// Result of one test case as recovered from the sandbox output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome<'a> {
    pub index: usize,
    pub test_case: &'a TestCase,
    pub observed_output: String,
    pub observed_time_ms: u64,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VerdictStatus::Accepted => "ACCEPTED",
            VerdictStatus::WrongAnswer => "WRONG_ANSWER",
            VerdictStatus::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
        };
        f.write_str(label)
    }
}

/// Display snapshot of the earliest failing or slow test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSnapshot {
    pub index: usize,
    pub input: String,
    pub observed_output: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonVerdict<'a> {
    pub all_passed: bool,
    pub per_test_case: Vec<ExecutionOutcome<'a>>,
    pub overall_status: VerdictStatus,
    pub first_failure: Option<FailureSnapshot>,
    pub first_time_exceeded: Option<FailureSnapshot>,
    pub max_observed_time_ms: u64,
    pub memory_used_bytes: u64,
}

impl ComparisonVerdict<'_> {
    pub fn passed_count(&self) -> usize {
        self.per_test_case
            .iter()
            .filter(|outcome| outcome.status == OutcomeStatus::Passed)
            .count()
    }
}

/// Normalized submission payload handed to the persistence/display layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord<'a> {
    pub submission_id: Uuid,
    pub language: Language,
    pub evaluated_at: DateTime<Utc>,
    pub test_cases_passed: usize,
    pub total_test_cases: usize,
    #[serde(flatten)]
    pub verdict: ComparisonVerdict<'a>,
}

impl<'a> SubmissionRecord<'a> {
    pub fn new(language: Language, verdict: ComparisonVerdict<'a>) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            language,
            evaluated_at: Utc::now(),
            test_cases_passed: verdict.passed_count(),
            total_test_cases: verdict.per_test_case.len(),
            verdict,
        }
    }
}
