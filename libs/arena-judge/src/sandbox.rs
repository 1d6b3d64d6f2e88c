// Execution request payload for the external sandbox.
// The harness never calls the sandbox itself; callers submit this payload.

use arena_common::config::LanguageConfig;
use arena_common::types::{AssembledProgram, Language};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// Request body: language, runtime version, source files, optional stdin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub language: Language,
    pub version: String,
    pub files: Vec<SourceFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    pub compile_timeout: u64,
    pub run_timeout: u64,
}

impl ExecutionRequest {
    pub fn for_program(program: &AssembledProgram, config: &LanguageConfig) -> Self {
        Self {
            language: program.language,
            version: config.version.clone(),
            files: vec![SourceFile {
                name: config.file_name.clone(),
                content: program.source_text.clone(),
            }],
            stdin: None,
            compile_timeout: config.compile_timeout_ms,
            run_timeout: config.run_timeout_ms,
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }
}
