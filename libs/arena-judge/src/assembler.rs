/// Program Assembler - Per-Language Driver Generation
///
/// **Core Responsibility:**
/// Wrap a user-authored function in a driver that runs every test case in
/// order and prints the marker grammar from `arena_common::markers`.
///
/// **Critical Properties:**
/// - Executes nothing; returns source text only
/// - Does not validate user code (compile errors surface in the sandbox)
/// - Table-driven: each language is one `Target` entry in `TARGETS`
///
/// **Adding a language:**
/// Add a `Language` variant with its aliases, a template under `templates/`,
/// and one entry in `TARGETS`.

use crate::literal::{DynamicDialect, TypedDialect, ValueType};
use arena_common::config::DEFAULT_ENTRY_POINT;
use arena_common::markers;
use arena_common::types::{AssembledProgram, Language, TestCase};
use handlebars::{no_escape, Handlebars};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("at least one test case is required")]
    EmptyTestCases,
    #[error("test case {index} is missing parameter '{parameter}'")]
    MissingParameter { index: usize, parameter: String },
    #[error("parameter '{parameter}' cannot be embedded: {reason}")]
    UnsupportedInput { parameter: String, reason: String },
    #[error("invalid driver template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("failed to render driver: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// User code after language-specific structural adaptation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdaptedCode {
    /// Lines that must appear before the driver prelude (imports, includes)
    pub hoisted: Vec<String>,
    pub body: String,
    /// Type whose instance receives the call, when the code declares one
    pub receiver: Option<String>,
}

/// How a target embeds test case inputs
#[derive(Debug, Clone, Copy)]
enum CaseLayout {
    /// One literal per test case inside a list
    Dynamic {
        dialect: DynamicDialect,
        item_indent: usize,
        close_indent: usize,
    },
    /// One typed column array per parameter
    Typed {
        dialect: TypedDialect,
        decl_indent: usize,
    },
}

struct Target {
    language: Language,
    adapt: fn(&str, &str) -> AdaptedCode,
    layout: CaseLayout,
    template: &'static str,
}

static TARGETS: [Target; 4] = [
    Target {
        language: Language::Java,
        adapt: adapt_java,
        layout: CaseLayout::Typed {
            dialect: TypedDialect::Java,
            decl_indent: 8,
        },
        template: include_str!("../templates/java.hbs"),
    },
    Target {
        language: Language::Cpp,
        adapt: adapt_cpp,
        layout: CaseLayout::Typed {
            dialect: TypedDialect::Cpp,
            decl_indent: 4,
        },
        template: include_str!("../templates/cpp.hbs"),
    },
    Target {
        language: Language::Python,
        adapt: adapt_python,
        layout: CaseLayout::Dynamic {
            dialect: DynamicDialect::Python,
            item_indent: 8,
            close_indent: 4,
        },
        template: include_str!("../templates/python.hbs"),
    },
    Target {
        language: Language::Javascript,
        adapt: adapt_javascript,
        layout: CaseLayout::Dynamic {
            dialect: DynamicDialect::Javascript,
            item_indent: 4,
            close_indent: 0,
        },
        template: include_str!("../templates/javascript.hbs"),
    },
];

fn target_for(language: Language) -> &'static Target {
    TARGETS
        .iter()
        .find(|target| target.language == language)
        .unwrap_or_else(|| unreachable!("every language has a registry entry"))
}

/// Template data shared by all drivers
#[derive(Debug, Serialize)]
struct DriverContext<'a> {
    hoisted: String,
    user_code: String,
    entry_point: &'a str,
    receiver: String,
    call_prefix: String,
    cases: String,
    spread: bool,
    columns: String,
    arguments: String,
    case_count: usize,
    start: &'static str,
    output: &'static str,
    time: &'static str,
    end: &'static str,
}

pub struct Assembler {
    registry: Handlebars<'static>,
    entry_point: String,
}

impl Assembler {
    /// Build an assembler with every driver template registered
    pub fn new() -> Result<Self, AssembleError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);

        for target in &TARGETS {
            registry
                .register_template_string(target.language.tag(), target.template)
                .map_err(Box::new)?;
        }

        Ok(Self {
            registry,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        })
    }

    /// Name of the user function the driver calls
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Assemble a runnable program for `language`
    pub fn assemble(
        &self,
        language: &str,
        user_code: &str,
        test_cases: &[TestCase],
    ) -> Result<AssembledProgram, AssembleError> {
        self.assemble_as(&self.entry_point, language, user_code, test_cases)
    }

    /// Assemble a program whose driver calls `entry_point` instead of the default
    pub fn assemble_as(
        &self,
        entry_point: &str,
        language: &str,
        user_code: &str,
        test_cases: &[TestCase],
    ) -> Result<AssembledProgram, AssembleError> {
        let language = Language::from_alias(language)
            .ok_or_else(|| AssembleError::UnsupportedLanguage(language.to_string()))?;

        if test_cases.is_empty() {
            return Err(AssembleError::EmptyTestCases);
        }

        let parameters = parameter_names(test_cases)?;
        let target = target_for(language);
        let adapted = (target.adapt)(user_code, entry_point);

        debug!(
            language = %language,
            parameters = ?parameters,
            receiver = ?adapted.receiver,
            hoisted = adapted.hoisted.len(),
            "Adapted user code"
        );

        let mut context = DriverContext {
            hoisted: adapted.hoisted.join("\n"),
            user_code: adapted.body,
            entry_point,
            receiver: String::new(),
            call_prefix: String::new(),
            cases: String::new(),
            spread: parameters.len() != 1,
            columns: String::new(),
            arguments: String::new(),
            case_count: test_cases.len(),
            start: markers::TC_START,
            output: markers::OUTPUT,
            time: markers::TIME,
            end: markers::TC_END,
        };

        match target.layout {
            CaseLayout::Dynamic {
                dialect,
                item_indent,
                close_indent,
            } => {
                context.cases =
                    dynamic_cases(dialect, &parameters, test_cases, item_indent, close_indent);
            }
            CaseLayout::Typed {
                dialect,
                decl_indent,
            } => {
                context.columns = typed_columns(dialect, &parameters, test_cases, decl_indent)?;
                context.arguments = (0..parameters.len())
                    .map(|j| format!("param{}[i]", j))
                    .collect::<Vec<_>>()
                    .join(", ");
                match dialect {
                    TypedDialect::Java => {
                        context.receiver =
                            adapted.receiver.unwrap_or_else(|| "Main".to_string());
                    }
                    TypedDialect::Cpp => {
                        if let Some(receiver) = adapted.receiver {
                            context.receiver = format!("    {} target;", receiver);
                            context.call_prefix = "target.".to_string();
                        }
                    }
                }
            }
        }

        let source_text = self.registry.render(language.tag(), &context)?;

        info!(
            language = %language,
            entry_point,
            test_cases = test_cases.len(),
            source_size = source_text.len(),
            "Assembled program"
        );

        Ok(AssembledProgram {
            source_text,
            language,
        })
    }
}

/// Assemble with the default entry point
pub fn assemble(
    language: &str,
    user_code: &str,
    test_cases: &[TestCase],
) -> Result<AssembledProgram, AssembleError> {
    Assembler::new()?.assemble(language, user_code, test_cases)
}

/// Parameter order comes from the first test case; every case must supply all of them
fn parameter_names(test_cases: &[TestCase]) -> Result<Vec<String>, AssembleError> {
    let names: Vec<String> = test_cases[0].input.keys().cloned().collect();

    for (index, test_case) in test_cases.iter().enumerate() {
        if let Some(missing) = names.iter().find(|name| !test_case.input.contains_key(*name)) {
            return Err(AssembleError::MissingParameter {
                index,
                parameter: missing.clone(),
            });
        }
    }

    Ok(names)
}

fn argument<'a>(test_case: &'a TestCase, parameter: &str) -> &'a Value {
    // presence checked by parameter_names
    &test_case.input[parameter]
}

fn dynamic_cases(
    dialect: DynamicDialect,
    parameters: &[String],
    test_cases: &[TestCase],
    item_indent: usize,
    close_indent: usize,
) -> String {
    let items: Vec<String> = test_cases
        .iter()
        .map(|test_case| {
            let args: Vec<String> = parameters
                .iter()
                .map(|parameter| dialect.render(argument(test_case, parameter)))
                .collect();
            let literal = if args.len() == 1 {
                args[0].clone()
            } else {
                dialect.argument_pack(&args)
            };
            format!("{}{}", " ".repeat(item_indent), literal)
        })
        .collect();

    format!("[\n{}\n{}]", items.join(",\n"), " ".repeat(close_indent))
}

fn typed_columns(
    dialect: TypedDialect,
    parameters: &[String],
    test_cases: &[TestCase],
    decl_indent: usize,
) -> Result<String, AssembleError> {
    let indent = " ".repeat(decl_indent);
    let item_indent = " ".repeat(decl_indent + 4);
    let mut columns = Vec::with_capacity(parameters.len());

    for (j, parameter) in parameters.iter().enumerate() {
        let values: Vec<&Value> = test_cases
            .iter()
            .map(|test_case| argument(test_case, parameter))
            .collect();

        let column_type = ValueType::infer_all(values.iter().copied()).map_err(|reason| {
            AssembleError::UnsupportedInput {
                parameter: parameter.clone(),
                reason,
            }
        })?;

        let element = dialect.type_name(&column_type);
        let declared = match dialect {
            TypedDialect::Java => format!("{}[]", element),
            TypedDialect::Cpp => format!("std::vector<{}>", element),
        };
        let items: Vec<String> = values
            .iter()
            .map(|value| format!("{}{}", item_indent, dialect.render(value, &column_type)))
            .collect();

        columns.push(format!(
            "{indent}{declared} param{j} = {{\n{items}\n{indent}}};",
            indent = indent,
            declared = declared,
            j = j,
            items = items.join(",\n"),
        ));
    }

    Ok(columns.join("\n"))
}

// ---- per-language adaptation ----

const JAVA_TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum", "record"];
const JAVA_MODIFIERS: &[&str] = &["public", "static", "final", "abstract", "sealed"];
const CPP_PRELUDE: &[&str] = &[
    "#include <chrono>",
    "#include <cmath>",
    "#include <cstdlib>",
    "#include <iomanip>",
    "#include <iostream>",
    "#include <sstream>",
    "#include <string>",
    "#include <vector>",
    "using namespace std;",
];

fn is_top_level(line: &str) -> bool {
    !line.starts_with(char::is_whitespace)
}

fn identifier(token: &str) -> String {
    token
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

/// Indent every non-blank line, dropping blank lines at either end
fn indent_block(code: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    let lines: Vec<&str> = code.lines().collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    let lines = match (first, last) {
        (Some(first), Some(last)) => &lines[first..=last],
        _ => &lines[..0],
    };

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when `line` declares a method called `name` rather than calling it
fn declares_method(line: &str, name: &str) -> bool {
    let call = format!("{}(", name);
    line.match_indices(&call).any(|(at, _)| {
        let before = line[..at].trim_end();
        let Some(previous) = before.split_whitespace().last() else {
            return false;
        };
        line[..at].ends_with(char::is_whitespace)
            && !["return", "new", "else", "throw"].contains(&previous)
            && !previous.ends_with(|c: char| "=(),.;!&|+-*/?:".contains(c))
    })
}

fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

/// Java: hoist imports, nest top-level types inside `Main` as static members.
/// The receiver is `Solution`, else the first class declaring the entry point.
fn adapt_java(code: &str, entry_point: &str) -> AdaptedCode {
    let mut hoisted = Vec::new();
    let mut body = Vec::new();
    let mut has_solution = false;
    let mut declaring_class = None;
    let mut current_class: Option<String> = None;
    let mut depth = 0i64;

    for line in code.lines() {
        let trimmed = line.trim();
        let line_depth = depth;
        depth += brace_delta(line);

        if line_depth == 1 && declares_method(trimmed, entry_point) {
            if let Some(class) = &current_class {
                declaring_class.get_or_insert_with(|| class.clone());
            }
        }

        if is_top_level(line) && trimmed.starts_with("import ") {
            hoisted.push(trimmed.to_string());
            continue;
        }
        if is_top_level(line) && trimmed.starts_with("package ") {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let keyword_at = tokens
            .iter()
            .position(|token| !JAVA_MODIFIERS.contains(token));

        match keyword_at {
            Some(k) if is_top_level(line) && JAVA_TYPE_KEYWORDS.contains(&tokens[k]) => {
                let name = tokens.get(k + 1).map(|t| identifier(t)).unwrap_or_default();
                if line_depth == 0 {
                    current_class = (tokens[k] == "class").then(|| name.clone());
                    has_solution |= tokens[k] == "class" && name == "Solution";
                }

                let kept: Vec<&str> = tokens[..k]
                    .iter()
                    .copied()
                    .filter(|m| *m != "public" && *m != "static")
                    .collect();
                let mut rewritten = vec!["static"];
                rewritten.extend(kept);
                rewritten.extend(&tokens[k..]);
                body.push(rewritten.join(" "));
            }
            _ => {
                if line_depth == 0 && !trimmed.is_empty() && !trimmed.starts_with('{') {
                    current_class = None;
                }
                body.push(line.to_string());
            }
        }
    }

    let receiver = if has_solution {
        Some("Solution".to_string())
    } else {
        declaring_class
    };

    AdaptedCode {
        hoisted,
        body: indent_block(&body.join("\n"), 4),
        receiver,
    }
}

/// C++: hoist includes and using-directives, detect a `Solution` type
fn adapt_cpp(code: &str, _entry_point: &str) -> AdaptedCode {
    let mut hoisted: Vec<String> = Vec::new();
    let mut body = Vec::new();
    let mut receiver = None;

    for line in code.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("#include") || trimmed.starts_with("using namespace") {
            let directive = trimmed.to_string();
            if !CPP_PRELUDE.contains(&trimmed) && !hoisted.contains(&directive) {
                hoisted.push(directive);
            }
            continue;
        }

        if is_top_level(line) {
            let mut tokens = trimmed.split_whitespace();
            if let (Some("class" | "struct"), Some(name)) = (tokens.next(), tokens.next()) {
                if identifier(name) == "Solution" {
                    receiver = Some("Solution".to_string());
                }
            }
        }
        body.push(line);
    }

    AdaptedCode {
        hoisted,
        body: body.join("\n"),
        receiver,
    }
}

/// Python: normalize line endings; the driver resolves the entry point at runtime
fn adapt_python(code: &str, _entry_point: &str) -> AdaptedCode {
    AdaptedCode {
        body: code.replace("\r\n", "\n").trim_end().to_string(),
        ..AdaptedCode::default()
    }
}

/// JavaScript: drop module export keywords so declarations stay script-scoped
fn adapt_javascript(code: &str, _entry_point: &str) -> AdaptedCode {
    let body = code
        .lines()
        .map(|line| {
            line.strip_prefix("export default ")
                .or_else(|| line.strip_prefix("export "))
                .unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    AdaptedCode {
        body: body.trim_end().to_string(),
        ..AdaptedCode::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_test_case(input: Value, expected: Value) -> TestCase {
        TestCase {
            input: input.as_object().cloned().unwrap_or_default(),
            expected_output: expected,
            expected_time_limit: 1000,
        }
    }

    fn three_sum_cases() -> Vec<TestCase> {
        vec![
            make_test_case(json!({"nums": [-1, 0, 1, 2, -1, -4]}), json!([[-1, -1, 2], [-1, 0, 1]])),
            make_test_case(json!({"nums": [0, 1, 1]}), json!([])),
            make_test_case(json!({"nums": [0, 0, 0]}), json!([[0, 0, 0]])),
        ]
    }

    fn assembler() -> Assembler {
        Assembler::new().unwrap().with_entry_point("threeSum")
    }

    #[test]
    fn test_python_scenario_embeds_cases() {
        let cases = vec![make_test_case(json!({"nums": [-1, 0, 1]}), json!([[-1, 0, 1]]))];
        let code = "def threeSum(nums):\n    return [sorted(nums)]\n";

        let program = assembler().assemble("python", code, &cases).unwrap();

        assert_eq!(program.language, Language::Python);
        assert!(program
            .source_text
            .contains("test_cases = [\n        [-1, 0, 1]\n    ]"));
        assert!(program.source_text.contains("print(\"TC_START:\" + str(index), flush=True)"));
        assert!(program.source_text.contains("print(\"TC_END:\" + str(index), flush=True)"));
        assert!(program.source_text.contains("result = target(case)"));
        assert!(program.source_text.starts_with("import json\nimport time\n\ndef threeSum"));
    }

    #[test]
    fn test_every_language_emits_each_marker_once_per_driver_loop() {
        let cases = three_sum_cases();
        for language in ["java", "cpp", "python", "javascript"] {
            let program = assembler().assemble(language, "", &cases).unwrap();
            for marker in [markers::TC_START, markers::OUTPUT, markers::TIME, markers::TC_END] {
                assert_eq!(
                    program.source_text.matches(marker).count(),
                    1,
                    "{} driver should print {} from a single loop",
                    language,
                    marker
                );
            }
            let start = program.source_text.find(markers::TC_START).unwrap();
            let output = program.source_text.find(markers::OUTPUT).unwrap();
            let time = program.source_text.find(markers::TIME).unwrap();
            let end = program.source_text.find(markers::TC_END).unwrap();
            assert!(start < output && output < time && time < end);
        }
    }

    #[test]
    fn test_cases_embedded_in_order_for_every_language() {
        let cases = three_sum_cases();
        let expected_order = ["-1, 0, 1, 2, -1, -4", "0, 1, 1", "0, 0, 0"];
        for language in Language::ALL {
            let program = assembler().assemble(language.tag(), "", &cases).unwrap();
            let positions: Vec<usize> = expected_order
                .iter()
                .map(|needle| program.source_text.find(needle).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", language);
        }
    }

    #[test]
    fn test_unsupported_language() {
        let err = assembler().assemble("ruby", "def f; end", &three_sum_cases()).unwrap_err();
        assert!(matches!(err, AssembleError::UnsupportedLanguage(ref name) if name == "ruby"));
        assert_eq!(err.to_string(), "unsupported language: ruby");
    }

    #[test]
    fn test_aliases_normalize_language() {
        let cases = three_sum_cases();
        assert_eq!(assembler().assemble("JS", "", &cases).unwrap().language, Language::Javascript);
        assert_eq!(assembler().assemble("c++", "", &cases).unwrap().language, Language::Cpp);
    }

    #[test]
    fn test_empty_test_cases_rejected() {
        let err = assembler().assemble("python", "", &[]).unwrap_err();
        assert!(matches!(err, AssembleError::EmptyTestCases));
    }

    #[test]
    fn test_missing_parameter_rejected() {
        let cases = vec![
            make_test_case(json!({"nums": [1], "target": 1}), json!(0)),
            make_test_case(json!({"nums": [2]}), json!(0)),
        ];
        let err = assembler().assemble("python", "", &cases).unwrap_err();
        assert!(matches!(
            err,
            AssembleError::MissingParameter { index: 1, ref parameter } if parameter == "target"
        ));
    }

    #[test]
    fn test_typed_targets_reject_null_input() {
        let cases = vec![make_test_case(json!({"head": null}), json!(null))];
        let err = assembler().assemble("java", "", &cases).unwrap_err();
        assert!(matches!(err, AssembleError::UnsupportedInput { ref parameter, .. } if parameter == "head"));

        // dynamic targets embed null directly
        let program = assembler().assemble("python", "", &cases).unwrap();
        assert!(program.source_text.contains("        None\n    ]"));
    }

    #[test]
    fn test_multiple_parameters_are_spread() {
        let cases = vec![make_test_case(json!({"nums": [2, 7], "target": 9}), json!([0, 1]))];

        let python = assembler().assemble("python", "", &cases).unwrap();
        assert!(python.source_text.contains("        ([2, 7], 9)\n    ]"));
        assert!(python.source_text.contains("result = target(*case)"));

        let js = assembler().assemble("javascript", "", &cases).unwrap();
        assert!(js.source_text.contains("const arenaCases = [\n    [[2, 7], 9]\n];"));
        assert!(js.source_text.contains("arenaTarget(...testCase)"));

        let java = assembler().assemble("java", "", &cases).unwrap();
        assert!(java.source_text.contains("        int[][] param0 = {\n            {2, 7}\n        };"));
        assert!(java.source_text.contains("        int[] param1 = {\n            9\n        };"));
        assert!(java.source_text.contains("target.threeSum(param0[i], param1[i])"));

        let cpp = assembler().assemble("cpp", "", &cases).unwrap();
        assert!(cpp
            .source_text
            .contains("    std::vector<std::vector<int>> param0 = {\n        {2, 7}\n    };"));
        assert!(cpp.source_text.contains("threeSum(param0[i], param1[i])"));
    }

    #[test]
    fn test_java_nests_solution_and_hoists_imports() {
        let code = "import java.util.List;\n\npublic class Solution {\n    public List<List<Integer>> threeSum(int[] nums) {\n        return new ArrayList<>();\n    }\n}\n";

        let program = assembler().assemble("java", code, &three_sum_cases()).unwrap();
        let source = &program.source_text;

        assert!(source.starts_with("import java.util.List;\nimport java.util.*;"));
        assert!(source.contains("public class Main {\n    static class Solution {"));
        assert!(source.contains("        public List<List<Integer>> threeSum(int[] nums) {"));
        assert!(source.contains("Solution target = new Solution();"));
        assert!(!source.contains("public class Solution"));
    }

    #[test]
    fn test_java_without_class_calls_main() {
        let code = "public static int solution(int[] nums) {\n    return nums.length;\n}";
        let cases = vec![make_test_case(json!({"nums": [1, 2]}), json!(2))];

        let program = Assembler::new().unwrap().assemble("java", code, &cases).unwrap();
        assert!(program.source_text.contains("Main target = new Main();"));
        assert!(program.source_text.contains("    public static int solution(int[] nums) {"));
    }

    #[test]
    fn test_adapt_java_prefers_solution_receiver() {
        let code = "class ListNode {\n    int val;\n}\nfinal class Solution {\n}\n";
        let adapted = adapt_java(code, "solution");
        assert_eq!(adapted.receiver.as_deref(), Some("Solution"));
        assert!(adapted.body.contains("    static class ListNode {"));
        assert!(adapted.body.contains("    static final class Solution {"));
    }

    #[test]
    fn test_java_helper_class_is_not_receiver() {
        let code = "class Pair {\n    int first;\n    int second;\n}\n\npublic static int solution(int[] nums) {\n    return nums.length;\n}";
        let cases = vec![make_test_case(json!({"nums": [1, 2]}), json!(2))];

        let program = Assembler::new().unwrap().assemble("java", code, &cases).unwrap();
        let source = &program.source_text;

        assert!(source.contains("    static class Pair {"));
        assert!(source.contains("        Main target = new Main();"));
        assert!(source.contains("Object result = target.solution(param0[i]);"));
        assert!(!source.contains("Pair target"));
    }

    #[test]
    fn test_java_receiver_is_class_declaring_entry_point() {
        let code = "class Pair {\n    int first;\n    int solutionCount() { return 0; }\n}\n\nclass Finder {\n    private int calls = 0;\n\n    public int solution(int[] nums) {\n        calls++;\n        return new Pair().first + nums.length;\n    }\n}";
        let adapted = adapt_java(code, "solution");
        assert_eq!(adapted.receiver.as_deref(), Some("Finder"));

        // calls inside method bodies do not count as declarations
        let code = "class Runner {\n    int run(int[] nums) {\n        return solution(nums);\n    }\n}\nstatic int solution(int[] nums) {\n    return 0;\n}";
        assert_eq!(adapt_java(code, "solution").receiver, None);
    }

    #[test]
    fn test_declares_method() {
        assert!(declares_method("public int solution(int[] nums) {", "solution"));
        assert!(declares_method("List<List<Integer>> solution(int[] nums)", "solution"));
        assert!(!declares_method("return solution(nums);", "solution"));
        assert!(!declares_method("int x = solution(nums);", "solution"));
        assert!(!declares_method("helper.solution(nums);", "solution"));
        assert!(!declares_method("int mysolution(int a) {", "solution"));
    }

    #[test]
    fn test_java_driver_serializes_doubles() {
        let cases = vec![make_test_case(json!({"nums": [1, 2, 4]}), json!(2.3333333333333335))];
        let code = "public double average(int[] nums) {\n    return java.util.Arrays.stream(nums).average().orElse(0);\n}";
        let program = Assembler::new()
            .unwrap()
            .with_entry_point("average")
            .assemble("java", code, &cases)
            .unwrap();
        let source = &program.source_text;

        assert!(source.contains(
            "            } else if (value instanceof Double || value instanceof Float) {\n                decimal(out, ((Number) value).doubleValue(), value.toString());\n"
        ));
        assert!(source.contains(
            "java.math.BigDecimal exact = new java.math.BigDecimal(text).stripTrailingZeros();"
        ));
        assert!(source.contains("int point = length - exact.scale();"));
        assert!(source.contains("            if (point >= length && point <= 16) {"));
        assert!(source.contains("out.append(\".0\");"));
        assert!(source.contains("out.append(1 / number < 0 ? \"-0.0\" : \"0.0\");"));
        assert!(source.contains("System.out.println(\"OUTPUT:\" + ArenaJson.write(result));"));
        assert!(source.contains("Object result = target.average(param0[i]);"));
    }

    #[test]
    fn test_cpp_driver_serializes_doubles() {
        let cases = vec![make_test_case(json!({"nums": [1, 2, 4]}), json!(2.3333333333333335))];
        let code = "#include <iomanip>\n#include <numeric>\ndouble average(vector<int>& nums) {\n    return accumulate(nums.begin(), nums.end(), 0.0) / nums.size();\n}";
        let program = Assembler::new()
            .unwrap()
            .with_entry_point("average")
            .assemble("cpp", code, &cases)
            .unwrap();
        let source = &program.source_text;

        assert!(source.starts_with("#include <numeric>\n#include <chrono>\n#include <cmath>"));
        assert_eq!(source.matches("#include <iomanip>").count(), 1);
        assert!(source.contains(
            "        attempt << std::scientific << std::setprecision(precision - 1) << value;\n        sci = attempt.str();\n        if (std::strtod(sci.c_str(), nullptr) == value) break;"
        ));
        assert!(source.contains("    if (std::isnan(value) || std::isinf(value)) return \"null\";"));
        assert!(source.contains("    if (value == 0) return std::signbit(value) ? \"-0.0\" : \"0.0\";"));
        assert!(source.contains("        out = digits + std::string(point - length, '0') + \".0\";"));
        assert!(source.contains("        out = \"0.\" + std::string(-point, '0') + digits;"));
        assert!(source.contains("auto result = average(param0[i]);"));
        assert!(source.contains("std::cout << \"OUTPUT:\" << arena_json(result) << \"\\n\";"));
    }

    #[test]
    fn test_dynamic_drivers_serialize_with_json_builtins() {
        let cases = three_sum_cases();
        let python = assembler().assemble("python", "", &cases).unwrap();
        assert!(python.source_text.contains("        print(\"OUTPUT:\" + json.dumps(result))\n"));

        let js = assembler().assemble("javascript", "", &cases).unwrap();
        assert!(js.source_text.contains("    console.log(\"OUTPUT:\" + JSON.stringify(result));\n"));
    }

    #[test]
    fn test_adapt_cpp_hoists_and_dedupes_directives() {
        let code = "#include <vector>\n#include <algorithm>\n#include <algorithm>\nusing namespace std;\n\nclass Solution {\npublic:\n    int solution(vector<int>& nums) { return nums.size(); }\n};\n";
        let adapted = adapt_cpp(code, "solution");
        assert_eq!(adapted.hoisted, vec!["#include <algorithm>".to_string()]);
        assert_eq!(adapted.receiver.as_deref(), Some("Solution"));
        assert!(!adapted.body.contains("#include"));
    }

    #[test]
    fn test_cpp_free_function_call() {
        let code = "int solution(vector<int>& nums) { return nums.size(); }";
        let cases = vec![make_test_case(json!({"nums": [1, 2]}), json!(2))];
        let program = Assembler::new().unwrap().assemble("cpp", code, &cases).unwrap();
        assert!(program.source_text.contains("auto result = solution(param0[i]);"));
        assert!(!program.source_text.contains("Solution target;"));
    }

    #[test]
    fn test_cpp_solution_receiver() {
        let code = "class Solution {\npublic:\n    int solution(vector<int>& nums) { return 0; }\n};";
        let cases = vec![make_test_case(json!({"nums": [1]}), json!(0))];
        let program = Assembler::new().unwrap().assemble("cpp", code, &cases).unwrap();
        assert!(program.source_text.contains("    Solution target;\n"));
        assert!(program.source_text.contains("auto result = target.solution(param0[i]);"));
    }

    #[test]
    fn test_adapt_javascript_strips_exports() {
        let adapted = adapt_javascript(
            "export default function solution(nums) {\n  return nums;\n}\nexport const x = 1;\n",
            "solution",
        );
        assert_eq!(adapted.body, "function solution(nums) {\n  return nums;\n}\nconst x = 1;");
    }

    #[test]
    fn test_adapt_python_normalizes_line_endings() {
        let adapted = adapt_python("def solution(x):\r\n    return x\r\n\r\n", "solution");
        assert_eq!(adapted.body, "def solution(x):\n    return x");
        assert!(adapted.hoisted.is_empty());
    }

    #[test]
    fn test_registry_has_one_target_per_language() {
        for language in Language::ALL {
            assert_eq!(target_for(language).language, language);
        }
        assert_eq!(TARGETS.len(), Language::ALL.len());
    }

    #[test]
    fn test_free_function_uses_default_entry_point() {
        let cases = vec![make_test_case(json!({"n": 3}), json!(6))];
        let program = assemble("js", "function solution(n) { return n * 2; }", &cases).unwrap();
        assert!(program.source_text.contains("return solution;"));
        assert!(program.source_text.contains("const arenaCases = [\n    3\n];"));
    }
}
