// CLI commands for AlgoArena
use anyhow::{Context, Result};
use arena_common::config::{LanguageConfigManager, LanguagesJson, Settings};
use arena_common::types::{AssembledProgram, TestCase};
use arena_judge::sandbox::ExecutionRequest;
use arena_judge::{compare, Assembler};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load languages configuration
fn load_languages_config(config_path: &Path) -> Result<LanguagesJson> {
    if !config_path.exists() {
        warn!(path = %config_path.display(), "Language config not found");
        return Ok(LanguagesJson { languages: vec![] });
    }

    let content = fs::read_to_string(config_path)
        .context("Failed to read languages.json")?;
    serde_json::from_str(&content)
        .context("Failed to parse languages.json")
}

/// Save languages configuration
fn save_languages_config(config_path: &Path, config: &LanguagesJson) -> Result<()> {
    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json_content = serde_json::to_string_pretty(&config)
        .context("Failed to serialize languages.json")?;

    fs::write(config_path, json_content)
        .context("Failed to write languages.json")?;

    Ok(())
}

/// Read a JSON array of test cases
fn read_test_cases(path: &str) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test cases: {}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse test cases: {}", path))
}

/// Source text, or the pretty-printed execution request when one is given
fn render_assembly(program: &AssembledProgram, request: Option<ExecutionRequest>) -> Result<String> {
    match request {
        Some(request) => serde_json::to_string_pretty(&request)
            .context("Failed to serialize execution request"),
        None => Ok(program.source_text.clone()),
    }
}

/// Assemble a driver program and write it out
pub async fn assemble_program(
    language: &str,
    code_path: &str,
    tests_path: &str,
    entry_point: Option<&str>,
    output: Option<&str>,
    as_request: bool,
) -> Result<()> {
    let settings = Settings::from_env();
    let entry_point = entry_point.unwrap_or(&settings.entry_point);

    let user_code = fs::read_to_string(code_path)
        .with_context(|| format!("Failed to read user code: {}", code_path))?;
    let test_cases = read_test_cases(tests_path)?;
    debug!(language, entry_point, test_cases = test_cases.len(), "Assembling program");

    let assembler = Assembler::new().context("Failed to register driver templates")?;
    let program = assembler
        .assemble_as(entry_point, language, &user_code, &test_cases)
        .with_context(|| format!("Failed to assemble {} program", language))?;

    let request = if as_request {
        let manager = LanguageConfigManager::load(&settings.languages_path)
            .context("Language runtimes unavailable (run `arena-cli init` first)")?;
        let config = manager.get_config(program.language)?;
        Some(ExecutionRequest::for_program(&program, config))
    } else {
        None
    };

    let rendered = render_assembly(&program, request)?;
    info!(
        language = %program.language,
        source_size = program.source_text.len(),
        as_request,
        "Program assembled"
    );

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path))?;
            println!("✅ Assembled {} program for {} test case(s) → {}",
                     program.language, test_cases.len(), path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Judge captured stdout and print the verdict
pub async fn compare_output(stdout_path: &str, tests_path: &str, memory_used_bytes: u64) -> Result<()> {
    let captured = fs::read_to_string(stdout_path)
        .with_context(|| format!("Failed to read captured stdout: {}", stdout_path))?;
    let test_cases = read_test_cases(tests_path)?;

    let verdict = compare(&captured, &test_cases, memory_used_bytes);
    info!(
        status = %verdict.overall_status,
        passed = verdict.passed_count(),
        total = verdict.per_test_case.len(),
        "Comparison finished"
    );
    let json = serde_json::to_string_pretty(&verdict)
        .context("Failed to serialize verdict")?;

    println!("{}", json);

    Ok(())
}

/// List all configured languages
pub async fn list_languages() -> Result<()> {
    let settings = Settings::from_env();
    let languages_json = load_languages_config(&settings.languages_path)?;

    if languages_json.languages.is_empty() {
        println!("No languages configured.");
        println!("\n💡 Create the default runtimes with: arena-cli init");
        return Ok(());
    }

    println!("📋 Configured Languages:\n");
    println!("{:<12} {:<10} {:<12} {:<16} {:<30}",
             "Name", "Version", "File", "Timeouts (ms)", "Aliases");
    println!("{}", "─".repeat(84));

    for lang in &languages_json.languages {
        println!("{:<12} {:<10} {:<12} {:<16} {:<30}",
                 lang.name,
                 lang.version,
                 lang.file_name,
                 format!("{}/{}", lang.compile_timeout_ms, lang.run_timeout_ms),
                 lang.aliases.join(", "));
    }

    println!("\n✅ Total: {} language(s)", languages_json.languages.len());

    Ok(())
}

/// Initialize a new AlgoArena project
pub async fn init_project(path: &str) -> Result<()> {
    println!("🚀 Initializing AlgoArena project at: {}", path);

    let project_path = Path::new(path);
    let config_dir = project_path.join("config");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create directory: {}", config_dir.display()))?;
    println!("  ✅ Created: config");

    // Create default languages.json
    let languages_json_path = project_path.join("config/languages.json");
    if languages_json_path.exists() {
        debug!(path = %languages_json_path.display(), "Keeping existing language config");
        println!("  ⏭️  Kept existing: config/languages.json");
    } else {
        save_languages_config(&languages_json_path, &LanguagesJson::builtin())?;
        println!("  ✅ Created: config/languages.json");
    }

    println!("✅ Project initialized successfully!");
    println!("\n📋 Next steps:");
    println!("  1. Assemble a program: arena-cli assemble --language python --code solution.py --tests tests.json");
    println!("  2. Run it in the sandbox and save stdout");
    println!("  3. Judge it: arena-cli compare --stdout out.txt --tests tests.json");

    Ok(())
}
