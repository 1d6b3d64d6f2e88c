mod commands;

use clap::{Parser, Subcommand};
use anyhow::Result;

#[derive(Parser)]
#[command(name = "arena-cli")]
#[command(about = "AlgoArena CLI - Assemble driver programs and judge sandbox output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a runnable program from user code and test cases
    Assemble {
        /// Language name or alias (e.g., java, c++, py, node)
        #[arg(short, long)]
        language: String,

        /// File containing the user's code
        #[arg(short, long)]
        code: String,

        /// JSON file containing the test cases
        #[arg(short, long)]
        tests: String,

        /// Function the driver calls (defaults to ARENA_ENTRY_POINT or "solution")
        #[arg(short, long)]
        entry_point: Option<String>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Emit the sandbox execution request instead of bare source
        #[arg(long, default_value = "false")]
        request: bool,
    },

    /// Compare captured sandbox stdout against the expected outputs
    Compare {
        /// File containing the captured stdout
        #[arg(short, long)]
        stdout: String,

        /// JSON file containing the test cases
        #[arg(short, long)]
        tests: String,

        /// Memory reported by the sandbox, in bytes
        #[arg(short, long, default_value = "0")]
        memory: u64,
    },

    /// List configured language runtimes
    Languages,

    /// Initialize a new AlgoArena project
    Init {
        /// Project path
        #[arg(short, long, default_value = ".")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Judge diagnostics go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble {
            language,
            code,
            tests,
            entry_point,
            output,
            request,
        } => {
            commands::assemble_program(
                &language,
                &code,
                &tests,
                entry_point.as_deref(),
                output.as_deref(),
                request,
            ).await?;
        }
        Commands::Compare { stdout, tests, memory } => {
            commands::compare_output(&stdout, &tests, memory).await?;
        }
        Commands::Languages => {
            commands::list_languages().await?;
        }
        Commands::Init { path } => {
            commands::init_project(&path).await?;
        }
    }

    Ok(())
}
