use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use posttag::{BatchProcessor, CompletionClient, GroqClientBuilder, LlmError, PipelineError};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT: &str = "data/processed_posts.json";

/// posttag - enrich social-media posts with LLM metadata and unified tags
#[derive(Parser)]
#[command(name = "posttag")]
#[command(about = "Enrich social-media posts with LLM-derived metadata and unified tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Enrich a JSON array of posts and unify their tags
    Process(ProcessCommand),
    /// Send a single prompt to the model and print the reply
    Ask(AskCommand),
}

/// Enrich a post collection
#[derive(Parser)]
struct ProcessCommand {
    /// JSON array of post objects, each with a "text" field
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the enriched posts
    #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Model identifier (overrides GROQ_MODEL)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,
}

/// Check connectivity with a one-off prompt
#[derive(Parser)]
struct AskCommand {
    /// The prompt to send
    #[arg(value_name = "PROMPT")]
    prompt: String,

    /// Model identifier (overrides GROQ_MODEL)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Process(cmd) => handle_process(cmd),
        Commands::Ask(cmd) => handle_ask(cmd),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are problems with what was supplied: an unreadable or invalid
/// input file, a missing API key, a bad base URL, an empty prompt. Everything
/// else (network, unification, write failures) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    if let Some(pipeline_error) = error.downcast_ref::<PipelineError>() {
        return pipeline_error.is_user_error();
    }
    if let Some(llm_error) = error.downcast_ref::<LlmError>() {
        return matches!(llm_error, LlmError::MissingApiKey | LlmError::InvalidUrl(_));
    }
    error.to_string().contains("cannot be empty")
}

/// Builds the completion client from flags, environment and defaults.
fn build_client(model: Option<&str>) -> Result<Arc<dyn CompletionClient>> {
    let mut builder = GroqClientBuilder::new();
    if let Some(model) = model {
        builder = builder.model(model);
    }
    let client = builder.build().context("Failed to configure LLM client")?;
    tracing::info!(model = client.model(), "using model");
    Ok(Arc::new(client))
}

/// Handles the process command by enriching the input file.
fn handle_process(cmd: &ProcessCommand) -> Result<()> {
    let client = build_client(cmd.model.as_deref())?;
    let processor = BatchProcessor::new(client);

    let summary = processor
        .process_file(&cmd.input, &cmd.output)
        .context("Failed to process posts")?;

    println!("{summary}");
    println!("Output written to {}", cmd.output.display());
    Ok(())
}

/// Handles the ask command by printing the model's reply.
fn handle_ask(cmd: &AskCommand) -> Result<()> {
    if cmd.prompt.trim().is_empty() {
        anyhow::bail!("Prompt cannot be empty");
    }

    let client = build_client(cmd.model.as_deref())?;
    let reply = client
        .complete(&cmd.prompt)
        .context("Failed to get a completion")?;

    println!("{reply}");
    Ok(())
}
