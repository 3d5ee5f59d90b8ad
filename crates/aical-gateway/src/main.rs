//! aical: calendar assistant main binary
//!
//! Usage:
//!   aical                                   - Start server mode (HTTP API)
//!   aical --extract FILE...                 - Print events from ICS files as JSON
//!   aical --analyze FILE... [--prompt TEXT] - Analyse files with the LLM
//!   aical --help                            - Show help

mod cli;

use aical_calendar::CalendarClient;
use aical_core::{Config, LlmClient};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Server mode (HTTP API)
    Server,
    /// Extract events from ICS files
    Extract { files: Vec<PathBuf> },
    /// Analyse uploaded files with the LLM
    Analyze {
        files: Vec<PathBuf>,
        prompt: Option<String>,
        html: bool,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let mode = parse_args(std::env::args().skip(1))?;

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("aical {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging (stderr, so CLI output stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    match mode {
        RunMode::Extract { files } => cli::run_extract(&files).await,
        RunMode::Analyze { files, prompt, html } => {
            let config = load_config()?;
            let llm = LlmClient::new(&config)
                .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;
            cli::run_analyze(&llm, &files, prompt, html).await
        }
        RunMode::Server => run_server(load_config()?).await,
        RunMode::Help | RunMode::Version => Ok(()),
    }
}

/// Load configuration and make sure an API key is present
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    if config.llm.api_key.is_empty() {
        anyhow::bail!("Config error: GEMINI_API_KEY or LLM_API_KEY not set");
    }

    tracing::info!("Model: {} ({:?})", config.llm.model, config.llm.provider);
    Ok(config)
}

/// Parse command line arguments (without the program name)
fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<RunMode> {
    let mut args = args.into_iter();
    let mut extract = false;
    let mut analyze = false;
    let mut html = false;
    let mut prompt = None;
    let mut files = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--extract" | "-e" => extract = true,
            "--analyze" | "-a" => analyze = true,
            "--html" => html = true,
            "--prompt" | "-p" => match args.next() {
                Some(text) => prompt = Some(text),
                None => anyhow::bail!("--prompt requires a value"),
            },
            other if other.starts_with('-') => anyhow::bail!("Unknown option: {}", other),
            file => files.push(PathBuf::from(file)),
        }
    }

    match (extract, analyze) {
        (true, true) => anyhow::bail!("--extract and --analyze cannot be combined"),
        (true, false) | (false, true) if files.is_empty() => {
            anyhow::bail!("No input files given")
        }
        (true, false) => Ok(RunMode::Extract { files }),
        (false, true) => Ok(RunMode::Analyze { files, prompt, html }),
        (false, false) if !files.is_empty() || prompt.is_some() || html => {
            anyhow::bail!("Input files need --extract or --analyze")
        }
        (false, false) => Ok(RunMode::Server),
    }
}

/// Print help message
fn print_help() {
    println!("aical - calendar assistant");
    println!();
    println!("Usage:");
    println!("  aical                          Start server mode (HTTP API)");
    println!("  aical --extract FILE...        Print events from .ics files as JSON");
    println!("  aical --analyze FILE...        Analyse .ics/.jpg/.png files with the LLM");
    println!("        [--prompt TEXT] [--html]");
    println!("  aical --help                   Show this help message");
    println!("  aical --version                Show version");
    println!();
    println!("Configuration is read from ./aical.toml when present.");
    println!();
    println!("Environment Variables:");
    println!("  GEMINI_API_KEY        API key (or LLM_API_KEY; required for server/analyze)");
    println!("  LLM_MODEL             Model name (default: gemini-2.0-flash)");
    println!("  LLM_PROVIDER          Provider: gemini or openai (default: gemini)");
    println!("  LLM_BASE_URL          Custom API endpoint");
    println!("  API_PORT              HTTP API port (default: 8000)");
    println!("  API_ALLOWED_ORIGINS   Comma-separated CORS origins (default: http://localhost:3000)");
    println!("  API_PUBLIC_URL        URL advertised in the agent card");
    println!("  CALENDAR_BACKEND_URL  Calendar backend (default: http://localhost:8090)");
    println!("  DEFAULT_TIMEZONE      Default timezone (default: Asia/Bangkok)");
}

/// Run server mode (HTTP API)
async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting aical...");

    let llm = LlmClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;
    let calendar = CalendarClient::new(config.calendar.backend_url.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create calendar client: {}", e))?;

    let server = tokio::spawn(aical_api::start_server(config, llm, calendar));

    tokio::select! {
        result = server => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}
