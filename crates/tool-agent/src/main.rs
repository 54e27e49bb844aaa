//! tool-agent: answer a question with a local LLM and a small tool belt

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use llm_core::{Config, OllamaClient, OllamaGenerator, OllamaStatus};
use tool_agent::agent::{AgentConfig, AgentLoop, DEFAULT_MAX_ITERATIONS};
use tool_agent::config::UserConfig;
use tool_agent::tools::builtin::create_default_registry;
use tool_agent::tools::ToolContext;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_DOCS_DIR: &str = "docs";

#[derive(Debug, Parser)]
#[command(name = "tool-agent")]
#[command(about = "Answer questions with a local LLM that can call tools", version)]
struct Cli {
    /// The question to answer
    #[arg(required = true)]
    question: Vec<String>,

    /// Maximum agent iterations
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_iterations: Option<u64>,

    /// Suppress the iteration trace
    #[arg(short, long)]
    quiet: bool,

    /// Model to use (aliases from the user config are resolved)
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Directory holding the documents for search_docs
    #[arg(long, env = "TOOL_AGENT_DOCS_DIR")]
    docs_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for the trace and the answer
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let user = UserConfig::load()?;
    let backend = Config::load()?;

    let model = cli
        .model
        .as_deref()
        .map(|m| user.resolve_model(m))
        .unwrap_or_else(|| backend.ollama.model.clone());
    let base_url = cli.ollama_url.clone().unwrap_or_else(|| backend.ollama_url());
    let docs_dir = cli
        .docs_dir
        .clone()
        .or_else(|| user.tools.docs_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR));
    let max_iterations = cli
        .max_iterations
        .map(|n| n as usize)
        .or(user.agent.max_iterations.filter(|&n| n > 0))
        .unwrap_or(DEFAULT_MAX_ITERATIONS);
    let quiet = cli.quiet || user.agent.quiet;

    let client = OllamaClient::with_timeout(base_url, backend.request_timeout())?;
    let generator = OllamaGenerator::new(client, model).with_retry(backend.retry.clone());

    info!(
        model = generator.model(),
        base_url = generator.client().base_url(),
        docs_dir = %docs_dir.display(),
        max_iterations,
        "Resolved configuration"
    );

    if generator.client().status().await == OllamaStatus::Stopped {
        warn!(
            base_url = generator.client().base_url(),
            "Ollama is not reachable; generation will likely fail"
        );
    }

    let registry = create_default_registry().context("Failed to build tool registry")?;

    let agent = AgentLoop::new(
        Arc::new(generator),
        Arc::new(registry),
        ToolContext::new(docs_dir),
        AgentConfig::new()
            .with_max_iterations(max_iterations)
            .with_verbose(!quiet),
    );

    let question = cli.question.join(" ");
    let outcome = agent.run(&question).await;
    debug!(
        termination = ?outcome.termination,
        iterations = outcome.iterations,
        tool_calls = outcome.tool_calls.len(),
        "Run finished"
    );

    if !quiet {
        let rule = "=".repeat(80);
        println!("\n{}", rule);
        println!("FINAL ANSWER");
        println!("{}", rule);
    }
    println!("{}", outcome.answer);

    Ok(())
}
