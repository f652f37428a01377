//! codesim command-line interface.
//!
//! `embed` generates the embeddings artifact, `analyze` produces the enhanced
//! analysis (similar pairs plus model reports), and `report` prints the
//! statistics view of an existing embeddings artifact.

mod console;
mod input;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use codesim_analysis::{AnalysisEngine, AnalyzeRunner, SIMILARITY_THRESHOLD};
use codesim_embeddings::chat::ChatClient;
use codesim_embeddings::{EmbeddingClient, ServiceConfig, save_records};
use codesim_runner::{EmbedRunner, RunnerKind};

#[derive(Parser)]
#[command(
    name = "codesim",
    about = "Code embedding generation and similarity analysis",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate embeddings for every source file in a directory.
    Embed {
        /// Execution strategy for the batch.
        #[arg(long, value_enum, default_value_t = EmbedRunnerArg::Threads)]
        runner: EmbedRunnerArg,

        /// Directory of source files to embed.
        #[arg(long, default_value = "code_samples")]
        input_dir: PathBuf,

        /// Where to write the embeddings artifact.
        #[arg(long, default_value = "output/embeddings.json")]
        output: PathBuf,
    },

    /// Produce the enhanced analysis: similar pairs plus model reports.
    Analyze {
        /// Execution mode for the analysis run.
        #[arg(long, value_enum, default_value_t = AnalyzeRunnerArg::Local)]
        runner: AnalyzeRunnerArg,

        /// Embeddings artifact to analyze.
        #[arg(long, default_value = "output/embeddings.json")]
        embeddings: PathBuf,

        /// Where to write the enhanced-analysis artifact.
        #[arg(long, default_value = "output/enhanced_analysis.json")]
        output: PathBuf,

        /// Minimum similarity for reported pairs.
        #[arg(long, default_value_t = SIMILARITY_THRESHOLD)]
        threshold: f64,
    },

    /// Print per-file statistics and similar-code matches.
    Report {
        /// Embeddings artifact to report on.
        #[arg(long, default_value = "output/embeddings.json")]
        embeddings: PathBuf,

        /// Minimum similarity for reported matches.
        #[arg(long, default_value_t = SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
}

/// Embedding runner selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmbedRunnerArg {
    /// Threaded worker pool.
    Threads,
    /// Distributed frame backend.
    Ray,
    /// Local frame with a per-row UDF.
    Daft,
}

impl From<EmbedRunnerArg> for RunnerKind {
    fn from(arg: EmbedRunnerArg) -> Self {
        match arg {
            EmbedRunnerArg::Threads => Self::Threads,
            EmbedRunnerArg::Ray => Self::Ray,
            EmbedRunnerArg::Daft => Self::Daft,
        }
    }
}

/// Analysis runner selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnalyzeRunnerArg {
    /// In-process execution.
    Local,
    /// Distributed frame backend.
    Ray,
}

impl From<AnalyzeRunnerArg> for AnalyzeRunner {
    fn from(arg: AnalyzeRunnerArg) -> Self {
        match arg {
            AnalyzeRunnerArg::Local => Self::Local,
            AnalyzeRunnerArg::Ray => Self::Ray,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::from_env();

    match cli.command {
        Command::Embed {
            runner,
            input_dir,
            output,
        } => embed(config, runner.into(), &input_dir, &output).await,
        Command::Analyze {
            runner,
            embeddings,
            output,
            threshold,
        } => analyze(config, runner.into(), &embeddings, &output, threshold).await,
        Command::Report {
            embeddings,
            threshold,
        } => console::report(&embeddings, threshold).await,
    }
}

/// Distributed worker count, resolved once at the entry point.
fn distributed_workers_from_env() -> Option<usize> {
    std::env::var("CODESIM_RAY_WORKERS")
        .ok()
        .and_then(|raw| raw.parse().ok())
}

async fn embed(
    config: ServiceConfig,
    kind: RunnerKind,
    input_dir: &Path,
    output: &Path,
) -> Result<()> {
    let files = input::load_source_files(input_dir)?;
    println!("Found {} source files to analyze.", files.len());

    let mut runner = EmbedRunner::new(kind, EmbeddingClient::new(config));
    if let Some(workers) = distributed_workers_from_env() {
        runner = runner.with_distributed_workers(workers);
    }

    println!("Generating embeddings using runner='{kind}'...");
    let records = runner.run(files).await;
    save_records(output, &records).await?;

    println!("Embeddings saved to: {}", output.display());
    println!("Sample embeddings (first 5 dimensions):");
    for record in &records {
        let head: Vec<f64> = record.embedding.iter().take(5).copied().collect();
        println!("  {}: {head:?} ...", record.filename);
    }

    Ok(())
}

async fn analyze(
    config: ServiceConfig,
    runner: AnalyzeRunner,
    embeddings: &Path,
    output: &Path,
    threshold: f64,
) -> Result<()> {
    let chat = ChatClient::new(config);
    let mut engine = AnalysisEngine::new(chat, runner).with_threshold(threshold);
    if let Some(workers) = distributed_workers_from_env() {
        engine = engine.with_distributed_workers(workers);
    }

    let analysis = engine.run(embeddings).await?;
    console::print_analyses(&analysis);

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(&analysis)?;
    std::fs::write(output, content)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("\nEnhanced analysis saved to: {}", output.display());
    println!("Found {} similar code pairs.", analysis.similar_pairs.len());

    Ok(())
}
