//! QA Grader CLI
//!
//! Batch-evaluates question-answer pairs against reference context using a
//! locally-hosted LLM as the grading judge.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qa_grader::{
    batch::{BatchOptions, BatchRunner},
    config::Config,
    grader::AnswerGrader,
    llm::OllamaClient,
    resolve::{load_filters, resolve},
    store,
    tabular::{CsvJob, run_csv},
};
use std::path::PathBuf;
use std::time::Instant;

/// QA Grader - LLM-judged batch evaluation of question-answer pairs
#[derive(Parser)]
#[command(name = "qa-grader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade QA files against their context documents under a directory tree
    Dir {
        /// Root directory to scan
        #[arg(long)]
        dir: PathBuf,

        /// JSON file listing relative filter paths
        #[arg(long)]
        file: PathBuf,

        /// Grader model identifier
        #[arg(long, default_value = "gemma3:27b")]
        model: String,

        /// Directory for the summary output files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Grade a CSV dataset with neighbor answers and stitched contexts
    Csv {
        /// Input CSV path
        #[arg(long)]
        input: PathBuf,

        /// Output CSV path
        #[arg(long)]
        output: PathBuf,

        /// Grader model identifier
        #[arg(long, default_value = "llama3.3:latest")]
        model: String,
    },

    /// Test the Ollama connection
    Test {
        /// Model to probe with
        #[arg(long, default_value = "gemma3:27b")]
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dir {
            dir,
            file,
            model,
            output_dir,
        } => cmd_dir(dir, file, model, output_dir).await,
        Commands::Csv {
            input,
            output,
            model,
        } => cmd_csv(input, output, model).await,
        Commands::Test { model } => cmd_test(model).await,
    }
}

async fn cmd_dir(dir: PathBuf, file: PathBuf, model: String, output_dir: PathBuf) -> Result<()> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let filters = load_filters(&file).context("Failed to load filter file")?;

    let resolution = resolve(&dir, &filters);
    println!(
        "Found {} filter paths, {} of them are absent.",
        filters.len(),
        resolution.absent
    );
    println!(
        "Recorded {} QA files with {} text files.",
        resolution.len(),
        resolution.with_text()
    );

    if resolution.is_empty() {
        println!("No matching text and QA file pairs found.");
        return Ok(());
    }

    println!("Using model: {}", model);

    let start = Instant::now();

    let client = OllamaClient::new(config.ollama);
    let grader = AnswerGrader::new(client, model);
    let runner = BatchRunner::with_options(
        grader,
        BatchOptions {
            output_dir: output_dir.clone(),
            ..Default::default()
        },
    );

    let results = runner
        .run(&resolution)
        .await
        .context("Batch grading failed")?;

    println!("\nGraded {} work items in {:.2?}", results.len(), start.elapsed());
    println!("Scores saved to {}", store::scores_path(&output_dir).display());
    println!(
        "Explanations saved to {}",
        store::explanations_path(&output_dir).display()
    );

    Ok(())
}

async fn cmd_csv(input: PathBuf, output: PathBuf, model: String) -> Result<()> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    println!("Using model: {}", model);

    let client = OllamaClient::new(config.ollama);
    let job = CsvJob {
        input,
        output,
        model,
    };

    run_csv(&client, &job).await.context("CSV grading failed")
}

async fn cmd_test(model: String) -> Result<()> {
    println!("Testing Ollama connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  Host:     {}", config.ollama.host);
    println!("  Model:    {}", model);
    println!("  num_ctx:  {}", config.ollama.num_ctx);
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = OllamaClient::new(config.ollama);

    println!("Sending test request...");
    match client.test_connection(&model).await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
