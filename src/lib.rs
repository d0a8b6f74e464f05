//! QA Grader - batch evaluation of question-answer pairs using a
//! locally-hosted LLM as an automated grading judge.
//!
//! # Overview
//!
//! Two pipelines share the same shape: resolve inputs, build a grading
//! prompt, call the grader, parse its free-text reply, accumulate, persist.
//!
//! - **Directory mode** pairs context text files with QA JSON files under a
//!   filter list, grades every QA pair against its file's context, and
//!   checkpoints two JSON summaries as it goes.
//! - **Tabular mode** reads a CSV dataset and grades each row twice against
//!   a deliberately mismatched context stitched from neighboring rows.
//!
//! # Quick Start
//!
//! ```no_run
//! use qa_grader::{
//!     batch::BatchRunner,
//!     config::Config,
//!     grader::AnswerGrader,
//!     llm::OllamaClient,
//!     resolve::{load_filters, resolve},
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     // Resolve work items under the scan root
//!     let filters = load_filters(Path::new("filters.json"))?;
//!     let resolution = resolve(Path::new("data/set1"), &filters);
//!
//!     // Grade everything sequentially
//!     let client = OllamaClient::new(config.ollama);
//!     let grader = AnswerGrader::new(client, "gemma3:27b");
//!     let store = BatchRunner::new(grader).run(&resolution).await?;
//!
//!     println!("Graded {} work items", store.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **OllamaClient**: client for the Ollama generate API
//! - **extract**: best-effort parsing of grades out of free-text replies
//! - **resolve**: pairs context text files with QA files under a filter list
//! - **AnswerGrader**: builds grading prompts and tags outcomes
//! - **BatchRunner**: sequential orchestration with periodic checkpoints
//! - **tabular**: the CSV pipeline with neighbor answers and stitched contexts

pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod grader;
pub mod llm;
pub mod neighbors;
pub mod resolve;
pub mod store;
pub mod tabular;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchRunner};
pub use config::Config;
pub use error::{GraderError, Result};
pub use extract::{GradingResult, extract_grading};
pub use grader::{AnswerGrader, GradeFailure, GradeOutcome};
pub use llm::OllamaClient;
pub use resolve::{Resolution, resolve};
pub use store::ResultStore;
pub use tabular::CsvJob;
