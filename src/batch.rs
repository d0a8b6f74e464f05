//! Directory-mode batch orchestration.
//!
//! Drives resolved work items through the grader one QA pair at a time and
//! checkpoints the accumulated results at a fixed cadence.

use crate::error::Result;
use crate::grader::{AnswerGrader, GradeOutcome};
use crate::resolve::{Resolution, load_context, load_qa_pairs};
use crate::store::ResultStore;
use std::path::PathBuf;

/// Default flush cadence, in completed work items.
pub const CHECKPOINT_EVERY: usize = 10;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory the summary files are written to.
    pub output_dir: PathBuf,
    /// Flush the store every this many completed items (0 disables
    /// mid-run checkpoints; the final flush always happens).
    pub checkpoint_every: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            checkpoint_every: CHECKPOINT_EVERY,
        }
    }
}

/// Sequentially grades every resolved work item.
pub struct BatchRunner {
    grader: AnswerGrader,
    options: BatchOptions,
}

impl BatchRunner {
    /// Create a runner with default options.
    pub fn new(grader: AnswerGrader) -> Self {
        Self {
            grader,
            options: BatchOptions::default(),
        }
    }

    /// Create with custom options.
    pub fn with_options(grader: AnswerGrader, options: BatchOptions) -> Self {
        Self { grader, options }
    }

    /// Grade every work item in resolution order and return the filled store.
    ///
    /// A work item without a context text file aborts the whole run. Failed
    /// grader calls do not abort; they are recorded inline.
    pub async fn run(&self, resolution: &Resolution) -> Result<ResultStore> {
        let mut store = ResultStore::new();
        let total = resolution.len();

        for (done, item) in resolution.items().iter().enumerate() {
            println!("\nProcessing {}/{}: {}", done + 1, total, item.key);

            let context = load_context(item)?;
            let qa_pairs = load_qa_pairs(&item.qa_file)?;

            let mut outcomes = Vec::with_capacity(qa_pairs.len());
            for (idx, qa) in qa_pairs.iter().enumerate() {
                let outcome = self.grader.grade(&qa.question, &qa.answer, &context).await;

                match &outcome {
                    GradeOutcome::Graded(result) => {
                        println!(
                            "Processed QA pair {}/{}: score = {} points",
                            idx + 1,
                            qa_pairs.len(),
                            result.score
                        );
                        println!("\tExplanation: {}", result.explanation);
                        println!("\tQuestion: {}\n\tAnswer: {}", qa.question, qa.answer);
                    }
                    GradeOutcome::Failed(failure) => {
                        eprintln!(
                            "Error processing QA pair {}/{}: {}",
                            idx + 1,
                            qa_pairs.len(),
                            failure
                        );
                    }
                }

                outcomes.push(outcome);
            }

            store.record(&item.key, &outcomes);

            if checkpoint_due(done + 1, self.options.checkpoint_every) {
                store.flush(&self.options.output_dir)?;
                println!(
                    "Checkpoint: {} items flushed to {}",
                    store.len(),
                    self.options.output_dir.display()
                );
            }
        }

        store.flush(&self.options.output_dir)?;

        Ok(store)
    }
}

/// True when a periodic checkpoint is due after `completed` items.
fn checkpoint_due(completed: usize, every: usize) -> bool {
    every > 0 && completed % every == 0
}
