//! Accumulation and checkpointing of grading results.
//!
//! Scores and explanations live in two parallel maps keyed by work item
//! identity, index-aligned with each item's QA pair sequence. Every flush
//! rewrites both output files with the full accumulated state; a crash
//! between flushes loses only the work since the last one.

use crate::error::{GraderError, Result};
use crate::grader::GradeOutcome;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Filename for the per-item score arrays.
pub const SCORES_FILENAME: &str = "scores_summary12.json";

/// Filename for the per-item explanation arrays.
pub const EXPLANATIONS_FILENAME: &str = "explanations_summary12.json";

/// Path of the scores file inside an output directory.
pub fn scores_path(output_dir: &Path) -> PathBuf {
    output_dir.join(SCORES_FILENAME)
}

/// Path of the explanations file inside an output directory.
pub fn explanations_path(output_dir: &Path) -> PathBuf {
    output_dir.join(EXPLANATIONS_FILENAME)
}

/// In-memory accumulator for batch grading results.
///
/// A failed grading attempt is stored as a `null` score with the failure
/// description as its explanation, keeping "graded poorly" and "failed to
/// grade" distinguishable in the artifacts.
#[derive(Debug, Default)]
pub struct ResultStore {
    scores: BTreeMap<String, Vec<Option<i64>>>,
    explanations: BTreeMap<String, Vec<String>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcomes for one work item, replacing any prior entry.
    pub fn record(&mut self, key: &str, outcomes: &[GradeOutcome]) {
        let scores = outcomes.iter().map(GradeOutcome::score).collect();
        let explanations = outcomes.iter().map(GradeOutcome::explanation).collect();

        self.scores.insert(key.to_string(), scores);
        self.explanations.insert(key.to_string(), explanations);
    }

    /// Number of recorded work items.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The recorded scores for a key.
    pub fn scores(&self, key: &str) -> Option<&[Option<i64>]> {
        self.scores.get(key).map(Vec::as_slice)
    }

    /// The recorded explanations for a key.
    pub fn explanations(&self, key: &str) -> Option<&[String]> {
        self.explanations.get(key).map(Vec::as_slice)
    }

    /// Write both result files, overwriting prior contents.
    pub fn flush(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| GraderError::io(output_dir, e))?;
        }

        let scores_file = scores_path(output_dir);
        let data = serde_json::to_string_pretty(&self.scores)
            .map_err(|e| GraderError::Serialization(e.to_string()))?;
        fs::write(&scores_file, data).map_err(|e| GraderError::io(&scores_file, e))?;

        let explanations_file = explanations_path(output_dir);
        let data = serde_json::to_string_pretty(&self.explanations)
            .map_err(|e| GraderError::Serialization(e.to_string()))?;
        fs::write(&explanations_file, data).map_err(|e| GraderError::io(&explanations_file, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::GradingResult;
    use crate::grader::GradeFailure;
    use tempfile::TempDir;

    fn graded(score: i64) -> GradeOutcome {
        GradeOutcome::Graded(GradingResult {
            score,
            explanation: format!("scored {}", score),
        })
    }

    #[test]
    fn test_record_keeps_alignment() {
        let mut store = ResultStore::new();
        store.record(
            "set1/sub/x.json",
            &[
                graded(80),
                GradeOutcome::Failed(GradeFailure::CallFailed("refused".to_string())),
                graded(30),
            ],
        );

        assert_eq!(
            store.scores("set1/sub/x.json").unwrap(),
            &[Some(80), None, Some(30)]
        );
        let explanations = store.explanations("set1/sub/x.json").unwrap();
        assert_eq!(explanations.len(), 3);
        assert!(explanations[1].contains("refused"));
    }

    #[test]
    fn test_flush_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let mut store = ResultStore::new();
        store.record("set1/sub/x.json", &[graded(55)]);

        store.flush(dir.path()).unwrap();

        let scores: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(scores_path(dir.path())).unwrap()).unwrap();
        assert_eq!(scores["set1/sub/x.json"][0], 55);

        let explanations: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(explanations_path(dir.path())).unwrap())
                .unwrap();
        assert_eq!(explanations["set1/sub/x.json"][0], "scored 55");
    }

    #[test]
    fn test_failed_outcome_serializes_as_null() {
        let dir = TempDir::new().unwrap();
        let mut store = ResultStore::new();
        store.record(
            "set1/sub/x.json",
            &[GradeOutcome::Failed(GradeFailure::CallFailed(
                "timeout".to_string(),
            ))],
        );

        store.flush(dir.path()).unwrap();

        let scores: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(scores_path(dir.path())).unwrap()).unwrap();
        assert!(scores["set1/sub/x.json"][0].is_null());
    }

    #[test]
    fn test_flush_overwrites_with_full_state() {
        let dir = TempDir::new().unwrap();
        let mut store = ResultStore::new();

        store.record("set1/a.json", &[graded(10)]);
        store.flush(dir.path()).unwrap();

        store.record("set1/b.json", &[graded(20)]);
        store.flush(dir.path()).unwrap();

        let scores: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(scores_path(dir.path())).unwrap()).unwrap();
        // Second flush carries the whole accumulated state, not a delta.
        assert_eq!(scores["set1/a.json"][0], 10);
        assert_eq!(scores["set1/b.json"][0], 20);
    }
}
