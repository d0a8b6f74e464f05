//! Pairing of context text files with their structured QA files.
//!
//! Given a scan root and a list of relative filter paths, each filter path
//! names a QA JSON file; the file's directory is scanned recursively for the
//! single context text file that the QA pairs are graded against.

use crate::error::{GraderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A question-answer pair loaded from a QA JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QAPair {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// One unit of grading work, resolved but not yet loaded.
#[derive(Debug, Clone)]
pub struct ResolvedItem {
    /// Stable identity: the scan root's folder name followed by the
    /// filter path, e.g. `set1/sub/x.json`.
    pub key: String,
    /// Context text file, if one was found.
    pub text_file: Option<PathBuf>,
    /// The QA JSON file named by the filter path.
    pub qa_file: PathBuf,
}

/// Outcome of resolving a filter list against a scan root.
#[derive(Debug, Default)]
pub struct Resolution {
    items: Vec<ResolvedItem>,
    index: HashMap<String, usize>,
    /// Filter paths whose QA file does not exist on disk.
    pub absent: usize,
}

impl Resolution {
    /// Resolved items in filter-list order.
    pub fn items(&self) -> &[ResolvedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// How many resolved entries found an associated text file.
    pub fn with_text(&self) -> usize {
        self.items.iter().filter(|i| i.text_file.is_some()).count()
    }

    /// Insert or overwrite the entry for a key, keeping its position.
    fn upsert(&mut self, item: ResolvedItem) {
        match self.index.get(&item.key) {
            Some(&at) => self.items[at] = item,
            None => {
                self.index.insert(item.key.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }
}

/// Resolve a filter list against a scan root.
///
/// For each filter path, every directory under the QA file's parent is
/// scanned for a context text file; the entry for the key is overwritten per
/// scanned directory, so the last directory walked wins. A filter whose
/// parent directory does not exist on disk yields no entry and is counted
/// as absent. Missing text files are recorded as `None`; they only become
/// errors at load time.
pub fn resolve(root: &Path, filters: &[String]) -> Resolution {
    let folder = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut resolution = Resolution::default();

    for filter in filters {
        let qa_file = root.join(filter);
        let key = format!("{}/{}", folder, filter);

        if !qa_file.exists() {
            resolution.absent += 1;
        }

        let Some(scan_dir) = qa_file.parent() else {
            continue;
        };

        for entry in WalkDir::new(scan_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
        {
            let text_file = find_text_file(entry.path());
            resolution.upsert(ResolvedItem {
                key: key.clone(),
                text_file,
                qa_file: qa_file.clone(),
            });
        }
    }

    resolution
}

/// Find the single context text file in a directory.
///
/// A locale-tagged `*text.en.txt` wins over a generic `*text.txt`; the
/// generic file is only accepted when no locale-tagged one is present.
/// At most one text file of each kind is assumed per directory; first
/// match in name order wins.
fn find_text_file(dir: &Path) -> Option<PathBuf> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let has_locale_tagged = names.iter().any(|n| n.ends_with("text.en.txt"));

    for name in &names {
        if name.ends_with("text.en.txt") {
            return Some(dir.join(name));
        }
        if name.ends_with("text.txt") && !has_locale_tagged {
            return Some(dir.join(name));
        }
    }

    None
}

/// Read the content of a context text file.
pub fn load_context(item: &ResolvedItem) -> Result<String> {
    let path = item
        .text_file
        .as_ref()
        .ok_or_else(|| GraderError::MissingContext(item.key.clone()))?;

    fs::read_to_string(path).map_err(|e| GraderError::io(path, e))
}

/// Load question-answer pairs from a QA JSON file (a JSON array of objects).
pub fn load_qa_pairs(path: &Path) -> Result<Vec<QAPair>> {
    let content = fs::read_to_string(path).map_err(|e| GraderError::io(path, e))?;
    let pairs = serde_json::from_str(&content)?;
    Ok(pairs)
}

/// Load the filter file: a JSON array of relative paths.
pub fn load_filters(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(GraderError::FilterFileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| GraderError::io(path, e))?;
    let filters = serde_json::from_str(&content)?;
    Ok(filters)
}
