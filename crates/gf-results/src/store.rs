//! On-disk run store: one JSON file per run under a root directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::RunRecord;
use crate::{ResultsError, ResultsResult};

/// Stores run records as `<root>/<run_id>.json`.
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> ResultsResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        self.root.join(format!("{run_id}.json"))
    }

    /// Persist a run record, overwriting any previous run with the same ID.
    pub fn save(&self, record: &RunRecord) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.path_for(&record.meta.run_id), json)?;
        Ok(())
    }

    /// Load a run record by ID.
    pub fn load(&self, run_id: &str) -> ResultsResult<RunRecord> {
        let path = self.path_for(run_id);
        if !path.exists() {
            return Err(ResultsError::NotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// List the run IDs present in the store.
    pub fn list(&self) -> ResultsResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
