// Local record of the thread ids created through this tool. The remote
// service has no "list threads" endpoint, so this file is the only way
// to find them again later.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk shape: `{"thread_ids": ["thread_...", ...]}`.
#[derive(Serialize, Deserialize, Debug, Default)]
struct ThreadRecord {
    #[serde(default)]
    thread_ids: Vec<String>,
}

/// Append-only JSON file of thread ids. Every write rewrites the whole
/// document; there is no locking, so two instances running at once can
/// lose each other's appends.
#[derive(Debug, Clone)]
pub struct ThreadStore {
    path: PathBuf,
}

impl ThreadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ThreadStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored ids in creation order. A missing file is an empty store; a
    /// file that is not valid JSON is an error.
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let record: ThreadRecord = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(record.thread_ids)
    }

    /// Append one id, creating the file (and its directory) on first use.
    pub fn append(&self, thread_id: &str) -> Result<()> {
        let mut thread_ids = self.load()?;
        thread_ids.push(thread_id.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string(&ThreadRecord { thread_ids })
            .context("Failed to serialize thread ids")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(thread_id, path = %self.path.display(), "stored thread id");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThreadStore::new(dir.path().join("thread_ids.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn first_append_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("thread_ids.json");
        let store = ThreadStore::new(&path);

        store.append("thr_abc").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"thread_ids": ["thr_abc"]}));
    }

    #[test]
    fn appends_keep_order_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThreadStore::new(dir.path().join("thread_ids.json"));

        store.append("thr_1").unwrap();
        store.append("thr_2").unwrap();
        store.append("thr_1").unwrap();

        assert_eq!(store.load().unwrap(), vec!["thr_1", "thr_2", "thr_1"]);
    }

    #[test]
    fn missing_key_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thread_ids.json");
        fs::write(&path, "{}").unwrap();
        assert!(ThreadStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thread_ids.json");
        fs::write(&path, "not json").unwrap();

        let store = ThreadStore::new(&path);
        assert!(store.load().is_err());
        assert!(store.append("thr_x").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }
}
