use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glob::glob;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// What one retrieval looked like: enough to decide, on a later run, whether
/// the source has moved on and which columns came or went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub file_name: String,
    /// Hex SHA-256 of the downloaded bytes.
    pub content_hash: String,
    /// Data column names in table order.
    pub columns: Vec<String>,
    pub num_rows: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Snapshot records stored one JSON file per retrieval under `history_dir`,
/// named `snapshot_<micros>.json` so lexical order is chronological.
pub struct SnapshotStore {
    history_dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store at `history_dir`, creating the directory if needed.
    pub fn new(history_dir: impl Into<PathBuf>) -> Result<Self> {
        let history_dir = history_dir.into();
        fs::create_dir_all(&history_dir)
            .with_context(|| format!("creating history directory {}", history_dir.display()))?;
        Ok(Self { history_dir })
    }

    /// Persist `record` as a new snapshot file and return its path.
    pub fn record(&self, record: &SnapshotRecord) -> Result<PathBuf> {
        let ts = record.fetched_at.timestamp_micros();
        let path = self.history_dir.join(format!("snapshot_{:020}.json", ts));
        let json = serde_json::to_vec_pretty(record).context("serializing snapshot record")?;
        fs::write(&path, json)
            .with_context(|| format!("writing snapshot file {}", path.display()))?;
        debug!(path = %path.display(), "recorded snapshot");
        Ok(path)
    }

    /// The most recent snapshot, if any retrieval has been recorded.
    pub fn latest(&self) -> Result<Option<SnapshotRecord>> {
        let pattern = format!("{}/snapshot_*.json", self.history_dir.display());
        let mut paths: Vec<PathBuf> = glob(&pattern)
            .context("globbing snapshot files")?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();
        let Some(path) = paths.pop() else {
            return Ok(None);
        };
        let bytes = fs::read(&path)
            .with_context(|| format!("reading snapshot file {}", path.display()))?;
        let record = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing snapshot file {}", path.display()))?;
        Ok(Some(record))
    }
}

/// Hex SHA-256 of a file's bytes.
pub fn content_hash(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("reading {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
