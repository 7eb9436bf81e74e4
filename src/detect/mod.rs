use anyhow::Result;
use chrono::Utc;
use reqwest::Client;
use tracing::info;

use crate::{
    config::ScrapeConfig,
    fetch,
    history::{content_hash, SnapshotRecord, SnapshotStore},
    table::{load::load_table, Table},
};

/// Outcome of one change check. All three findings derive from a single
/// download-and-compare pass, so they cannot disagree with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeReport {
    pub new_data: bool,
    /// Columns present in the fresh load but absent from the baseline,
    /// in fresh-table order.
    pub new_columns: Vec<String>,
    /// Columns present in the baseline but absent from the fresh load,
    /// in baseline order.
    pub missing_columns: Vec<String>,
}

/// Exact structural and value equality: shape, column names and order, index
/// and every cell, missing markers included.
pub fn tables_identical(reference: &Table, fresh: &Table) -> bool {
    reference == fresh
}

/// Order-preserving column-set difference between two name lists.
pub fn diff_columns(baseline: &[String], fresh: &[String]) -> (Vec<String>, Vec<String>) {
    let new = fresh
        .iter()
        .filter(|name| !baseline.contains(name))
        .cloned()
        .collect();
    let missing = baseline
        .iter()
        .filter(|name| !fresh.contains(name))
        .cloned()
        .collect();
    (new, missing)
}

/// Checks for new data by re-downloading the source and comparing the fresh
/// load against both the in-run reference table and the last persisted
/// snapshot. The snapshot comparison is what makes detection survive process
/// restarts.
pub struct ChangeDetector {
    client: Client,
    config: ScrapeConfig,
    snapshots: SnapshotStore,
    file_url: String,
}

impl ChangeDetector {
    pub fn new(client: Client, config: ScrapeConfig, file_url: String) -> Result<Self> {
        let snapshots = SnapshotStore::new(&config.history_dir)?;
        Ok(Self {
            client,
            config,
            snapshots,
            file_url,
        })
    }

    /// Download the source file again (overwriting the local copy), load it
    /// with the same parsing parameters, and report whether anything
    /// changed. Records a fresh snapshot on every invocation.
    pub async fn check_for_new_data(&self, reference: &Table) -> Result<ChangeReport> {
        info!("checking for new data");
        let path = fetch::files::download_file(
            &self.client,
            &self.file_url,
            &self.config.download_dir,
        )
        .await?;
        let fresh = load_table(
            &path,
            &self.config.sheet_name,
            self.config.header_row,
            self.config.index_col,
        )?;
        let fresh_hash = content_hash(&path)?;

        let prior = self.snapshots.latest()?;
        let changed_since_last_run = prior
            .as_ref()
            .map(|p| p.content_hash != fresh_hash)
            .unwrap_or(false);
        let baseline = prior
            .as_ref()
            .map(|p| p.columns.clone())
            .unwrap_or_else(|| reference.column_names());

        let (new_columns, missing_columns) = diff_columns(&baseline, &fresh.column_names());
        let new_data = !tables_identical(reference, &fresh) || changed_since_last_run;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.snapshots.record(&SnapshotRecord {
            file_name,
            content_hash: fresh_hash,
            columns: fresh.column_names(),
            num_rows: fresh.num_rows(),
            fetched_at: Utc::now(),
        })?;

        if new_data {
            info!("new data found");
        } else {
            info!("data is up-to-date");
        }

        Ok(ChangeReport {
            new_data,
            new_columns,
            missing_columns,
        })
    }
}
