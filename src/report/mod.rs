use anyhow::{Context, Result};
use csv::Writer;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{
    consistency::ConsistencyReport,
    profile::{ProfileReport, Stat},
};

/// Report files are named after the source file: `<stem>_<suffix>.csv`.
fn artifact_path(output_dir: &Path, source_file: &Path, suffix: &str) -> PathBuf {
    let stem = source_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string());
    output_dir.join(format!("{}_{}.csv", stem, suffix))
}

fn stat_field(stat: &Option<Stat>) -> String {
    stat.as_ref().map(|s| s.to_string()).unwrap_or_default()
}

/// Write the profiling report: one row per data column, with the
/// dataset-wide counts carried on every row.
pub fn write_profile_csv(
    report: &ProfileReport,
    output_dir: &Path,
    source_file: &Path,
) -> Result<PathBuf> {
    let path = artifact_path(output_dir, source_file, "data_profiling");
    let mut writer =
        Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "column",
        "num_rows",
        "num_cols",
        "min",
        "max",
        "mean",
        "median",
        "total_missing_values",
    ])?;
    for col in &report.columns {
        writer.write_record([
            col.name.clone(),
            report.num_rows.to_string(),
            report.num_cols.to_string(),
            stat_field(&col.min),
            stat_field(&col.max),
            stat_field(&col.mean),
            stat_field(&col.median),
            report.total_missing_values.to_string(),
        ])?;
    }
    writer.flush().context("flushing profiling report")?;
    info!(path = %path.display(), "wrote profiling report");
    Ok(path)
}

/// Write the consistency report as ordered (check, value) rows.
pub fn write_consistency_csv(
    report: &ConsistencyReport,
    output_dir: &Path,
    source_file: &Path,
) -> Result<PathBuf> {
    let path = artifact_path(output_dir, source_file, "data_consistency");
    let mut writer =
        Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(["check", "value"])?;
    for (name, finding) in &report.findings {
        writer.write_record([name.clone(), finding.to_string()])?;
    }
    writer.flush().context("flushing consistency report")?;
    info!(path = %path.display(), "wrote consistency report");
    Ok(path)
}
