use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, warn};

use super::{Cell, Column, Table};

/// Load one worksheet into a [`Table`]. `header_row` is the zero-based row
/// carrying the column names; `index_col` the zero-based column pulled out
/// as the row index. Successive loads of the same file use identical
/// parameters, so the resulting tables are directly comparable.
pub fn load_table(
    path: impl AsRef<Path>,
    sheet_name: &str,
    header_row: usize,
    index_col: usize,
) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("reading sheet {:?} from {}", sheet_name, path.display()))?;

    let mut rows = range.rows().skip(header_row);
    let header = match rows.next() {
        Some(row) => row,
        None => bail!(
            "sheet {:?} has no row at header offset {}",
            sheet_name,
            header_row
        ),
    };
    if index_col >= header.len() {
        bail!(
            "index column {} out of range for sheet {:?} with {} columns",
            index_col,
            sheet_name,
            header.len()
        );
    }

    let names = header_names(header);
    debug!(sheet = sheet_name, cols = names.len(), "parsed header row");

    let mut index = Vec::new();
    let mut columns: Vec<Column> = names
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index_col)
        .map(|(_, name)| Column {
            name: name.clone(),
            cells: Vec::new(),
        })
        .collect();

    for row in rows {
        index.push(to_cell(&row[index_col]));
        let mut slot = 0;
        for (i, data) in row.iter().enumerate() {
            if i == index_col {
                continue;
            }
            columns[slot].cells.push(to_cell(data));
            slot += 1;
        }
    }

    Table::new(names[index_col].clone(), index, columns)
}

/// Header cells become column names; blanks get a positional placeholder and
/// repeats get a numeric suffix so names stay unique.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut names = Vec::with_capacity(header.len());
    for (i, data) in header.iter().enumerate() {
        let raw = match data {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string(),
        };
        let base = if raw.is_empty() {
            format!("unnamed_{}", i)
        } else {
            raw
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        names.push(name);
    }
    names
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Missing
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Date(naive),
            None => Cell::Missing,
        },
        Data::DateTimeIso(s) => match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            Ok(naive) => Cell::Date(naive),
            Err(_) => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => {
            warn!(error = ?e, "error cell loaded as missing");
            Cell::Missing
        }
    }
}
