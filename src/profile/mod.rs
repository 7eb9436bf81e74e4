use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;

use crate::table::{Cell, Column, Table};

/// One summary statistic, typed after the cell kind that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Number(n) => write!(f, "{}", n),
            Stat::Text(s) => write!(f, "{}", s),
            Stat::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Per-column statistics over non-missing values.
///
/// Numeric columns get full f64 statistics. Columns without arithmetic
/// (text, dates, mixed content) fall back to their natural ordering:
/// lexicographic for text and mixed, chronological for dates, with the
/// median taken as the lower middle value and the mean left undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub min: Option<Stat>,
    pub max: Option<Stat>,
    pub mean: Option<Stat>,
    pub median: Option<Stat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileReport {
    pub num_rows: usize,
    pub num_cols: usize,
    pub total_missing_values: usize,
    /// One entry per data column, in table order.
    pub columns: Vec<ColumnProfile>,
}

/// Profile `table` without mutating it. Output is deterministic for a fixed
/// input: columns are walked in table order and no unordered containers are
/// involved.
pub fn profile(table: &Table) -> ProfileReport {
    let total_missing_values = table
        .columns()
        .iter()
        .flat_map(|c| &c.cells)
        .filter(|c| c.is_missing())
        .count();

    ProfileReport {
        num_rows: table.num_rows(),
        num_cols: table.num_cols(),
        total_missing_values,
        columns: table.columns().iter().map(profile_column).collect(),
    }
}

fn profile_column(col: &Column) -> ColumnProfile {
    let values: Vec<&Cell> = col.cells.iter().filter(|c| !c.is_missing()).collect();
    if values.is_empty() {
        return ColumnProfile {
            name: col.name.clone(),
            min: None,
            max: None,
            mean: None,
            median: None,
        };
    }

    let numbers: Option<Vec<f64>> = values
        .iter()
        .map(|c| match c {
            Cell::Number(n) => Some(*n),
            _ => None,
        })
        .collect();
    if let Some(mut nums) = numbers {
        nums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mean = nums.iter().sum::<f64>() / nums.len() as f64;
        let mid = nums.len() / 2;
        let median = if nums.len() % 2 == 0 {
            (nums[mid - 1] + nums[mid]) / 2.0
        } else {
            nums[mid]
        };
        return ColumnProfile {
            name: col.name.clone(),
            min: Some(Stat::Number(nums[0])),
            max: Some(Stat::Number(nums[nums.len() - 1])),
            mean: Some(Stat::Number(mean)),
            median: Some(Stat::Number(median)),
        };
    }

    let dates: Option<Vec<NaiveDateTime>> = values
        .iter()
        .map(|c| match c {
            Cell::Date(d) => Some(*d),
            _ => None,
        })
        .collect();
    if let Some(mut ds) = dates {
        ds.sort();
        return ColumnProfile {
            name: col.name.clone(),
            min: Some(Stat::Date(ds[0])),
            max: Some(Stat::Date(ds[ds.len() - 1])),
            mean: None,
            median: Some(Stat::Date(ds[(ds.len() - 1) / 2])),
        };
    }

    // Mixed or text: order the rendered values lexicographically.
    let mut texts: Vec<String> = values.iter().map(|c| c.to_string()).collect();
    texts.sort();
    ColumnProfile {
        name: col.name.clone(),
        min: Some(Stat::Text(texts[0].clone())),
        max: Some(Stat::Text(texts[texts.len() - 1].clone())),
        mean: None,
        median: Some(Stat::Text(texts[(texts.len() - 1) / 2].clone())),
    }
}
