pub mod load;

use anyhow::{bail, Result};
use chrono::{NaiveDateTime, NaiveTime};
use std::collections::HashSet;
use std::fmt;

/// A single typed value at one row/column position.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Date(d) if d.time() == NaiveTime::MIN => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Cell::Missing => Ok(()),
        }
    }
}

/// One named column of cells, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// In-memory tabular dataset: ordered named columns plus a designated index
/// column keying the rows.
///
/// Invariants enforced at construction: column names are unique (the index
/// name included) and every column holds exactly one cell per index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index_name: String,
    index: Vec<Cell>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(index_name: String, index: Vec<Cell>, columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        seen.insert(index_name.as_str());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                bail!("duplicate column name {:?}", col.name);
            }
            if col.cells.len() != index.len() {
                bail!(
                    "column {:?} has {} cells but the index has {} rows",
                    col.name,
                    col.cells.len(),
                    index.len()
                );
            }
        }
        Ok(Self {
            index_name,
            index,
            columns,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[Cell] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Data column names in table order, index excluded.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, cells: Vec<Cell>) -> Column {
        Column {
            name: name.to_string(),
            cells,
        }
    }

    #[test]
    fn construction_checks_invariants() {
        let index = vec![Cell::Number(1.0), Cell::Number(2.0)];

        let ok = Table::new(
            "quarter".to_string(),
            index.clone(),
            vec![col("a", vec![Cell::Missing, Cell::Number(3.0)])],
        );
        assert!(ok.is_ok());

        let dup = Table::new(
            "quarter".to_string(),
            index.clone(),
            vec![
                col("a", vec![Cell::Missing, Cell::Missing]),
                col("a", vec![Cell::Missing, Cell::Missing]),
            ],
        );
        assert!(dup.is_err());

        let ragged = Table::new(
            "quarter".to_string(),
            index,
            vec![col("a", vec![Cell::Missing])],
        );
        assert!(ragged.is_err());
    }

    #[test]
    fn equality_covers_values_and_order() {
        let make = |v: f64| {
            Table::new(
                "k".to_string(),
                vec![Cell::Text("r1".to_string())],
                vec![col("a", vec![Cell::Number(v)])],
            )
            .unwrap()
        };
        assert_eq!(make(1.0), make(1.0));
        assert_ne!(make(1.0), make(2.0));

        let swapped = Table::new(
            "k".to_string(),
            vec![Cell::Text("r1".to_string())],
            vec![col("b", vec![Cell::Number(1.0)])],
        )
        .unwrap();
        assert_ne!(make(1.0), swapped);
    }

    #[test]
    fn cell_display_renders_each_type() {
        use chrono::NaiveDate;
        assert_eq!(Cell::Number(10.0).to_string(), "10");
        assert_eq!(Cell::Text("abc".to_string()).to_string(), "abc");
        assert_eq!(Cell::Missing.to_string(), "");
        let midnight = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::Date(midnight).to_string(), "2023-01-01");
        let noonish = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(Cell::Date(noonish).to_string(), "2023-01-01 12:30:00");
    }
}
