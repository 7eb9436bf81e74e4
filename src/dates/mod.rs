use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info};

use crate::table::{Cell, Column, Table};

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern should parse"));

/// Date-time layouts tried first, in order.
static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H-%M-%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only layouts, completed to midnight. Day-first orders come before
/// month-first, matching the source's locale.
static DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Trim, collapse runs of whitespace, and drop commas, so tokens like
/// `"January  5, 2023"` line up with the format table.
fn clean_token(token: &str) -> String {
    WHITESPACE
        .replace_all(token.trim(), " ")
        .replace(',', "")
}

/// Permissive parse of `token` as a calendar date or date-time.
pub fn parse_date_token(token: &str) -> Option<NaiveDateTime> {
    let token = clean_token(token);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&token, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&token, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// True iff `token` reads as a calendar date or date-time. Failure is an
/// expected outcome: it is logged as a diagnostic and never propagated.
pub fn is_valid_date(token: &str) -> bool {
    if parse_date_token(token).is_some() {
        true
    } else {
        error!(token, "failed to parse token as a date");
        false
    }
}

/// A table counts as date-bearing when any column is already date-typed or
/// holds at least one parseable text token.
fn has_date_column(table: &Table) -> bool {
    table.columns().iter().any(|col| {
        col.cells.iter().any(|cell| match cell {
            Cell::Date(_) => true,
            Cell::Text(s) => parse_date_token(s).is_some(),
            _ => false,
        })
    })
}

/// Rewrite recognized date tokens into date-typed cells, building a new
/// table rather than mutating in place.
///
/// Only two text layouts are converted: ten-character `YYYY-MM-DD` tokens
/// and `YYYY-MM-DD HH-MM-SS` tokens. Tokens that validate in other layouts
/// stay text, a known limitation. Already-converted cells pass through
/// untouched, so a second pass is a no-op.
pub fn normalize_dates(table: &Table) -> Table {
    if !has_date_column(table) {
        info!("table contains no date-like column");
        return table.clone();
    }
    info!("table contains date-like column");

    let columns = table
        .columns()
        .iter()
        .map(|col| Column {
            name: col.name.clone(),
            cells: col.cells.iter().map(normalize_cell).collect(),
        })
        .collect();

    Table::new(
        table.index_name().to_string(),
        table.index().to_vec(),
        columns,
    )
    .expect("normalization preserves table shape")
}

fn normalize_cell(cell: &Cell) -> Cell {
    let Cell::Text(token) = cell else {
        return cell.clone();
    };
    if !is_valid_date(token) {
        return cell.clone();
    }
    if token.len() == 10 {
        if let Ok(d) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
            return Cell::Date(d.and_time(NaiveTime::MIN));
        }
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(token, "%Y-%m-%d %H-%M-%S") {
        return Cell::Date(dt);
    }
    cell.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table_with(cells: Vec<Cell>) -> Table {
        let index = (0..cells.len())
            .map(|i| Cell::Number(i as f64))
            .collect();
        Table::new(
            "idx".to_string(),
            index,
            vec![Column {
                name: "when".to_string(),
                cells,
            }],
        )
        .unwrap()
    }

    #[test]
    fn accepts_common_layouts() {
        for token in [
            "2023-01-01",
            "2023/01/01",
            "01/02/2023",
            "1.2.2023",
            "5 January 2023",
            "January 5, 2023",
            "2023-01-01 12:30:00",
            "2023-01-01 12-30-00",
        ] {
            assert!(is_valid_date(token), "expected {:?} to validate", token);
        }
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        for token in ["not-a-date", "", "13-13-13-13", "Qtr 1"] {
            assert!(!is_valid_date(token), "expected {:?} to fail", token);
        }
    }

    #[test]
    fn converts_ten_char_dates() {
        let table = table_with(vec![
            Cell::Text("2023-01-01".to_string()),
            Cell::Text("2023-01-02".to_string()),
        ]);
        let normalized = normalize_dates(&table);
        let expected_first = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(
            normalized.column("when").unwrap().cells[0],
            Cell::Date(expected_first)
        );
        assert!(matches!(
            normalized.column("when").unwrap().cells[1],
            Cell::Date(_)
        ));
    }

    #[test]
    fn converts_dashed_datetime_tokens() {
        let table = table_with(vec![Cell::Text("2023-01-01 12-30-00".to_string())]);
        let normalized = normalize_dates(&table);
        let expected = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            normalized.column("when").unwrap().cells[0],
            Cell::Date(expected)
        );
    }

    #[test]
    fn leaves_other_layouts_and_garbage_alone() {
        let table = table_with(vec![
            Cell::Text("2023-01-01".to_string()),
            Cell::Text("5 January 2023".to_string()),
            Cell::Text("not-a-date".to_string()),
        ]);
        let normalized = normalize_dates(&table);
        let cells = &normalized.column("when").unwrap().cells;
        assert!(matches!(cells[0], Cell::Date(_)));
        assert_eq!(cells[1], Cell::Text("5 January 2023".to_string()));
        assert_eq!(cells[2], Cell::Text("not-a-date".to_string()));
    }

    #[test]
    fn normalization_is_idempotent() {
        let table = table_with(vec![
            Cell::Text("2023-01-01".to_string()),
            Cell::Text("2023-01-01 12-30-00".to_string()),
            Cell::Text("still text".to_string()),
            Cell::Missing,
        ]);
        let once = normalize_dates(&table);
        let twice = normalize_dates(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn table_without_dates_is_returned_unchanged() {
        let table = table_with(vec![
            Cell::Text("alpha".to_string()),
            Cell::Number(2.0),
        ]);
        assert_eq!(normalize_dates(&table), table);
    }
}
