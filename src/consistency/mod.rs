use std::fmt;

use crate::{detect::ChangeReport, profile::ProfileReport};

/// Status reported for the time-format check. A fixed marker, not a
/// computed verdict.
pub const TIME_FORMAT_STATUS: &str = "sorted";

/// One named finding in the consistency report.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    Flag(bool),
    Count(usize),
    Status(String),
    Columns(Vec<String>),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Flag(b) => write!(f, "{}", b),
            Finding::Count(n) => write!(f, "{}", n),
            Finding::Status(s) => write!(f, "{}", s),
            Finding::Columns(cols) => write!(f, "{}", cols.join(";")),
        }
    }
}

/// Ordered (name, value) findings about one cycle's freshness and integrity.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub findings: Vec<(String, Finding)>,
}

/// Assemble the fixed set of named checks for one cycle. The change-derived
/// fields all come from the same [`ChangeReport`].
pub fn build_report(change: &ChangeReport, profile: &ProfileReport) -> ConsistencyReport {
    ConsistencyReport {
        findings: vec![
            ("new_data".to_string(), Finding::Flag(change.new_data)),
            (
                "correct_time_format".to_string(),
                Finding::Status(TIME_FORMAT_STATUS.to_string()),
            ),
            (
                "num_missing_values".to_string(),
                Finding::Count(profile.total_missing_values),
            ),
            (
                "new_columns".to_string(),
                Finding::Columns(change.new_columns.clone()),
            ),
            (
                "missing_columns".to_string(),
                Finding::Columns(change.missing_columns.clone()),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(new_data: bool) -> ChangeReport {
        ChangeReport {
            new_data,
            new_columns: vec![],
            missing_columns: vec![],
        }
    }

    fn profile_with_missing(n: usize) -> ProfileReport {
        ProfileReport {
            num_rows: 4,
            num_cols: 2,
            total_missing_values: n,
            columns: vec![],
        }
    }

    #[test]
    fn findings_keep_their_order_and_names() {
        let report = build_report(&change(false), &profile_with_missing(3));
        let names: Vec<&str> = report.findings.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "new_data",
                "correct_time_format",
                "num_missing_values",
                "new_columns",
                "missing_columns"
            ]
        );
    }

    #[test]
    fn unchanged_source_yields_consistent_findings() {
        let report = build_report(&change(false), &profile_with_missing(0));
        assert_eq!(report.findings[0].1, Finding::Flag(false));
        assert_eq!(report.findings[3].1, Finding::Columns(vec![]));
        assert_eq!(report.findings[4].1, Finding::Columns(vec![]));
    }

    #[test]
    fn values_mirror_their_inputs() {
        let change = ChangeReport {
            new_data: true,
            new_columns: vec!["c4".to_string(), "c5".to_string()],
            missing_columns: vec!["c1".to_string()],
        };
        let report = build_report(&change, &profile_with_missing(7));
        assert_eq!(report.findings[0].1, Finding::Flag(true));
        assert_eq!(
            report.findings[1].1,
            Finding::Status("sorted".to_string())
        );
        assert_eq!(report.findings[2].1, Finding::Count(7));
        assert_eq!(report.findings[3].1.to_string(), "c4;c5");
        assert_eq!(report.findings[4].1.to_string(), "c1");
    }
}
