use std::path::PathBuf;
use std::time::Duration;

/// Everything one pipeline cycle needs, passed to each component at
/// construction instead of living in module-level state.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Statistics page carrying the attachment link.
    pub page_url: String,
    /// CSS selector identifying the downloadable attachment on that page.
    pub attachment_selector: String,
    /// Where the downloaded workbook lands.
    pub download_dir: PathBuf,
    /// Where the two CSV report artifacts land.
    pub output_dir: PathBuf,
    /// Where snapshot records accumulate.
    pub history_dir: PathBuf,
    /// Worksheet holding the quarterly series.
    pub sheet_name: String,
    /// Zero-based row carrying the column names.
    pub header_row: usize,
    /// Zero-based column used as the row index.
    pub index_col: usize,
    /// Gap between change checks.
    pub check_interval: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            page_url:
                "https://www.gov.uk/government/statistics/oil-and-oil-products-section-3-energy-trends"
                    .to_string(),
            attachment_selector:
                r#"a[aria-describedby="attachment-7159263-accessibility-help"]"#.to_string(),
            download_dir: PathBuf::from("downloads"),
            output_dir: PathBuf::from("reports"),
            history_dir: PathBuf::from("history"),
            sheet_name: "Quarter".to_string(),
            header_row: 4,
            index_col: 4,
            check_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}
