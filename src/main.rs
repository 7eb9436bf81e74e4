use anyhow::Result;
use reqwest::Client;
use std::{fs, sync::Arc};
use tokio::sync::Semaphore;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use trendscraper::{
    config::ScrapeConfig,
    consistency, dates,
    detect::ChangeDetector,
    fetch, profile, report,
    table::load::load_table,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configure dirs ───────────────────────────────────────────
    let config = ScrapeConfig::default();
    for d in [&config.download_dir, &config.output_dir, &config.history_dir] {
        fs::create_dir_all(d)?;
    }
    let client = Client::new();

    // ─── 3) run one pass per tick, never overlapping ─────────────────
    // The first tick fires immediately, so startup gets a full pass.
    let running = Arc::new(Semaphore::new(1));
    let mut ticker = tokio::time::interval(config.check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let permit = match running.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("previous cycle still running; skipping this tick");
                continue;
            }
        };
        if let Err(e) = run_cycle(&client, &config).await {
            error!("cycle failed: {:#}", e);
        }
        drop(permit);
    }
}

/// One full pipeline pass: resolve the link, download, load, profile,
/// normalize dates, check for new data, and write both report artifacts.
async fn run_cycle(client: &Client, config: &ScrapeConfig) -> Result<()> {
    let file_url =
        fetch::urls::resolve_attachment_url(client, &config.page_url, &config.attachment_selector)
            .await?;

    let path = fetch::files::download_file(client, &file_url, &config.download_dir).await?;
    let table = load_table(
        &path,
        &config.sheet_name,
        config.header_row,
        config.index_col,
    )?;
    info!(
        rows = table.num_rows(),
        cols = table.num_cols(),
        "loaded table"
    );

    let profile_report = profile::profile(&table);
    report::write_profile_csv(&profile_report, &config.output_dir, &path)?;

    let normalized = dates::normalize_dates(&table);

    let detector = ChangeDetector::new(client.clone(), config.clone(), file_url)?;
    let change = detector.check_for_new_data(&normalized).await?;

    let consistency_report = consistency::build_report(&change, &profile_report);
    report::write_consistency_csv(&consistency_report, &config.output_dir, &path)?;

    Ok(())
}
