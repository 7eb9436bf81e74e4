use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Resolve the spreadsheet download URL from the statistics page.
///
/// The attachment link is identified by a stable attribute selector; its
/// absence means the page layout changed, which is a configuration error
/// rather than a transient condition.
pub async fn resolve_attachment_url(
    client: &Client,
    page_url: &str,
    selector: &str,
) -> Result<String> {
    let sel = Selector::parse(selector)
        .map_err(|e| anyhow!("invalid attachment selector {:?}: {:?}", selector, e))?;

    let html = get_text_with_retry(client, page_url).await?;
    let base = Url::parse(page_url).with_context(|| format!("parsing page URL {}", page_url))?;

    let document = Html::parse_document(&html);
    let href = document
        .select(&sel)
        .find_map(|e| e.value().attr("href"))
        .ok_or_else(|| {
            anyhow!(
                "attachment link not found on {} (selector {:?})",
                page_url,
                selector
            )
        })?;

    let url = base
        .join(href)
        .with_context(|| format!("joining attachment href {:?}", href))?;
    info!(url = %url, "resolved attachment link");
    Ok(url.to_string())
}

/// GET `url` and return the body text. Transient failures are retried a
/// bounded number of times; HTTP error statuses are not.
async fn get_text_with_retry(client: &Client, url: &str) -> Result<String> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let resp = client.get(url).send().await;
        match resp {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => return Ok(body),
                Err(_) if attempt < MAX_RETRIES => {
                    warn!(url, attempt, "body read failed; retrying");
                    sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            },
            Ok(resp) => bail!("HTTP error {} from {}", resp.status(), url),
            Err(_) if attempt < MAX_RETRIES => {
                warn!(url, attempt, "request failed; retrying");
                sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_malformed_selector() {
        let client = Client::new();
        let err = resolve_attachment_url(&client, "https://example.invalid", "a[")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid attachment selector"));
    }
}
