// src/fetch.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const BACKOFF_MS: u64 = 500;

/// Client with the browser User-Agent and request timeout the source expects.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building HTTP client")
}

/// Wait before retry number `retry` (1-based): 500 ms, 1 s, 2 s, ...
fn backoff(retry: u32) -> Duration {
    Duration::from_millis(BACKOFF_MS << (retry - 1))
}

/// Fetch a flow page as text. Only http(s) URLs are accepted; transport
/// errors and non-success statuses are retried `MAX_RETRIES` times.
#[instrument(level = "info", skip(client))]
pub async fn fetch_document(client: &Client, url: &str) -> Result<String> {
    let page = Url::parse(url).with_context(|| format!("parsing url {}", url))?;
    anyhow::ensure!(
        matches!(page.scheme(), "http" | "https"),
        "unsupported scheme `{}` in {}",
        page.scheme(),
        page
    );

    let mut retry = 0;
    loop {
        debug!(%page, retry, "requesting page");
        let outcome = match client.get(page.clone()).send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => resp.text().await.context("reading page body"),
                Err(e) => Err(anyhow::Error::new(e).context("page returned an error status")),
            },
            Err(e) => Err(anyhow::Error::new(e).context("request failed")),
        };

        match outcome {
            Ok(body) => return Ok(body),
            Err(e) if retry < MAX_RETRIES => {
                retry += 1;
                let delay = backoff(retry);
                warn!(%page, retry, ?delay, error = %e, "page fetch failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                error!(%page, error = %e, "giving up on page");
                return Err(e.context(format!("fetching {}", page)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_millis(1000));
        assert_eq!(backoff(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_bad_urls_fail_without_requests() -> Result<()> {
        let client = build_client()?;
        assert!(fetch_document(&client, "not a url").await.is_err());
        let err = fetch_document(&client, "ftp://example.com/flows")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
        Ok(())
    }
}
