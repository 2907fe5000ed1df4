use std::cell::Cell;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use scraper::Html;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::settings::Settings;

const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const REFERER_VALUE: &str = "https://google.com";

/// Anything that can turn a URL into a parsed document.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError>;

    /// Fetch, logging and swallowing the failure: an unavailable page simply
    /// yields nothing.
    async fn fetch_or_skip(&self, url: &str) -> Option<Html> {
        match self.fetch(url).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Skipping page: {}", e);
                None
            }
        }
    }
}

impl<T: PageSource> PageSource for &T {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        (**self).fetch(url).await
    }
}

/// HTTP fetcher owned by a single crawl. Fetches run one at a time with a
/// fixed pause before each one after the first.
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
    fetched_any: Cell<bool>,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpFetcher {
            client,
            delay: settings.page_delay(),
            fetched_any: Cell::new(false),
        })
    }

    async fn pace(&self) {
        if self.fetched_any.replace(true) && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        self.pace().await;

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(
            url,
            bytes = body.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(Html::parse_document(&body))
    }
}
