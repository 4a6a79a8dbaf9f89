use crate::{GleanerConfig, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER};
use reqwest::{Client, StatusCode};
use tracing::debug;

/// The `Fetcher` struct performs single HTTP GETs against the target
/// site: one shared connection pool, browser-like headers, a connect
/// timeout and a total timeout.
///
/// It never retries. Retry policy belongs to the caller, which knows
/// whether a failure is worth another attempt.
#[derive(Clone)]
pub struct Fetcher {
    /// The HTTP client used for making requests.
    client: Client,
}

impl Fetcher {
    /// Creates a new `Fetcher` from the run configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration supplying user agent and timeouts.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Fetcher`, or an error if the underlying
    /// client could not be built.
    pub fn new(config: &GleanerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        if let Ok(referer) = HeaderValue::from_str(&config.site_base) {
            headers.insert(REFERER, referer);
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Issues one GET and returns the response status and body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch.
    ///
    /// # Returns
    ///
    /// A `Result` containing the status code and body text, or an error
    /// for transport-level failures (connection, DNS, timeout). A non-2xx
    /// status is not an error here; the caller decides what to do with it.
    pub async fn get(&self, url: &str) -> Result<(StatusCode, String)> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());

        Ok((status, body))
    }
}
