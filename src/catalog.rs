use crate::fetch::Fetcher;
use crate::types::ItemDescriptor;
use crate::{GleanerConfig, GleanerError, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// One page of the listing API payload.
#[derive(Debug, Deserialize)]
struct ListingPage {
    #[serde(default, rename = "searchresult")]
    results: Vec<ListingRecord>,
}

/// One item record inside a listing page.
#[derive(Debug, Deserialize)]
struct ListingRecord {
    #[serde(default, rename = "productId")]
    product_id: String,
    #[serde(default, rename = "webURL")]
    web_url: String,
    #[serde(default, rename = "productname")]
    product_name: String,
    #[serde(default, rename = "brandname")]
    brand_name: String,
}

/// The `CatalogSource` struct discovers the item set by paging the
/// remote listing API until it signals exhaustion.
///
/// Discovery is deliberately forgiving: a failed page, a malformed
/// payload, or a non-success status ends paging early, and whatever was
/// collected up to that point is returned. A degraded run beats an
/// aborted one.
pub struct CatalogSource {
    /// The shared fetcher used for page requests.
    fetcher: Fetcher,
    /// The run configuration.
    config: GleanerConfig,
    /// The progress display for the paging spinner.
    progress: MultiProgress,
}

impl CatalogSource {
    /// Creates a new `CatalogSource`.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The shared fetcher (same transport as item fetches).
    /// * `config` - The run configuration.
    pub fn new(fetcher: Fetcher, config: GleanerConfig) -> Self {
        Self {
            fetcher,
            config,
            progress: MultiProgress::new(),
        }
    }

    /// Resolves the search text from whatever the user supplied: a pasted
    /// browse URL carrying a `q=` or `searchText=` parameter, a plain
    /// search phrase, or nothing (falls back to the configured default).
    ///
    /// # Arguments
    ///
    /// * `input` - The raw URL or search phrase from the command line.
    ///
    /// # Returns
    ///
    /// The URL-encoded search text to page the listing API with.
    pub fn search_text(&self, input: &str) -> String {
        let input = input.trim();

        if let Some(text) = Self::query_param(input) {
            return text;
        }

        if !input.is_empty() && !input.starts_with("http") {
            return urlencoding::encode(input).into_owned();
        }

        debug!("no search text found, using default");
        self.config.default_search_text.clone()
    }

    /// Pulls the `q=` or `searchText=` value out of a browse URL, keeping
    /// it URL-encoded as the listing API expects.
    fn query_param(url: &str) -> Option<String> {
        let (_, query) = url.split_once('?')?;

        for param in query.split('&') {
            if let Some(value) = param
                .strip_prefix("q=")
                .or_else(|| param.strip_prefix("searchText="))
            {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }

        None
    }

    /// Builds the listing API URL for one page.
    fn page_url(&self, search_text: &str, page: u32) -> String {
        format!(
            "{}?pageSize={}&page={}&searchText={}&isPwa=true&channel=web&isMDE=true",
            self.config.api_base, self.config.page_size_expected, page, search_text
        )
    }

    /// Fetches and parses one listing page.
    async fn fetch_page(&self, url: &str) -> Result<ListingPage> {
        let (status, body) = self.fetcher.get(url).await?;

        if !status.is_success() {
            return Err(GleanerError::StatusError {
                status,
                url: url.to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| GleanerError::CatalogError(e.to_string()))
    }

    /// Pages through the listing and collects the full item set.
    ///
    /// Paging stops on the first failed or non-success page, on an empty
    /// page, on a short page (fewer results than a full page carries), or
    /// at the `max_pages` ceiling. A fixed polite delay separates page
    /// requests.
    ///
    /// # Arguments
    ///
    /// * `search_text` - The URL-encoded search text.
    ///
    /// # Returns
    ///
    /// The discovered item descriptors, in listing order. Possibly empty;
    /// possibly truncated when paging ended early.
    pub async fn list_items(&self, search_text: &str) -> Vec<ItemDescriptor> {
        let display_text = urlencoding::decode(search_text)
            .map(|text| text.into_owned())
            .unwrap_or_else(|_| search_text.to_string());
        info!("discovering items for '{}'", display_text);

        let spinner = self.progress.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );

        let mut items: Vec<ItemDescriptor> = Vec::new();

        for page in 0..self.config.max_pages {
            spinner.set_message(format!("Fetching page {page}... ({} items)", items.len()));

            let url = self.page_url(search_text, page);

            let parsed = match self.fetch_page(&url).await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("page {} failed ({}), stopping discovery", page, e);
                    break;
                }
            };

            let page_len = parsed.results.len();
            if page_len == 0 {
                debug!("page {} is empty, catalog exhausted", page);
                break;
            }

            for record in parsed.results {
                if record.product_id.is_empty() {
                    continue;
                }

                let source_url = if record.web_url.starts_with("http") {
                    record.web_url
                } else {
                    format!("{}{}", self.config.site_base, record.web_url)
                };

                items.push(ItemDescriptor {
                    id: record.product_id,
                    source_url,
                    title: record.product_name,
                    brand: record.brand_name,
                });
            }

            debug!("page {}: {} records ({} total)", page, page_len, items.len());

            // A short page is the listing's way of saying "last page".
            if page_len < self.config.page_size_expected {
                break;
            }

            sleep(self.config.page_delay()).await;
        }

        spinner.finish_with_message(format!("Discovered {} items", items.len()));
        info!("discovery finished with {} items", items.len());

        items
    }
}
