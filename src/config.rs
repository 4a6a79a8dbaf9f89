use crate::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `GleanerConfig` struct holds every tunable the harvesting run
/// recognizes: concurrency, retry policy, timeouts, paging behavior, and
/// the endpoints of the target catalog.
///
/// All durations are carried as millisecond fields so they round-trip
/// through TOML files and environment variables; use the accessor methods
/// to obtain `Duration` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GleanerConfig {
    /// The maximum number of item fetches in flight at once.
    pub concurrency_limit: usize,
    /// The maximum number of attempts per item before it is dropped.
    pub max_attempts: u32,
    /// The total timeout for a single request, in milliseconds.
    pub request_timeout_ms: u64,
    /// The connect timeout for a single request, in milliseconds.
    pub connect_timeout_ms: u64,
    /// The fixed delay before an item's first attempt, in milliseconds.
    pub initial_delay_ms: u64,
    /// The backoff unit multiplied by the attempt index, in milliseconds.
    pub backoff_unit_ms: u64,
    /// The number of results a full listing page is expected to carry.
    pub page_size_expected: usize,
    /// The safety ceiling on listing pages fetched in one run.
    pub max_pages: u32,
    /// The polite delay between listing page requests, in milliseconds.
    pub page_delay_ms: u64,
    /// An overall deadline for the harvest phase, in milliseconds.
    /// Zero disables the deadline.
    pub harvest_timeout_ms: u64,
    /// The user agent string to be used in HTTP requests.
    pub user_agent: String,
    /// The base URL of the listing search API.
    pub api_base: String,
    /// The site base prepended to relative item URLs from the listing.
    pub site_base: String,
    /// The search text used when the supplied URL carries none.
    pub default_search_text: String,
}

impl Default for GleanerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: crate::DEFAULT_CONCURRENCY_LIMIT,
            max_attempts: crate::DEFAULT_MAX_ATTEMPTS,
            request_timeout_ms: crate::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            connect_timeout_ms: crate::DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            initial_delay_ms: 300,
            backoff_unit_ms: 200,
            page_size_expected: crate::DEFAULT_PAGE_SIZE,
            max_pages: crate::DEFAULT_MAX_PAGES,
            page_delay_ms: 300,
            harvest_timeout_ms: 0,
            user_agent: String::from(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
            ),
            api_base: String::from("https://searchbff.tatacliq.com/products/lux/search"),
            site_base: String::from("https://luxury.tatacliq.com"),
            default_search_text: String::from(
                ":relevance:category:LSH1110101:inStockFlag:true",
            ),
        }
    }
}

impl GleanerConfig {
    /// Loads the configuration by layering an optional `gleaner.toml`
    /// file and `GLEANER_*` environment variables over the defaults.
    ///
    /// # Returns
    ///
    /// A `Result` containing the merged `GleanerConfig`, or an error if a
    /// source is present but malformed.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("gleaner").required(false))
            .add_source(Environment::with_prefix("GLEANER"))
            .build()?;

        let mut merged: GleanerConfig = settings.try_deserialize()?;
        // A zero cap would stall the harvest stream forever.
        if merged.concurrency_limit == 0 {
            merged.concurrency_limit = 1;
        }
        if merged.max_attempts == 0 {
            merged.max_attempts = 1;
        }
        Ok(merged)
    }

    /// The total timeout for a single request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The connect timeout for a single request.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// The fixed delay before an item's first attempt.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// The base delay unit for linear retry backoff.
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// The polite delay between listing page requests.
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// The overall harvest deadline, or `None` when unlimited.
    pub fn harvest_timeout(&self) -> Option<Duration> {
        if self.harvest_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.harvest_timeout_ms))
        }
    }
}
