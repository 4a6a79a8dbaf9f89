use std::time::Duration;
use thiserror::Error;

pub mod catalog;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod harvest;
pub mod output;
pub mod types;

// Re-export commonly used types
pub use crate::config::GleanerConfig;
pub use crate::types::{CurationGroup, FilterOutcome, HarvestResult, ItemDescriptor};

/// The `GleanerError` enum represents the errors that can occur while
/// discovering, harvesting, and curating a catalog.
#[derive(Error, Debug)]
pub enum GleanerError {
    /// Represents a transport-level failure (connection, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Represents a non-success HTTP status from the remote endpoint.
    #[error("unexpected status {status} from {url}")]
    StatusError {
        status: reqwest::StatusCode,
        url: String,
    },
    /// Represents an error that occurs during content extraction.
    #[error("Content extraction failed: {0}")]
    ExtractionError(String),
    /// Represents a malformed or unusable catalog listing payload.
    #[error("Catalog listing failed: {0}")]
    CatalogError(String),
    /// Represents a configuration loading or validation error.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents a failure while writing the curation report.
    #[error("Failed to write results: {0}")]
    OutputError(#[from] std::io::Error),
}

/// A type alias for `Result` with the `GleanerError` error type.
pub type Result<T> = std::result::Result<T, GleanerError>;

// Constants

/// The default total timeout for a single page request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// The default connect timeout for a single request.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// The default number of concurrent item fetches.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;
/// The default maximum number of attempts per item.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// The default number of results a full listing page carries.
pub const DEFAULT_PAGE_SIZE: usize = 24;
/// The default ceiling on listing pages fetched in one run.
pub const DEFAULT_MAX_PAGES: u32 = 500;
