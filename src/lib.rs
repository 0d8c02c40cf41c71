//! news-harvester: a bounded-concurrency news aggregator mirror
//!
//! This crate polls an aggregator front page, follows every new item to its
//! detail page, fetches the linked article and every external link in the
//! discussion thread, and stores the raw bytes in a per-item directory tree.

pub mod config;
pub mod crawler;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

pub use crawler::{FetchError, ParseError};
pub use storage::StorageError;

/// Main error type for news-harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Front page unavailable: {0}")]
    FrontPage(#[source] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for news-harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlCycle, CycleStats, Scheduler};
pub use state::{ItemOutcome, ItemStage};
pub use crate::url::slugify;
