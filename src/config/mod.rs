//! Configuration module for news-harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so a missing file or an empty one yields a usable
//! configuration; command-line flags are applied on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use news_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Polling every {}s", config.schedule.period);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CommentNaming, Config, CrawlerConfig, OutputConfig, ScheduleConfig, UserAgentConfig,
    DEFAULT_SITE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
