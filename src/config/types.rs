use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default aggregator front page
pub const DEFAULT_SITE_URL: &str = "https://news.ycombinator.com";

/// Main configuration structure for news-harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub schedule: ScheduleConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Front page of the aggregator; detail pages live at `{site-url}/item?id=N`
    #[serde(rename = "site-url")]
    pub site_url: String,

    /// Maximum number of items processed at the same time
    #[serde(rename = "max-concurrent-items")]
    pub max_concurrent_items: u32,

    /// Overall timeout for a single request (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Retry attempts per request. Accepted for compatibility; requests are not retried.
    pub retries: u32,

    /// Optional cap on concurrent comment fetches within one item
    #[serde(rename = "comment-concurrency")]
    pub comment_concurrency: Option<usize>,

    /// Optional deadline for a whole crawl cycle (seconds)
    #[serde(rename = "cycle-timeout")]
    pub cycle_timeout: Option<u64>,

    /// How fetched comment links are named on disk
    #[serde(rename = "comment-naming")]
    pub comment_naming: CommentNaming,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.cycle_timeout.map(Duration::from_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            max_concurrent_items: 2,
            request_timeout: 10,
            retries: 3,
            comment_concurrency: None,
            cycle_timeout: None,
            comment_naming: CommentNaming::default(),
        }
    }
}

/// Naming scheme for comment link files inside an item directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentNaming {
    /// Last path segment of the resolved URL, or the slugified URL
    #[default]
    Derived,
    /// `comment<N>` by position in the thread
    Numbered,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `name/version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "news-harvester".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the output tree; one directory per item is created under it
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./result"),
        }
    }
}

/// Polling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay between the end of one cycle and the start of the next (seconds)
    pub period: u64,

    /// Run a single cycle and exit
    pub once: bool,
}

impl ScheduleConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            period: 300,
            once: false,
        }
    }
}
