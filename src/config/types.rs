use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root of the directory site
pub const DEFAULT_BASE_URL: &str = "https://businessmens.ru/";

/// Desktop browser identity sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/42.0.2311.135 Safari/537.36 Edge/12.246";

/// Main configuration structure for Franchise-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarvestConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site and HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site root every relative path is resolved against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout", default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

/// Listing traversal and worker pool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Listing topic, the `{topic}` in `/franchise/{topic}/{page}`
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Number of concurrent workers
    #[serde(default = "default_worker_count")]
    pub workers: usize,

    /// How long an idle worker waits on the queue before re-checking the stop signal
    #[serde(rename = "poll-interval", default = "default_poll_interval_secs")]
    pub poll_interval_secs: f64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// File the harvested emails are written to
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl SiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

impl CrawlConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            workers: default_worker_count(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> f64 {
    15.0
}

fn default_topic() -> String {
    "all".to_string()
}

/// One worker per available CPU, falling back to a single worker
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_poll_interval_secs() -> f64 {
    10.0
}

fn default_output_path() -> PathBuf {
    PathBuf::from("emails.txt")
}
