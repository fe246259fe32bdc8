//! Franchise-Harvest: an authenticated contact harvester
//!
//! This crate logs into a franchise directory site, walks a paginated listing,
//! and visits every listed item's detail and redirect pages to collect contact
//! email addresses. Items are drained by a fixed pool of workers and the
//! deduplicated result set is written to a plain text file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

pub use crawler::ExtractError;

/// Main error type for Franchise-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Extraction failed for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),
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

/// Login handshake errors; every variant aborts the run
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login page has no hidden _csrf field")]
    MissingCsrfToken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("login returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("login landed on {0} instead of the site root")]
    UnexpectedLanding(String),
}

/// Result type alias for Franchise-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::HarvestConfig;
pub use crawler::{run_harvest, Coordinator, Credentials};
pub use output::HarvestSummary;
pub use state::{ResultSet, StopSignal};
