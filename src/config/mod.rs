//! Configuration module for Franchise-Harvest
//!
//! Settings come from built-in defaults, an optional TOML file, and finally
//! command-line overrides applied by the binary.
//!
//! # Example
//!
//! ```no_run
//! use franchise_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting topic: {}", config.crawl.topic);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_worker_count, CrawlConfig, HarvestConfig, OutputConfig, SiteConfig,
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
