//! Franchise-Harvest main entry point
//!
//! This is the command-line interface for the Franchise-Harvest email harvester.

use clap::Parser;
use franchise_harvest::config::{load_config_with_hash, validate, HarvestConfig};
use franchise_harvest::crawler::{run_harvest, Credentials};
use franchise_harvest::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Franchise-Harvest: collect franchisor contact emails
///
/// Logs into the franchise directory, walks every listing page of a topic,
/// and follows each franchise's outbound link to collect `mailto:` addresses.
/// The deduplicated addresses are written one per line.
#[derive(Parser, Debug)]
#[command(name = "franchise-harvest")]
#[command(version)]
#[command(about = "Harvest contact emails from a franchise directory", long_about = None)]
struct Cli {
    /// Account username
    username: String,

    /// Account password
    password: String,

    /// Output filename [default: emails.txt]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Listing topic [default: all]
    #[arg(short, long)]
    topic: Option<String>,

    /// Number of workers [default: number of CPUs]
    #[arg(short = 'w', long = "num-workers", value_name = "N")]
    num_workers: Option<usize>,

    /// Per-request timeout in seconds [default: 15]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Site root [default: https://businessmens.ru/]
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Seconds an idle worker waits on the queue between stop checks [default: 10]
    #[arg(long, value_name = "SECONDS")]
    poll_interval: Option<f64>,

    /// Path to a TOML configuration file; command-line options take precedence
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Layers command-line overrides onto a base configuration
    fn apply_overrides(&self, config: &mut HarvestConfig) {
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(topic) = &self.topic {
            config.crawl.topic = topic.clone();
        }
        if let Some(workers) = self.num_workers {
            config.crawl.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.site.timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            config.site.user_agent = user_agent.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
        if let Some(poll_interval) = self.poll_interval {
            config.crawl.poll_interval_secs = poll_interval;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };

    tracing::info!(
        "Harvesting topic '{}' from {} with {} workers",
        config.crawl.topic,
        config.site.base_url,
        config.crawl.workers
    );

    let credentials = Credentials::new(cli.username.as_str(), cli.password.as_str());

    match run_harvest(config, credentials).await {
        Ok(summary) => {
            if !cli.quiet {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Builds the effective configuration from defaults, file, and flags
fn load_settings(cli: &Cli) -> Result<HarvestConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => HarvestConfig::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("franchise_harvest=info,warn"),
            1 => EnvFilter::new("franchise_harvest=debug,info"),
            2 => EnvFilter::new("franchise_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
