//! Harvest coordinator - main orchestration logic
//!
//! This module contains the producer side of the harvest, including:
//! - Logging in before any work starts
//! - Starting the worker pool
//! - Walking the paginated listing and queueing item links
//! - Draining the queue, stopping the workers, and writing the output

use crate::config::{validate, HarvestConfig};
use crate::crawler::auth::{login, Credentials};
use crate::crawler::fetcher::{build_http_client, Fetcher, SessionCookies};
use crate::crawler::parser::{Extractor, PageMetadata, SiteExtractor};
use crate::crawler::queue::WorkQueue;
use crate::crawler::worker::{WorkerContext, WorkerPool};
use crate::output::{write_emails, HarvestSummary};
use crate::state::{ResultSet, StopSignal};
use crate::{ConfigError, HarvestError};
use chrono::Utc;
use reqwest::cookie::Jar;
use std::sync::Arc;
use url::Url;

/// Item links and page count read from one listing page
#[derive(Debug, Clone)]
pub struct Listing {
    pub metadata: PageMetadata,
    pub items: Vec<String>,
}

/// Outcome of the producer loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerReport {
    pub pages_visited: u32,
    pub pages_failed: u32,
    pub total_pages: u32,
    pub items_enqueued: u64,
}

/// Main harvest coordinator structure
pub struct Coordinator<E = SiteExtractor> {
    config: Arc<HarvestConfig>,
    credentials: Credentials,
    extractor: Arc<E>,
    /// Session cookie jar, written only through `session`
    jar: Arc<Jar>,
    /// Client used for login and listing pages
    session: Fetcher,
}

impl Coordinator<SiteExtractor> {
    /// Creates a coordinator using the site's own markup
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The base URL is invalid or the HTTP client could not be built
    pub fn new(config: HarvestConfig, credentials: Credentials) -> Result<Self, HarvestError> {
        Self::with_extractor(config, credentials, SiteExtractor)
    }
}

impl<E: Extractor> Coordinator<E> {
    /// Creates a coordinator with a custom extractor
    ///
    /// The configuration is validated here, so a library caller cannot start
    /// a run with settings the CLI would have rejected.
    pub fn with_extractor(
        config: HarvestConfig,
        credentials: Credentials,
        extractor: E,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let base_url = Url::parse(&config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

        let jar = Arc::new(Jar::default());
        let client = build_http_client(&config.site, Arc::clone(&jar))?;

        Ok(Self {
            config: Arc::new(config),
            credentials,
            extractor: Arc::new(extractor),
            jar,
            session: Fetcher::new(client, base_url),
        })
    }

    /// Runs the whole harvest
    ///
    /// 1. Log in (any failure aborts before workers start)
    /// 2. Start the worker pool
    /// 3. Queue item links from every listing page
    /// 4. Wait for the queue to drain, then stop and join the workers
    /// 5. Write the collected emails
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        let started_at = Utc::now();

        login(&self.session, &self.credentials).await?;

        let context = Arc::new(WorkerContext {
            fetcher: self.worker_fetcher()?,
            extractor: Arc::clone(&self.extractor),
            queue: Arc::new(WorkQueue::new()),
            results: Arc::new(ResultSet::new()),
            stop: StopSignal::new(),
            poll_interval: self.config.crawl.poll_interval(),
        });

        let pool = WorkerPool::spawn(self.config.crawl.workers, Arc::clone(&context));

        let production = self.produce(&context.queue).await;
        tracing::info!(
            "Listing exhausted: {} pages, {} items queued",
            production.pages_visited,
            production.items_enqueued
        );

        context.queue.join().await;
        context.stop.set();
        let workers = pool.join().await;

        let emails = context.results.to_sorted_vec();
        let output_path = write_emails(&self.config.output.path, &emails)?;

        let summary = HarvestSummary {
            started_at,
            finished_at: Utc::now(),
            pages_visited: production.pages_visited,
            pages_failed: production.pages_failed,
            total_pages: production.total_pages,
            items_enqueued: production.items_enqueued,
            items_processed: workers.items_processed,
            items_failed: workers.items_failed,
            emails_collected: emails.len(),
            output_path,
        };

        tracing::info!(
            "finished: {} emails from {} items written to {}",
            summary.emails_collected,
            summary.items_processed,
            summary.output_path.display()
        );

        Ok(summary)
    }

    /// Walks listing pages from 1 until the reported page count is reached
    ///
    /// The page count is re-read from every page, so the last one to report
    /// wins. A page that fails contributes no items and the walk moves on.
    pub async fn produce(&self, queue: &WorkQueue) -> ProducerReport {
        let mut report = ProducerReport {
            total_pages: 1,
            ..ProducerReport::default()
        };
        let mut page: u32 = 1;

        while page <= report.total_pages {
            report.pages_visited += 1;

            match self.fetch_listing(page).await {
                Ok(listing) => {
                    report.total_pages = listing.metadata.total_pages();
                    tracing::debug!(
                        "Listing page {}/{}: {} items",
                        page,
                        report.total_pages,
                        listing.items.len()
                    );

                    for item in listing.items {
                        queue.enqueue(item);
                        report.items_enqueued += 1;
                    }
                }
                Err(e) => {
                    report.pages_failed += 1;
                    tracing::error!("Listing page {} failed: {}", page, e);
                }
            }

            page += 1;
        }

        report
    }

    /// Fetches one listing page and reads its count and item links
    pub async fn fetch_listing(&self, page: u32) -> Result<Listing, HarvestError> {
        let url = self.listing_url(page)?;
        let response = self.session.get(&url).await?;
        tracing::debug!("{}", response.final_url);

        let extractor = &self.extractor;
        response.extract(|doc, base| {
            let metadata = extractor.page_metadata(doc)?;
            let items = extractor.item_links(doc, base);
            Ok(Listing { metadata, items })
        })
    }

    /// `/franchise/{topic}/{page}` under the site root
    pub fn listing_url(&self, page: u32) -> Result<Url, HarvestError> {
        self.session
            .resolve(&format!("/franchise/{}/{}", self.config.crawl.topic, page))
    }

    /// Client for workers: same identity, read-only view of the session cookies
    fn worker_fetcher(&self) -> Result<Fetcher, HarvestError> {
        let cookies = Arc::new(SessionCookies::new(Arc::clone(&self.jar)));
        let client = build_http_client(&self.config.site, cookies)?;
        Ok(Fetcher::new(client, self.session.base_url().clone()))
    }
}

/// Runs a complete harvest with the default extractor
///
/// # Example
///
/// ```no_run
/// use franchise_harvest::config::HarvestConfig;
/// use franchise_harvest::crawler::{run_harvest, Credentials};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("user", "secret");
/// let summary = run_harvest(HarvestConfig::default(), credentials).await?;
/// println!("{} emails", summary.emails_collected);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: HarvestConfig,
    credentials: Credentials,
) -> Result<HarvestSummary, HarvestError> {
    let coordinator = Coordinator::new(config, credentials)?;
    coordinator.run().await
}
