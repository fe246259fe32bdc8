//! Crawler module for the harvest pipeline
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with a shared, read-only session for workers
//! - The login handshake
//! - HTML extraction of listing counts, item links, and emails
//! - The work queue and the worker pool that drains it
//! - Overall harvest coordination

mod auth;
mod coordinator;
mod fetcher;
mod parser;
mod queue;
mod worker;

pub use auth::{extract_csrf_token, login, Credentials};
pub use coordinator::{run_harvest, Coordinator, Listing, ProducerReport};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, SessionCookies};
pub use parser::{parse_count_text, ExtractError, Extractor, PageMetadata, SiteExtractor};
pub use queue::{WorkItem, WorkQueue};
pub use worker::{WorkerContext, WorkerPool, WorkerReport};
