//! Worker pool draining the work queue
//!
//! Each worker takes item URLs off the shared queue, follows the item's
//! detail page to its gated outbound link, and records every email found
//! there. Failures are isolated to the item that caused them.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::Extractor;
use crate::crawler::queue::{WorkItem, WorkQueue};
use crate::state::{ResultSet, StopSignal};
use crate::HarvestError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handles shared by every worker in a pool
pub struct WorkerContext<E> {
    /// Client carrying the session's cookies, read-only
    pub fetcher: Fetcher,

    pub extractor: Arc<E>,

    pub queue: Arc<WorkQueue>,

    pub results: Arc<ResultSet>,

    pub stop: StopSignal,

    /// Longest a worker waits on an empty queue before re-checking `stop`;
    /// setting `stop` also wakes idle workers immediately
    pub poll_interval: Duration,
}

/// What one worker did before it exited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Items taken from the queue
    pub items_processed: u64,

    /// Items whose processing failed
    pub items_failed: u64,

    /// Emails this worker added that were not already in the result set
    pub emails_added: u64,
}

impl WorkerReport {
    fn merge(&mut self, other: WorkerReport) {
        self.items_processed += other.items_processed;
        self.items_failed += other.items_failed;
        self.emails_added += other.emails_added;
    }
}

/// A fixed set of running workers
///
/// The pool owns every worker handle; [`WorkerPool::join`] must be awaited
/// before the result set is read.
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    /// Starts `size` workers sharing `context`
    pub fn spawn<E: Extractor>(size: usize, context: Arc<WorkerContext<E>>) -> Self {
        let handles = (0..size)
            .map(|id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { run_worker(id, context).await })
            })
            .collect();

        tracing::info!("Started {} workers", size);
        Self { handles }
    }

    /// Number of workers in the pool
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit, in spawn order, and sums their reports
    ///
    /// Workers only exit once the stop signal is set, so set it first.
    pub async fn join(self) -> WorkerReport {
        let mut total = WorkerReport::default();

        for (id, handle) in self.handles.into_iter().enumerate() {
            match handle.await {
                Ok(report) => total.merge(report),
                Err(e) => {
                    let error = HarvestError::Worker(e.to_string());
                    tracing::error!("Worker {} did not finish cleanly: {}", id, error);
                }
            }
        }

        total
    }
}

/// Worker loop: drain the queue until the stop signal is observed
async fn run_worker<E: Extractor>(id: usize, context: Arc<WorkerContext<E>>) -> WorkerReport {
    let mut report = WorkerReport::default();

    loop {
        // Queued items win over the stop signal so nothing is left behind.
        let next = tokio::select! {
            biased;
            item = context.queue.dequeue(context.poll_interval) => item,
            _ = context.stop.wait() => None,
        };

        let Some(item) = next else {
            if context.stop.is_set() {
                break;
            }
            continue;
        };

        report.items_processed += 1;

        match process_item(&context, &item).await {
            Ok(added) => report.emails_added += added,
            Err(e) => {
                report.items_failed += 1;
                tracing::warn!("Worker {} failed on {}: {}", id, item, e);
            }
        }

        context.queue.mark_done(&item);
    }

    tracing::debug!(
        "Worker {} stopping after {} items ({} failed)",
        id,
        report.items_processed,
        report.items_failed
    );
    report
}

/// Visits one item and records its emails, returning how many were new
async fn process_item<E: Extractor>(
    context: &WorkerContext<E>,
    item: &WorkItem,
) -> Result<u64, HarvestError> {
    let detail_url = context.fetcher.resolve(item)?;
    let detail = context.fetcher.get(&detail_url).await?;

    let extractor = &context.extractor;
    let secondary_url = detail.extract(|doc, base| extractor.secondary_link(doc, base))?;

    let landing = context.fetcher.get(&secondary_url).await?;
    tracing::debug!("redirect => {}", landing.final_url);

    let emails = landing.extract(|doc, _| Ok(extractor.emails(doc)))?;

    let mut added = 0;
    for email in emails {
        if context.results.add(email) {
            added += 1;
        }
    }

    Ok(added)
}
