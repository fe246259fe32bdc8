//! Work queue shared by the producer loop and the worker pool
//!
//! The queue is an unbounded FIFO of item URLs with task accounting: every
//! enqueued item stays pending until a worker marks it done, and `join`
//! waits for the pending count to fall to zero.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;

/// A detail page URL waiting to be visited
pub type WorkItem = String;

/// Unbounded FIFO with dequeue-with-timeout and drain tracking
#[derive(Debug)]
pub struct WorkQueue {
    /// Items not yet handed to a worker
    items: Mutex<VecDeque<WorkItem>>,

    /// Wakes a waiting worker when an item is pushed
    available: Notify,

    /// Items enqueued but not yet marked done
    pending: watch::Sender<usize>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            pending,
        }
    }

    /// Appends an item and counts it as pending
    pub fn enqueue(&self, item: impl Into<WorkItem>) {
        // Count first: once pushed, a worker may dequeue and mark it done
        // before this call returns.
        self.pending.send_modify(|pending| *pending += 1);
        self.items().push_back(item.into());
        self.available.notify_one();
    }

    /// Takes the oldest item, waiting at most `timeout` for one to arrive
    ///
    /// Returns `None` when the timeout elapses with the queue still empty.
    pub async fn dequeue(&self, timeout: Duration) -> Option<WorkItem> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before checking so a push between the check
            // and the await still wakes us.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.items().pop_front() {
                return Some(item);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.items().pop_front();
            }
        }
    }

    /// Marks a previously dequeued item as finished
    ///
    /// Must be called exactly once per dequeued item, whether processing
    /// succeeded or not.
    pub fn mark_done(&self, item: &str) {
        let decremented = self.pending.send_if_modified(|pending| {
            if *pending == 0 {
                false
            } else {
                *pending -= 1;
                true
            }
        });

        if !decremented {
            tracing::warn!("mark_done({}) called with no pending items", item);
        }
    }

    /// Waits until every enqueued item has been marked done
    pub async fn join(&self) {
        let mut pending = self.pending.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = pending.wait_for(|count| *count == 0).await;
    }

    /// Returns the number of items enqueued but not yet marked done
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Returns the number of items waiting to be dequeued
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Returns whether no items are waiting to be dequeued
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
