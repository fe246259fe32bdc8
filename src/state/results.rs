use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrently writable set of harvested emails
///
/// Entries are compared by exact string equality. Workers only ever add;
/// the coordinator reads the contents once every worker has been joined.
#[derive(Debug, Default)]
pub struct ResultSet {
    emails: Mutex<HashSet<String>>,
}

impl ResultSet {
    /// Creates an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an email, returning `true` if it was not already present
    pub fn add(&self, email: impl Into<String>) -> bool {
        self.lock().insert(email.into())
    }

    /// Returns the number of distinct emails collected so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns whether the exact email is present
    pub fn contains(&self, email: &str) -> bool {
        self.lock().contains(email)
    }

    /// Copies the contents out in lexicographic order
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut emails: Vec<String> = self.lock().iter().cloned().collect();
        emails.sort();
        emails
    }

    /// Consumes the set and returns its contents in lexicographic order
    pub fn into_sorted_vec(self) -> Vec<String> {
        let mut emails: Vec<String> = self
            .emails
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .collect();
        emails.sort();
        emails
    }

    // A worker that panicked mid-insert cannot leave a HashSet half-written,
    // so a poisoned lock still guards usable data.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.emails.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
