//! Run statistics for a finished harvest

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Counters describing one harvest run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Listing pages requested
    pub pages_visited: u32,

    /// Listing pages that contributed nothing because of an error
    pub pages_failed: u32,

    /// Page count from the last listing page that reported one
    pub total_pages: u32,

    /// Item links pushed onto the work queue
    pub items_enqueued: u64,

    /// Items taken off the queue by workers
    pub items_processed: u64,

    /// Items whose processing failed
    pub items_failed: u64,

    /// Distinct emails written to the output file
    pub emails_collected: usize,

    /// Where the emails were written
    pub output_path: PathBuf,
}

impl HarvestSummary {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Share of processed items that yielded no error, as a percentage
    pub fn item_success_rate(&self) -> f64 {
        if self.items_processed == 0 {
            return 0.0;
        }
        let succeeded = self.items_processed - self.items_failed;
        (succeeded as f64 / self.items_processed as f64) * 100.0
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &HarvestSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {} seconds", summary.duration_seconds());
    println!();

    println!("Listing:");
    println!("  Pages visited: {}", summary.pages_visited);
    println!("  Pages failed: {}", summary.pages_failed);
    println!("  Items enqueued: {}", summary.items_enqueued);
    println!();

    println!("Items:");
    println!("  Processed: {}", summary.items_processed);
    println!("  Failed: {}", summary.items_failed);
    println!("  Success rate: {:.1}%", summary.item_success_rate());
    println!();

    println!(
        "Emails: {} written to {}",
        summary.emails_collected,
        summary.output_path.display()
    );
}
