//! Output module for harvest results
//!
//! This module handles:
//! - Writing the harvested emails to the output file
//! - Summarising a finished run

pub mod stats;
mod writer;

pub use stats::{print_summary, HarvestSummary};
pub use writer::{expand_home, format_emails, write_emails};
