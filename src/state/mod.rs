//! Shared state for a harvest run
//!
//! This module provides the state shared between the coordinator and its workers.
//!
//! # Components
//!
//! - `ResultSet`: Deduplicated set of harvested emails, written by every worker
//! - `StopSignal`: One-shot flag telling idle workers to exit

mod results;
mod stop;

// Re-export main types
pub use results::ResultSet;
pub use stop::StopSignal;
