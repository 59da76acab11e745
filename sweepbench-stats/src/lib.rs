#![warn(missing_docs)]
//! Sweepbench Statistics
//!
//! Reduces raw trial records into grouped summaries:
//! - `AggregateStat`: count / mean / population σ / min / max over one group
//! - `group_by`: per-key summaries with separate failure accounting
//! - `ratio`: speedup figures with an explicit undefined value
//! - `match_rate`: agreement rate over paired successful trials
//! - `pivot`: two-dimensional cross-tabulation for heatmap-style tables
//!
//! Aggregates are derived views, recomputed on demand from the records that
//! back them; nothing here is persisted on its own.

mod aggregate;
mod tables;

pub use aggregate::{compute_aggregate, group_by, AggregateStat, GroupSummary, Metric};
pub use tables::{match_rate, pivot, ratio};
