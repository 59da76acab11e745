#![warn(missing_docs)]
//! Sweepbench Core - Data Model
//!
//! Shared value types flowing through a benchmark sweep:
//! - `TestCase` / `EngineOptions` describe one cell of the sweep matrix
//! - `TrialRecord` captures the measured outcome of one cell
//! - `SweepResult` is the ordered collection of all records for a run
//! - `ResourceSample` / `ResourceSummary` carry host utilization data
//!
//! Everything here is plain serializable data; process handling, protocol
//! exchange, and statistics live in the sibling crates.

mod case;
mod options;
mod resource;
mod trial;

pub use case::{Complexity, TestCase};
pub use options::{EngineOptions, OptionValue};
pub use resource::{ResourceSample, ResourceSummary};
pub use trial::{FailureReason, SearchMetrics, SweepResult, TrialRecord};
