//! Trial Records and Sweep Results
//!
//! A `TrialRecord` is the immutable outcome of executing one
//! (test case, configuration) cell: timing, throughput, the engine's reported
//! search result, and a success flag with an attributable failure reason.
//! Failures are first-class values here, never exceptions in flight.

use crate::{EngineOptions, ResourceSummary};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a trial failed. Every failed record carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// The engine crashed and the single restart attempt also failed
    EngineUnavailable,
    /// No completion marker within the trial timeout
    Timeout,
    /// Marker seen but the expected result fields were absent or unparseable
    MalformedOutput,
    /// The engine's output stream closed mid-trial
    EngineCrashed,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::EngineUnavailable => write!(f, "engine-unavailable"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::MalformedOutput => write!(f, "malformed-output"),
            FailureReason::EngineCrashed => write!(f, "engine-crashed"),
        }
    }
}

/// Search result fields extracted from the engine's output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMetrics {
    /// Best move reported on the completion line
    pub best_move: String,
    /// Centipawn evaluation, if the engine reported one
    pub score_cp: Option<i32>,
    /// Nodes searched
    pub nodes: u64,
    /// Engine-reported nodes per second (0 when absent)
    pub nps: u64,
    /// Deepest completed search depth, if reported
    pub depth: Option<u32>,
    /// Length of the principal variation in plies
    pub pv_len: usize,
}

/// Immutable result of one (test case, configuration) execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Test case identifier
    pub case_id: String,
    /// Full configuration used for this trial
    pub options: EngineOptions,
    /// Repeat index when the matrix is run multiple times (0-based)
    pub repeat: u32,
    /// Wall-clock duration of the workload in nanoseconds
    pub duration_ns: u64,
    /// Whether the trial produced a usable result
    pub success: bool,
    /// Failure reason; present exactly when `success` is false
    pub failure: Option<FailureReason>,
    /// Parsed search output; present exactly when `success` is true
    pub metrics: Option<SearchMetrics>,
    /// Host utilization summary, when sampling was enabled
    pub resources: Option<ResourceSummary>,
}

impl TrialRecord {
    /// Build a successful record.
    pub fn passed(
        case_id: impl Into<String>,
        options: EngineOptions,
        repeat: u32,
        duration: Duration,
        metrics: SearchMetrics,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            options,
            repeat,
            duration_ns: duration.as_nanos() as u64,
            success: true,
            failure: None,
            metrics: Some(metrics),
            resources: None,
        }
    }

    /// Build a failed record with an attributable reason.
    pub fn failed(
        case_id: impl Into<String>,
        options: EngineOptions,
        repeat: u32,
        duration: Duration,
        reason: FailureReason,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            options,
            repeat,
            duration_ns: duration.as_nanos() as u64,
            success: false,
            failure: Some(reason),
            metrics: None,
            resources: None,
        }
    }

    /// Attach a resource summary (builder style, used by the executor).
    pub fn with_resources(mut self, resources: Option<ResourceSummary>) -> Self {
        self.resources = resources;
        self
    }

    /// Canonical key of the configuration used.
    pub fn options_key(&self) -> String {
        self.options.key()
    }

    /// Wall-clock duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ns as f64 / 1e9
    }

    /// Effective throughput in nodes per second: the engine-reported figure
    /// when present, otherwise nodes over wall-clock time. Zero for failures.
    pub fn throughput(&self) -> f64 {
        let Some(metrics) = &self.metrics else {
            return 0.0;
        };
        if metrics.nps > 0 {
            metrics.nps as f64
        } else if self.duration_ns > 0 {
            metrics.nodes as f64 / self.duration_secs()
        } else {
            0.0
        }
    }
}

/// Ordered collection of all trial records from one sweep run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    /// Records in execution order
    pub records: Vec<TrialRecord>,
    /// Number of (case, configuration) cells the sweep was asked to run
    pub requested: usize,
    /// Whether the sweep was cut short by a cancellation signal
    pub cancelled: bool,
}

impl SweepResult {
    /// Create an empty result for a sweep of `requested` cells.
    pub fn new(requested: usize) -> Self {
        Self {
            records: Vec::with_capacity(requested),
            requested,
            cancelled: false,
        }
    }

    /// Append a record. Each (case, configuration, repeat) cell is recorded
    /// exactly once per sweep.
    pub fn push(&mut self, record: TrialRecord) {
        debug_assert!(
            self.get(&record.case_id, &record.options_key(), record.repeat)
                .is_none(),
            "duplicate trial record for {} / {}",
            record.case_id,
            record.options_key()
        );
        self.records.push(record);
    }

    /// Look up the record for one cell.
    pub fn get(&self, case_id: &str, options_key: &str, repeat: u32) -> Option<&TrialRecord> {
        self.records.iter().find(|r| {
            r.case_id == case_id && r.repeat == repeat && r.options_key() == options_key
        })
    }

    /// Number of records collected.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were collected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether every requested cell produced a record.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.records.len() == self.requested
    }

    /// Records that produced a usable result.
    pub fn successes(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| r.success)
    }

    /// Records that failed, with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(lambda: f64) -> EngineOptions {
        EngineOptions::new().with("Lambda", lambda)
    }

    fn metrics() -> SearchMetrics {
        SearchMetrics {
            best_move: "e2e4".to_string(),
            score_cp: Some(25),
            nodes: 26_000,
            nps: 13_000,
            depth: Some(12),
            pv_len: 8,
        }
    }

    #[test]
    fn failed_record_always_has_reason() {
        let record = TrialRecord::failed(
            "opening",
            opts(0.1),
            0,
            Duration::from_secs(5),
            FailureReason::Timeout,
        );
        assert!(!record.success);
        assert_eq!(record.failure, Some(FailureReason::Timeout));
        assert!(record.metrics.is_none());
    }

    #[test]
    fn passed_record_has_metrics_and_no_reason() {
        let record = TrialRecord::passed(
            "opening",
            opts(0.1),
            0,
            Duration::from_secs(2),
            metrics(),
        );
        assert!(record.success);
        assert!(record.failure.is_none());
        assert_eq!(record.metrics.as_ref().unwrap().best_move, "e2e4");
    }

    #[test]
    fn throughput_prefers_engine_nps() {
        let record = TrialRecord::passed(
            "opening",
            opts(0.1),
            0,
            Duration::from_secs(2),
            metrics(),
        );
        assert!((record.throughput() - 13_000.0).abs() < f64::EPSILON);

        let mut no_nps = metrics();
        no_nps.nps = 0;
        let record = TrialRecord::passed(
            "opening",
            opts(0.1),
            0,
            Duration::from_secs(2),
            no_nps,
        );
        assert!((record.throughput() - 13_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sweep_result_lookup_by_cell() {
        let mut result = SweepResult::new(2);
        result.push(TrialRecord::passed(
            "opening",
            opts(0.1),
            0,
            Duration::from_secs(1),
            metrics(),
        ));
        result.push(TrialRecord::failed(
            "opening",
            opts(0.5),
            0,
            Duration::from_secs(5),
            FailureReason::Timeout,
        ));

        assert!(result.is_complete());
        let hit = result.get("opening", &opts(0.5).key(), 0).unwrap();
        assert_eq!(hit.failure, Some(FailureReason::Timeout));
        assert!(result.get("opening", &opts(0.9).key(), 0).is_none());
        assert_eq!(result.successes().count(), 1);
        assert_eq!(result.failures().count(), 1);
    }

    #[test]
    fn failure_reason_serializes_kebab_case() {
        let json = serde_json::to_string(&FailureReason::MalformedOutput).unwrap();
        assert_eq!(json, "\"malformed-output\"");
        assert_eq!(FailureReason::EngineUnavailable.to_string(), "engine-unavailable");
    }
}
