//! Grouped Aggregation
//!
//! Numeric aggregation runs over successful records only; failed records are
//! excluded from the figures but counted into the group's failure rate so a
//! flaky configuration cannot masquerade as a fast one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sweepbench_core::TrialRecord;

/// Which measured field a reduction runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Wall-clock duration in seconds
    DurationSecs,
    /// Effective throughput in nodes per second
    Throughput,
}

impl Metric {
    /// Extract this metric from a record.
    pub fn value(&self, record: &TrialRecord) -> f64 {
        match self {
            Metric::DurationSecs => record.duration_secs(),
            Metric::Throughput => record.throughput(),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::DurationSecs => write!(f, "duration (s)"),
            Metric::Throughput => write!(f, "throughput (nodes/s)"),
        }
    }
}

/// Read-only summary over one group of values.
///
/// `std_dev` is the population standard deviation (divisor n, not n-1);
/// report output states this explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    /// Number of values aggregated
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl AggregateStat {
    /// The all-zero summary of an empty group.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }
}

/// Compute an `AggregateStat` over raw values.
pub fn compute_aggregate(values: &[f64]) -> AggregateStat {
    if values.is_empty() {
        return AggregateStat::empty();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }

    AggregateStat {
        count: values.len(),
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    }
}

/// Aggregate for one grouping key: the numeric summary over successful
/// records plus the group's failure accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Summary over the successful records of the group
    pub stat: AggregateStat,
    /// Records in the group that failed
    pub failures: usize,
    /// All records attributed to the group, failed ones included
    pub attempts: usize,
}

impl GroupSummary {
    /// Fraction of the group's attempts that failed; 0.0 for an empty group.
    pub fn failure_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.failures as f64 / self.attempts as f64
        }
    }
}

/// Group records by a caller-supplied key and summarize `metric` per group.
///
/// `key_fn` returning `None` leaves a record out of every group (useful when
/// grouping by an option a record's configuration does not carry).
pub fn group_by<K, F>(
    records: &[TrialRecord],
    metric: Metric,
    key_fn: F,
) -> BTreeMap<K, GroupSummary>
where
    K: Ord,
    F: Fn(&TrialRecord) -> Option<K>,
{
    let mut values: BTreeMap<K, (Vec<f64>, usize, usize)> = BTreeMap::new();

    for record in records {
        let Some(key) = key_fn(record) else {
            continue;
        };
        let entry = values.entry(key).or_default();
        entry.2 += 1;
        if record.success {
            entry.0.push(metric.value(record));
        } else {
            entry.1 += 1;
        }
    }

    values
        .into_iter()
        .map(|(key, (vals, failures, attempts))| {
            (
                key,
                GroupSummary {
                    stat: compute_aggregate(&vals),
                    failures,
                    attempts,
                },
            )
        })
        .collect()
}
