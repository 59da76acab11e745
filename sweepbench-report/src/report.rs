//! Report Data Structures and Assembly

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sweepbench_core::{SweepResult, TrialRecord};
use sweepbench_stats::{group_by, match_rate, ratio, AggregateStat, GroupSummary, Metric};

/// Complete sweep report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Run metadata
    pub meta: ReportMeta,
    /// Every trial record, in execution order
    pub result: SweepResult,
    /// Per-configuration summaries, in first-appearance order
    pub by_configuration: Vec<ConfigurationSummary>,
    /// Speedup/agreement figures against a baseline configuration
    pub baseline: Option<BaselineComparison>,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// JSON artifact layout version
    pub schema_version: u32,
    /// Harness version that produced the report
    pub version: String,
    /// When the report was assembled
    pub timestamp: DateTime<Utc>,
    /// Host the sweep ran on
    pub system: SystemInfo,
    /// Runner settings echoed for reproducibility
    pub runner: RunnerEcho,
}

/// Host description captured into report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name/version
    pub os: String,
    /// CPU model string
    pub cpu: String,
    /// Logical core count
    pub cpu_cores: u32,
    /// Physical memory in gigabytes
    pub memory_gb: f64,
}

/// The runner settings a sweep executed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerEcho {
    /// Engine binary that was driven
    pub engine: String,
    /// Per-trial timeout in seconds
    pub trial_timeout_secs: f64,
    /// Settling delay between trials in milliseconds
    pub inter_trial_delay_ms: u64,
    /// How many times the matrix was repeated
    pub repeats: u32,
    /// Whether host resources were sampled during trials
    pub sample_resources: bool,
}

/// Summary of all trials sharing one configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    /// Canonical configuration key
    pub options_key: String,
    /// Duration summary (seconds, successful trials only)
    pub duration: GroupSummary,
    /// Throughput summary (nodes/s, successful trials only)
    pub throughput: GroupSummary,
    /// Fraction of this configuration's trials that failed
    pub failure_rate: f64,
}

/// One configuration's standing against the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedupEntry {
    /// Canonical configuration key
    pub options_key: String,
    /// `baseline mean duration / this mean duration`; `None` when undefined
    /// (degenerate mean on either side)
    pub speedup: Option<f64>,
    /// Best-move agreement with the baseline over paired cases; `None` when
    /// no pair had both sides succeed
    pub best_move_agreement: Option<f64>,
    /// Whether this entry is the baseline itself
    pub is_baseline: bool,
}

/// Comparison of every configuration against a named baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineComparison {
    /// Canonical key of the baseline configuration
    pub baseline_key: String,
    /// Entries in first-appearance order, baseline included
    pub entries: Vec<SpeedupEntry>,
}

/// Unique configuration keys in first-appearance order.
fn configuration_keys(records: &[TrialRecord]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        let key = record.options_key();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Pair two configurations' records by (case, repeat) for agreement figures.
fn paired_records<'a>(
    records: &'a [TrialRecord],
    left_key: &str,
    right_key: &str,
) -> Vec<(&'a TrialRecord, &'a TrialRecord)> {
    let left: Vec<&TrialRecord> = records
        .iter()
        .filter(|r| r.options_key() == left_key)
        .collect();
    records
        .iter()
        .filter(|r| r.options_key() == right_key)
        .filter_map(|right| {
            left.iter()
                .find(|l| l.case_id == right.case_id && l.repeat == right.repeat)
                .map(|l| (*l, right))
        })
        .collect()
}

/// Assemble a report from a finished sweep.
///
/// Per-configuration summaries are computed in parallel; the records
/// themselves are carried verbatim so downstream tooling can re-derive
/// anything the tables leave out.
pub fn build_report(
    result: &SweepResult,
    meta: ReportMeta,
    baseline_key: Option<&str>,
) -> SweepReport {
    let records = &result.records;
    let keys = configuration_keys(records);

    let (durations, throughputs) = rayon::join(
        || group_by(records, Metric::DurationSecs, |r| Some(r.options_key())),
        || group_by(records, Metric::Throughput, |r| Some(r.options_key())),
    );

    let empty = GroupSummary {
        stat: AggregateStat::empty(),
        failures: 0,
        attempts: 0,
    };
    let by_configuration: Vec<ConfigurationSummary> = keys
        .iter()
        .map(|key| {
            let duration = durations.get(key).copied().unwrap_or(empty);
            let throughput = throughputs.get(key).copied().unwrap_or(empty);
            ConfigurationSummary {
                options_key: key.clone(),
                failure_rate: duration.failure_rate(),
                duration,
                throughput,
            }
        })
        .collect();

    let baseline = baseline_key.and_then(|base| {
        if !keys.iter().any(|k| k == base) {
            return None;
        }
        let base_duration = by_configuration
            .iter()
            .find(|s| s.options_key == base)?
            .duration
            .stat;

        let entries = by_configuration
            .iter()
            .map(|summary| {
                let is_baseline = summary.options_key == base;
                let speedup = if is_baseline {
                    Some(1.0)
                } else {
                    // Baseline time over candidate time: >1.0 means faster
                    ratio(&base_duration, &summary.duration.stat)
                };
                let best_move_agreement = if is_baseline {
                    None
                } else {
                    match_rate(
                        paired_records(records, base, &summary.options_key),
                        |l, r| {
                            l.metrics.as_ref().map(|m| &m.best_move)
                                == r.metrics.as_ref().map(|m| &m.best_move)
                        },
                    )
                };
                SpeedupEntry {
                    options_key: summary.options_key.clone(),
                    speedup,
                    best_move_agreement,
                    is_baseline,
                }
            })
            .collect();

        Some(BaselineComparison {
            baseline_key: base.to_string(),
            entries,
        })
    });

    SweepReport {
        meta,
        result: result.clone(),
        by_configuration,
        baseline,
    }
}
