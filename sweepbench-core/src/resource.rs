//! Resource Utilization Samples
//!
//! Coarse CPU/memory snapshots collected concurrently with a trial, and their
//! per-trial summary. Collection lives in the CLI crate's sampler; these are
//! just the value types.

use serde::{Deserialize, Serialize};

/// One host utilization snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Milliseconds since sampling started
    pub elapsed_ms: u64,
    /// Total CPU utilization in percent (all cores)
    pub cpu_pct: f32,
    /// Used physical memory in percent
    pub mem_pct: f32,
}

/// Mean/max reduction of a sample series, attached to a `TrialRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Number of snapshots the summary was computed from
    pub sample_count: usize,
    /// Mean CPU utilization in percent
    pub cpu_mean: f32,
    /// Peak CPU utilization in percent
    pub cpu_max: f32,
    /// Mean memory utilization in percent
    pub mem_mean: f32,
    /// Peak memory utilization in percent
    pub mem_max: f32,
}

impl ResourceSummary {
    /// Summarize a sample series. Returns `None` for an empty series so a
    /// too-short trial reports "no data" rather than zeros.
    pub fn from_samples(samples: &[ResourceSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f32;
        let mut cpu_sum = 0.0f32;
        let mut mem_sum = 0.0f32;
        let mut cpu_max = 0.0f32;
        let mut mem_max = 0.0f32;
        for s in samples {
            cpu_sum += s.cpu_pct;
            mem_sum += s.mem_pct;
            cpu_max = cpu_max.max(s.cpu_pct);
            mem_max = mem_max.max(s.mem_pct);
        }
        Some(Self {
            sample_count: samples.len(),
            cpu_mean: cpu_sum / n,
            cpu_max,
            mem_mean: mem_sum / n,
            mem_max,
        })
    }
}
