//! Comparison Tables
//!
//! Cross-group derivations: speedup ratios, best-move agreement over paired
//! trials, and two-dimensional pivots.

use crate::{group_by, AggregateStat, GroupSummary, Metric};
use std::collections::BTreeMap;
use sweepbench_core::TrialRecord;

/// Ratio of two group means, `a.mean / b.mean`.
///
/// Undefined when the denominator mean is not positive: returned as `None`,
/// never as zero or infinity, so a degenerate baseline cannot fabricate a
/// speedup figure.
pub fn ratio(a: &AggregateStat, b: &AggregateStat) -> Option<f64> {
    if b.mean > 0.0 {
        Some(a.mean / b.mean)
    } else {
        None
    }
}

/// Fraction of record pairs for which `predicate` holds, restricted to pairs
/// where both sides succeeded. `None` when no pair is eligible.
pub fn match_rate<'a, I, F>(pairs: I, predicate: F) -> Option<f64>
where
    I: IntoIterator<Item = (&'a TrialRecord, &'a TrialRecord)>,
    F: Fn(&TrialRecord, &TrialRecord) -> bool,
{
    let mut eligible = 0usize;
    let mut matched = 0usize;

    for (left, right) in pairs {
        if !(left.success && right.success) {
            continue;
        }
        eligible += 1;
        if predicate(left, right) {
            matched += 1;
        }
    }

    if eligible == 0 {
        None
    } else {
        Some(matched as f64 / eligible as f64)
    }
}

/// Two-dimensional cross-tabulation: one `GroupSummary` per (row, column)
/// cell, e.g. position × option value for heatmap-style report tables.
pub fn pivot<RK, CK, FR, FC>(
    records: &[TrialRecord],
    metric: Metric,
    row_fn: FR,
    col_fn: FC,
) -> BTreeMap<(RK, CK), GroupSummary>
where
    RK: Ord,
    CK: Ord,
    FR: Fn(&TrialRecord) -> Option<RK>,
    FC: Fn(&TrialRecord) -> Option<CK>,
{
    group_by(records, metric, |record| {
        match (row_fn(record), col_fn(record)) {
            (Some(row), Some(col)) => Some((row, col)),
            _ => None,
        }
    })
}
