//! Markdown Summary
//!
//! Renders the human-facing sweep summary: per-configuration tables, the
//! speedup section against a baseline, a case × configuration pivot of mean
//! durations, and the failure roster. Standard deviations are population σ,
//! stated in the table headers.

use crate::report::SweepReport;
use sweepbench_stats::{pivot, Metric};

/// Render `n/a` for figures that are explicitly undefined.
fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

/// Generate the Markdown summary for a sweep report.
pub fn generate_markdown_report(report: &SweepReport) -> String {
    let mut out = String::new();

    out.push_str("# Engine Sweep Report\n\n");
    out.push_str(&format!(
        "- Date: {}\n- Engine: {}\n- Host: {} ({} cores, {:.1} GB), {}\n- Trials: {} requested, {} recorded{}\n\n",
        report.meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        report.meta.runner.engine,
        report.meta.system.cpu,
        report.meta.system.cpu_cores,
        report.meta.system.memory_gb,
        report.meta.system.os,
        report.result.requested,
        report.result.len(),
        if report.result.cancelled {
            " (cancelled)"
        } else {
            ""
        },
    ));

    out.push_str("## Results by configuration\n\n");
    out.push_str(
        "| Configuration | n | Failures | Fail rate | Mean (s) | σ pop (s) | Min (s) | Max (s) | Mean nodes/s |\n",
    );
    out.push_str(
        "|---------------|---|----------|-----------|----------|-----------|---------|---------|--------------|\n",
    );
    for summary in &report.by_configuration {
        out.push_str(&format!(
            "| {} | {} | {} | {:.0}% | {:.3} | {:.3} | {:.3} | {:.3} | {:.0} |\n",
            summary.options_key,
            summary.duration.attempts,
            summary.duration.failures,
            summary.failure_rate * 100.0,
            summary.duration.stat.mean,
            summary.duration.stat.std_dev,
            summary.duration.stat.min,
            summary.duration.stat.max,
            summary.throughput.stat.mean,
        ));
    }
    out.push('\n');

    if let Some(best) = report
        .by_configuration
        .iter()
        .filter(|s| s.duration.stat.count > 0)
        .min_by(|a, b| {
            a.duration
                .stat
                .mean
                .partial_cmp(&b.duration.stat.mean)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        out.push_str(&format!(
            "Fastest configuration: `{}` ({:.3}s mean)\n\n",
            best.options_key, best.duration.stat.mean
        ));
    }

    if let Some(baseline) = &report.baseline {
        out.push_str(&format!(
            "## Speedup vs `{}`\n\n",
            baseline.baseline_key
        ));
        out.push_str("| Configuration | Speedup | Best-move agreement |\n");
        out.push_str("|---------------|---------|---------------------|\n");
        for entry in &baseline.entries {
            let marker = if entry.is_baseline { " (baseline)" } else { "" };
            let agreement = entry
                .best_move_agreement
                .map(|a| format!("{:.0}%", a * 100.0))
                .unwrap_or_else(|| {
                    if entry.is_baseline {
                        "—".to_string()
                    } else {
                        "n/a".to_string()
                    }
                });
            out.push_str(&format!(
                "| {}{} | {} | {} |\n",
                entry.options_key,
                marker,
                fmt_opt(entry.speedup, 2),
                agreement,
            ));
        }
        out.push('\n');
    }

    // Case × configuration pivot of mean durations
    let table = pivot(
        &report.result.records,
        Metric::DurationSecs,
        |r| Some(r.case_id.clone()),
        |r| Some(r.options_key()),
    );
    if !table.is_empty() {
        let mut cases: Vec<&String> = Vec::new();
        for (case, _) in table.keys() {
            if !cases.contains(&case) {
                cases.push(case);
            }
        }
        let columns: Vec<&str> = report
            .by_configuration
            .iter()
            .map(|s| s.options_key.as_str())
            .collect();

        out.push_str("## Mean duration by case × configuration (s)\n\n");
        out.push_str("| Case |");
        for col in &columns {
            out.push_str(&format!(" {} |", col));
        }
        out.push('\n');
        out.push_str("|------|");
        for _ in &columns {
            out.push_str("------|");
        }
        out.push('\n');
        for case in cases {
            out.push_str(&format!("| {} |", case));
            for col in &columns {
                let cell = table.get(&(case.clone(), col.to_string()));
                let rendered = match cell {
                    Some(cell) if cell.stat.count > 0 => format!("{:.3}", cell.stat.mean),
                    Some(_) => "fail".to_string(),
                    None => "—".to_string(),
                };
                out.push_str(&format!(" {} |", rendered));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    let failures: Vec<_> = report.result.failures().collect();
    if !failures.is_empty() {
        out.push_str("## Failures\n\n");
        for record in failures {
            out.push_str(&format!(
                "- `{}` / `{}` (repeat {}): {}\n",
                record.case_id,
                record.options_key(),
                record.repeat,
                record
                    .failure
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_report, ReportMeta, RunnerEcho, SystemInfo};
    use std::time::Duration;
    use sweepbench_core::{
        EngineOptions, FailureReason, SearchMetrics, SweepResult, TrialRecord,
    };

    fn meta() -> ReportMeta {
        ReportMeta {
            schema_version: crate::SCHEMA_VERSION,
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
            system: SystemInfo {
                os: "linux".to_string(),
                cpu: "test".to_string(),
                cpu_cores: 2,
                memory_gb: 4.0,
            },
            runner: RunnerEcho {
                engine: "./engine".to_string(),
                trial_timeout_secs: 30.0,
                inter_trial_delay_ms: 0,
                repeats: 1,
                sample_resources: false,
            },
        }
    }

    fn records() -> SweepResult {
        let mut result = SweepResult::new(3);
        result.push(TrialRecord::passed(
            "opening",
            EngineOptions::new().with("Lambda", 0.1),
            0,
            Duration::from_secs(2),
            SearchMetrics {
                best_move: "e2e4".to_string(),
                nodes: 20_000,
                nps: 10_000,
                ..Default::default()
            },
        ));
        result.push(TrialRecord::passed(
            "opening",
            EngineOptions::new().with("Lambda", 0.5),
            0,
            Duration::from_secs(4),
            SearchMetrics {
                best_move: "d2d4".to_string(),
                nodes: 40_000,
                nps: 10_000,
                ..Default::default()
            },
        ));
        result.push(TrialRecord::failed(
            "endgame",
            EngineOptions::new().with("Lambda", 0.5),
            0,
            Duration::from_secs(30),
            FailureReason::Timeout,
        ));
        result
    }

    #[test]
    fn summary_contains_all_sections() {
        let report = build_report(&records(), meta(), Some("Lambda=0.1"));
        let md = generate_markdown_report(&report);

        assert!(md.contains("# Engine Sweep Report"));
        assert!(md.contains("## Results by configuration"));
        assert!(md.contains("| Lambda=0.1 |"));
        assert!(md.contains("## Speedup vs `Lambda=0.1`"));
        assert!(md.contains("## Mean duration by case × configuration"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("timeout"));
    }

    #[test]
    fn undefined_figures_render_as_na() {
        // Baseline where all candidate trials failed → speedup undefined
        let mut result = SweepResult::new(2);
        result.push(TrialRecord::passed(
            "opening",
            EngineOptions::new().with("Lambda", 0.1),
            0,
            Duration::from_secs(2),
            SearchMetrics {
                best_move: "e2e4".to_string(),
                ..Default::default()
            },
        ));
        result.push(TrialRecord::failed(
            "opening",
            EngineOptions::new().with("Lambda", 0.5),
            0,
            Duration::from_secs(30),
            FailureReason::Timeout,
        ));
        let report = build_report(&result, meta(), Some("Lambda=0.1"));
        let md = generate_markdown_report(&report);
        assert!(md.contains("n/a"));
        assert!(!md.contains("inf"));
    }

    #[test]
    fn fastest_configuration_called_out() {
        let report = build_report(&records(), meta(), None);
        let md = generate_markdown_report(&report);
        assert!(md.contains("Fastest configuration: `Lambda=0.1`"));
    }
}
