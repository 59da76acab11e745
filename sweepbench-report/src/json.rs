//! JSON Output

use crate::report::SweepReport;

/// Generate the prettified JSON artifact for a sweep report.
pub fn generate_json_report(report: &SweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_report, ReportMeta, RunnerEcho, SystemInfo};
    use sweepbench_core::SweepResult;

    #[test]
    fn json_artifact_round_trips() {
        let meta = ReportMeta {
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
                inter_trial_delay_ms: 250,
                repeats: 1,
                sample_resources: true,
            },
        };
        let report = build_report(&SweepResult::new(0), meta, None);
        let json = generate_json_report(&report).unwrap();
        let parsed: SweepReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.meta.schema_version, crate::SCHEMA_VERSION);
        assert_eq!(parsed.meta.runner.inter_trial_delay_ms, 250);
        assert!(parsed.by_configuration.is_empty());
    }
}
