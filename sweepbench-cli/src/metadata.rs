//! System Metadata Collection
//!
//! Captures host details for report metadata. Values degrade gracefully to
//! "unknown"/zero when the platform withholds them.

use chrono::Utc;
use sweepbench_report::{ReportMeta, RunnerEcho, SystemInfo};
use sysinfo::System;

/// Build report metadata for the current host and runner settings.
pub fn build_report_meta(runner: RunnerEcho) -> ReportMeta {
    let mut system = System::new();
    system.refresh_cpu_all();
    system.refresh_memory();

    let cpu = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let cpu_cores = std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1);
    let os = System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
    let memory_gb = system.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0;

    ReportMeta {
        schema_version: sweepbench_report::SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        system: SystemInfo {
            os,
            cpu,
            cpu_cores,
            memory_gb,
        },
        runner,
    }
}
