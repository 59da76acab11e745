//! Trial Executor
//!
//! Runs exactly one (test case, configuration) trial end to end and always
//! hands back a `TrialRecord`, success or failure, never an error across
//! this boundary. That containment is what lets a long sweep survive
//! individual bad cells.

use crate::sampler::ResourceSampler;
use crate::supervisor::{EngineSupervisor, SearchLimits, SupervisorError};
use std::time::{Duration, Instant};
use sweepbench_core::{
    EngineOptions, FailureReason, ResourceSummary, TestCase, TrialRecord,
};
use sweepbench_proto::{parse_search_output, ProtocolError};
use tracing::{debug, warn};

/// Per-trial execution settings.
#[derive(Debug, Clone, Copy)]
pub struct TrialExecutor {
    /// Marker-wait timeout for one workload
    pub timeout: Duration,
    /// Resource bounds sent with each workload
    pub limits: SearchLimits,
    /// Whether to sample host resources during the workload
    pub sample_resources: bool,
    /// Sampling tick interval
    pub sample_interval: Duration,
}

impl TrialExecutor {
    /// Execute one trial. Every worker-side failure mode (crash, timeout,
    /// malformed output) is folded into the returned record.
    pub fn execute(
        &self,
        supervisor: &mut EngineSupervisor,
        case: &TestCase,
        options: &EngineOptions,
        repeat: u32,
    ) -> TrialRecord {
        if let Err(e) = supervisor.ensure_ready() {
            warn!(case = %case.id, error = %e, "engine unavailable, skipping trial");
            return TrialRecord::failed(
                case.id.clone(),
                options.clone(),
                repeat,
                Duration::ZERO,
                FailureReason::EngineUnavailable,
            );
        }

        if let Err(e) = supervisor.configure(options) {
            warn!(case = %case.id, error = %e, "configuration replay failed");
            supervisor.mark_crashed();
            return TrialRecord::failed(
                case.id.clone(),
                options.clone(),
                repeat,
                Duration::ZERO,
                FailureReason::EngineCrashed,
            );
        }

        let sampler = self
            .sample_resources
            .then(|| ResourceSampler::spawn(self.sample_interval));

        let start = Instant::now();
        let outcome = supervisor.analyze(case, self.limits, self.timeout);
        let elapsed = start.elapsed();

        // Join the sampler before classifying: its lifetime is the trial's
        let samples = sampler.map(|handle| handle.stop());
        let resources = samples
            .as_deref()
            .and_then(ResourceSummary::from_samples);

        let record = match outcome {
            Ok(lines) => match parse_search_output(&lines) {
                Ok(metrics) => {
                    debug!(
                        case = %case.id,
                        best = %metrics.best_move,
                        nodes = metrics.nodes,
                        secs = elapsed.as_secs_f64(),
                        "trial complete"
                    );
                    TrialRecord::passed(case.id.clone(), options.clone(), repeat, elapsed, metrics)
                }
                Err(e) => {
                    warn!(case = %case.id, error = %e, "unusable search output");
                    TrialRecord::failed(
                        case.id.clone(),
                        options.clone(),
                        repeat,
                        elapsed,
                        FailureReason::MalformedOutput,
                    )
                }
            },
            Err(SupervisorError::Protocol(ProtocolError::Timeout { .. })) => {
                warn!(case = %case.id, timeout = ?self.timeout, "trial timed out");
                // The engine may be wedged mid-search; start the next trial
                // from a fresh process.
                supervisor.request_restart();
                TrialRecord::failed(
                    case.id.clone(),
                    options.clone(),
                    repeat,
                    elapsed,
                    FailureReason::Timeout,
                )
            }
            Err(SupervisorError::Unavailable) | Err(SupervisorError::NotRunning) => {
                TrialRecord::failed(
                    case.id.clone(),
                    options.clone(),
                    repeat,
                    elapsed,
                    FailureReason::EngineUnavailable,
                )
            }
            Err(e) => {
                warn!(case = %case.id, error = %e, "engine died mid-trial");
                supervisor.mark_crashed();
                TrialRecord::failed(
                    case.id.clone(),
                    options.clone(),
                    repeat,
                    elapsed,
                    FailureReason::EngineCrashed,
                )
            }
        };

        record.with_resources(resources)
    }
}
