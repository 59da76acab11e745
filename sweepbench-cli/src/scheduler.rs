//! Sweep Scheduler
//!
//! Drives the full case × configuration matrix sequentially against one
//! reused engine handle. A bad trial never aborts the sweep; only a startup
//! failure or a caller-issued cancellation ends it early, and the engine is
//! stopped on every exit path.

use crate::executor::TrialExecutor;
use crate::supervisor::{EngineSupervisor, SupervisorError};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sweepbench_core::{EngineOptions, SweepResult, TestCase};
use tracing::info;

/// Set by the SIGINT handler; merged into every `CancelFlag` so Ctrl-C is
/// observed between trials without threading state into the handler.
static INTERRUPT_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn sigint_handler(_sig: libc::c_int) {
    INTERRUPT_REQUESTED.store(true, Ordering::Relaxed);
}

/// Install a SIGINT handler that requests cooperative cancellation. The
/// handler is async-signal-safe (only sets an atomic).
pub fn install_interrupt_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigint_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
    }
}

/// Cooperative cancellation signal, checked between trials.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested, programmatically or via SIGINT.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed) || INTERRUPT_REQUESTED.load(Ordering::Relaxed)
    }
}

/// Sequential scheduler over the sweep matrix.
pub struct SweepScheduler {
    executor: TrialExecutor,
    /// Settling delay between trials, reducing cross-trial interference
    inter_trial_delay: Duration,
    /// How many times to run the whole matrix
    repeats: u32,
}

impl SweepScheduler {
    /// Create a scheduler.
    pub fn new(executor: TrialExecutor, inter_trial_delay: Duration, repeats: u32) -> Self {
        Self {
            executor,
            inter_trial_delay,
            repeats: repeats.max(1),
        }
    }

    /// Run the full matrix. Exactly one record lands per scheduled cell; a
    /// cancellation finalizes the result with whatever completed. Only a
    /// startup failure propagates.
    pub fn run(
        &self,
        supervisor: &mut EngineSupervisor,
        cases: &[TestCase],
        configurations: &[EngineOptions],
        cancel: &CancelFlag,
    ) -> Result<SweepResult, SupervisorError> {
        let total = cases.len() * configurations.len() * self.repeats as usize;
        let mut result = SweepResult::new(total);

        if total == 0 {
            return Ok(result);
        }

        supervisor.start()?;

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        'sweep: for repeat in 0..self.repeats {
            for case in cases {
                for options in configurations {
                    if cancel.is_cancelled() {
                        result.cancelled = true;
                        break 'sweep;
                    }

                    pb.set_message(format!("{} / {}", case.id, options.key()));
                    let record = self.executor.execute(supervisor, case, options, repeat);
                    let reason = record.failure.map(|r| r.to_string()).unwrap_or_default();
                    info!(
                        case = %record.case_id,
                        options = %record.options_key(),
                        repeat,
                        success = record.success,
                        reason = %reason,
                        secs = record.duration_secs(),
                        "trial recorded"
                    );
                    result.push(record);
                    pb.inc(1);

                    if !self.inter_trial_delay.is_zero() {
                        std::thread::sleep(self.inter_trial_delay);
                    }
                }
            }
        }

        if result.cancelled {
            pb.abandon_with_message("cancelled");
        } else {
            pb.finish_with_message("complete");
        }

        // Drop would catch this too; stopping here keeps the guarantee
        // visible on the normal path as well as the cancelled one.
        supervisor.stop();

        Ok(result)
    }
}
