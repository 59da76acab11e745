//! Resource Sampler
//!
//! Collects coarse host CPU/memory utilization on a dedicated thread while a
//! trial is in flight, without touching the trial's own timing. The thread
//! has a defined join point: `SamplerHandle::stop` ends collection and hands
//! the series back, so sampling is part of the trial's lifecycle rather than
//! a detached background task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use sweepbench_core::ResourceSample;
use sysinfo::System;

/// Spawns sampling threads with a fixed tick interval.
pub struct ResourceSampler;

/// A running sampling thread. Dropping the handle without calling
/// [`stop`](SamplerHandle::stop) detaches the thread; the scheduler always
/// stops explicitly.
pub struct SamplerHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Vec<ResourceSample>>,
}

impl ResourceSampler {
    /// Default tick interval.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    /// Start sampling on its own thread until the handle is stopped.
    pub fn spawn(interval: Duration) -> SamplerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let thread = std::thread::spawn(move || {
            let mut system = System::new();
            let start = Instant::now();
            let mut samples = Vec::new();

            // Prime the CPU counters; utilization is a delta between refreshes
            system.refresh_cpu_usage();

            while !flag.load(Ordering::Relaxed) {
                std::thread::sleep(interval);
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                system.refresh_cpu_usage();
                system.refresh_memory();

                let total = system.total_memory();
                if total == 0 {
                    // Transient sysinfo hiccup: the tick is dropped, never an error
                    continue;
                }
                samples.push(ResourceSample {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                    cpu_pct: system.global_cpu_usage(),
                    mem_pct: system.used_memory() as f32 / total as f32 * 100.0,
                });
            }

            samples
        });

        SamplerHandle { stop, thread }
    }

    /// Sample for a fixed duration, blocking the caller, then return the
    /// collected series. Shorter than one interval yields an empty series.
    pub fn sample(duration: Duration, interval: Duration) -> Vec<ResourceSample> {
        let handle = Self::spawn(interval);
        std::thread::sleep(duration);
        handle.stop()
    }
}

impl SamplerHandle {
    /// End collection and return the series. Joining is infallible from the
    /// caller's view; a panicked sampler yields an empty series.
    pub fn stop(self) -> Vec<ResourceSample> {
        self.stop.store(true, Ordering::Relaxed);
        self.thread.join().unwrap_or_default()
    }
}
