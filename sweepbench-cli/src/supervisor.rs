//! Engine Process Supervisor
//!
//! Owns the lifecycle of one engine process and presents it as a stable
//! handle across crashes: `Stopped → Starting → Ready ⇄ Busy → Stopping →
//! Stopped`, with `Crashed` reachable whenever the process dies or stops
//! answering liveness probes.
//!
//! One process is reused across many trials; spawning per trial would both
//! throttle the sweep and hide steady-state behavior. The explicit state
//! machine is what keeps a half-dead process from silently absorbing
//! further commands.

use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};
use sweepbench_core::{EngineOptions, TestCase};
use sweepbench_proto::{
    EngineCommand, ProtocolError, ProtocolSession, INIT_MARKER, READY_MARKER, SEARCH_MARKER,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long a process gets to exit after SIGTERM before SIGKILL.
const SIGTERM_GRACE: Duration = Duration::from_millis(500);

/// Poll step while waiting for a process to exit.
const WAIT_STEP: Duration = Duration::from_millis(10);

/// Errors from engine lifecycle management.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The binary could not be spawned at all
    #[error("failed to launch engine '{binary}': {source}")]
    Launch {
        /// Binary that was asked for
        binary: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The process started but the handshake did not complete
    #[error("engine handshake did not complete: {0}")]
    Handshake(#[source] ProtocolError),

    /// The engine crashed and the single restart attempt also failed
    #[error("engine unavailable: crashed and the restart attempt failed")]
    Unavailable,

    /// An operation was issued with no live process
    #[error("no engine process is running")]
    NotRunning,

    /// Protocol exchange with a live process failed
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl SupervisorError {
    /// Whether this error means the engine never became usable at all,
    /// which is fatal to the whole sweep rather than to one trial.
    pub fn is_startup(&self) -> bool {
        matches!(self, SupervisorError::Launch { .. } | SupervisorError::Handshake(_))
    }
}

/// Lifecycle state of the supervised engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No process
    Stopped,
    /// Spawned, handshake in flight
    Starting,
    /// Handshaken and idle
    Ready,
    /// A workload is in flight
    Busy,
    /// Process died or stopped responding
    Crashed,
    /// Graceful shutdown in flight
    Stopping,
}

/// Node/time bounds passed to the engine with each workload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Node-count ceiling
    pub nodes: Option<u64>,
    /// Wall-clock ceiling in milliseconds
    pub movetime_ms: Option<u64>,
}

struct EngineProcess {
    child: Child,
    session: ProtocolSession<ChildStdout, ChildStdin>,
}

/// Supervised handle to one engine process.
pub struct EngineSupervisor {
    binary: PathBuf,
    args: Vec<String>,
    handshake_timeout: Duration,
    probe_timeout: Duration,
    stop_grace: Duration,
    state: EngineState,
    process: Option<EngineProcess>,
    restart_pending: bool,
}

impl EngineSupervisor {
    /// Create a supervisor for `binary` with the given lifecycle timeouts.
    /// No process is spawned until [`start`](Self::start).
    pub fn new(
        binary: impl Into<PathBuf>,
        args: Vec<String>,
        handshake_timeout: Duration,
        probe_timeout: Duration,
        stop_grace: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            args,
            handshake_timeout,
            probe_timeout,
            stop_grace,
            state: EngineState::Stopped,
            process: None,
            restart_pending: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// OS pid of the attached process, if any.
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|p| p.child.id())
    }

    /// Whether a live process is attached to the handle.
    pub fn is_running(&mut self) -> bool {
        match self.process.as_mut() {
            Some(proc) => matches!(proc.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Spawn the engine and complete the initialization handshake.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        self.state = EngineState::Starting;

        let mut command = Command::new(&self.binary);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // Engine chatter on stderr must not fill a pipe nobody drains
            .stderr(Stdio::null());

        let mut child = command.spawn().map_err(|source| {
            self.state = EngineState::Stopped;
            SupervisorError::Launch {
                binary: self.binary.display().to_string(),
                source,
            }
        })?;

        // Piped stdio is always present after a successful spawn
        let stdin = child.stdin.take().ok_or(SupervisorError::NotRunning)?;
        let stdout = child.stdout.take().ok_or(SupervisorError::NotRunning)?;
        let poll_fd = stdout.as_raw_fd();
        let session = ProtocolSession::with_poll_fd(stdout, stdin, poll_fd);

        let mut process = EngineProcess { child, session };

        let handshake = process
            .session
            .send(&EngineCommand::Init)
            .and_then(|_| process.session.await_marker(INIT_MARKER, self.handshake_timeout));

        match handshake {
            Ok(lines) => {
                debug!(lines = lines.len(), "engine handshake complete");
                self.process = Some(process);
                self.state = EngineState::Ready;
                self.restart_pending = false;
                info!(binary = %self.binary.display(), "engine started");
                Ok(())
            }
            Err(e) => {
                let _ = process.child.kill();
                let _ = process.child.wait();
                self.state = EngineState::Stopped;
                Err(SupervisorError::Handshake(e))
            }
        }
    }

    /// Make sure a healthy process is attached, restarting at most once.
    ///
    /// From `Crashed` (or with a restart scheduled after a wedged trial) the
    /// old process is torn down and one fresh start is attempted; if that
    /// also fails the caller gets `Unavailable` and decides whether to skip
    /// the trial or abort.
    pub fn ensure_ready(&mut self) -> Result<(), SupervisorError> {
        let needs_restart = self.restart_pending
            || matches!(self.state, EngineState::Crashed | EngineState::Stopped)
            || !self.probe();

        if !needs_restart {
            self.state = EngineState::Ready;
            return Ok(());
        }

        warn!(state = ?self.state, "engine not ready, attempting one restart");
        self.teardown();
        self.state = EngineState::Crashed;
        match self.start() {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!(error = %e, "restart attempt failed");
                self.state = EngineState::Crashed;
                Err(SupervisorError::Unavailable)
            }
        }
    }

    /// Liveness probe: the process is running and answers `isready` within
    /// the grace period.
    fn probe(&mut self) -> bool {
        let probe_timeout = self.probe_timeout;
        let Some(proc) = self.process.as_mut() else {
            return false;
        };
        match proc.child.try_wait() {
            Ok(None) => {}
            _ => return false,
        }
        proc.session.send(&EngineCommand::IsReady).is_ok()
            && proc
                .session
                .await_marker(READY_MARKER, probe_timeout)
                .is_ok()
    }

    /// Replay a configuration to the engine, one option per line in
    /// insertion order.
    pub fn configure(&mut self, options: &EngineOptions) -> Result<(), SupervisorError> {
        let proc = self.process.as_mut().ok_or(SupervisorError::NotRunning)?;
        proc.session.send_options(options)?;
        Ok(())
    }

    /// Issue one workload and wait for its completion marker, returning the
    /// accumulated output lines.
    ///
    /// Timeouts leave the state `Busy`: the process may be wedged mid-search
    /// and the caller is expected to schedule a restart. Closed streams move
    /// straight to `Crashed`.
    pub fn analyze(
        &mut self,
        case: &TestCase,
        limits: SearchLimits,
        timeout: Duration,
    ) -> Result<Vec<String>, SupervisorError> {
        let proc = self.process.as_mut().ok_or(SupervisorError::NotRunning)?;
        self.state = EngineState::Busy;

        let outcome = (|| -> Result<Vec<String>, ProtocolError> {
            proc.session
                .send(&EngineCommand::position(case.position.clone()))?;
            proc.session.send(&EngineCommand::Go {
                nodes: limits.nodes,
                movetime_ms: limits.movetime_ms,
            })?;
            proc.session.await_marker(SEARCH_MARKER, timeout)
        })();

        match outcome {
            Ok(lines) => {
                self.state = EngineState::Ready;
                Ok(lines)
            }
            Err(e @ ProtocolError::Timeout { .. }) => Err(SupervisorError::Protocol(e)),
            Err(e) => {
                self.state = EngineState::Crashed;
                Err(SupervisorError::Protocol(e))
            }
        }
    }

    /// Record that the process should be considered dead.
    pub fn mark_crashed(&mut self) {
        self.state = EngineState::Crashed;
    }

    /// Schedule a restart before the next trial (used after a timeout, when
    /// the process is possibly wedged but not provably dead).
    pub fn request_restart(&mut self) {
        self.restart_pending = true;
    }

    /// Graceful shutdown: `quit`, a bounded grace wait, then SIGTERM and
    /// finally SIGKILL. Never errors; an already-dead process is fine.
    pub fn stop(&mut self) {
        if self.process.is_some() {
            self.state = EngineState::Stopping;
            self.teardown();
            info!("engine stopped");
        }
        self.state = EngineState::Stopped;
    }

    fn teardown(&mut self) {
        let Some(mut proc) = self.process.take() else {
            return;
        };
        let _ = proc.session.send(&EngineCommand::Quit);
        if wait_with_grace(&mut proc.child, self.stop_grace) {
            return;
        }
        let _ = send_sigterm(proc.child.id());
        if wait_with_grace(&mut proc.child, SIGTERM_GRACE) {
            return;
        }
        let _ = proc.child.kill();
        let _ = proc.child.wait();
    }
}

impl Drop for EngineSupervisor {
    fn drop(&mut self) {
        // The engine must never outlive its handle, however the sweep ends.
        self.teardown();
    }
}

/// Poll `try_wait` until the process exits or `grace` elapses.
fn wait_with_grace(child: &mut Child, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(_)) | Err(_) => return true,
            Ok(None) => {}
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(WAIT_STEP);
    }
}

/// Deliver SIGTERM. Errors only when the signal could not be sent.
fn send_sigterm(pid: u32) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}
