#![allow(dead_code)] // each test binary uses its own subset of fakes
//! Fake engines for lifecycle tests.
//!
//! Each fake is a small shell loop speaking just enough of the engine
//! protocol to drive the real spawn/handshake/search path: handshake on
//! `uci`, probe answers on `isready`, canned search output on `go`.

use std::path::Path;
use std::time::Duration;
use sweepbench_cli::{EngineSupervisor, SearchLimits, TrialExecutor};

/// Well-behaved engine: answers every command promptly.
pub const ECHO_ENGINE: &str = r#"
while read line; do
  case "$line" in
    uci) echo "id name fakeengine"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 8 nodes 1200 nps 24000 score cp 15 pv e2e4 e7e5"
         echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Engine that completes its output without a parseable best move.
pub const MALFORMED_ENGINE: &str = r#"
while read line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info nodes 500"; echo "bestmove" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Engine that never completes the handshake.
pub const MUTE_ENGINE: &str = r#"
while read line; do :; done
"#;

/// Engine that goes silent on `go` once `Stall` was set.
pub fn stall_engine() -> String {
    r#"
stall=0
while read line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    "setoption name Stall value true") stall=1 ;;
    go*) if [ "$stall" = 1 ]; then sleep 10; else echo "bestmove e2e4"; fi ;;
    quit) exit 0 ;;
  esac
done
"#
    .to_string()
}

/// Engine that dies on the first `go` after `flag` exists, consuming the
/// flag so only one trial crashes.
pub fn crash_once_engine(flag: &Path) -> String {
    format!(
        r#"
while read line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) if [ -f "{flag}" ]; then rm -f "{flag}"; exit 7; fi
         echo "info nodes 900 nps 9000"; echo "bestmove d2d4" ;;
    quit) exit 0 ;;
  esac
done
"#,
        flag = flag.display()
    )
}

/// Engine whose first process works (and drops `flag`) but exits on `Die`;
/// any later spawn sees the flag and dies before the handshake, so the
/// restart attempt fails too.
pub fn unavailable_after_crash_engine(flag: &Path) -> String {
    format!(
        r#"
if [ -f "{flag}" ]; then exit 1; fi
touch "{flag}"
while read line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    "setoption name Die value true") exit 3 ;;
    go*) echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#,
        flag = flag.display()
    )
}

/// Supervisor over `/bin/sh -c <script>` with test-sized timeouts.
pub fn supervisor_for(script: &str) -> EngineSupervisor {
    EngineSupervisor::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
        Duration::from_secs(5),
        Duration::from_secs(2),
        Duration::from_millis(100),
    )
}

/// Executor with a short marker timeout and sampling off.
pub fn executor(timeout: Duration) -> TrialExecutor {
    TrialExecutor {
        timeout,
        limits: SearchLimits {
            nodes: Some(1000),
            movetime_ms: Some(500),
        },
        sample_resources: false,
        sample_interval: Duration::from_millis(100),
    }
}

/// Whether a pid still exists (signal 0 probe).
pub fn process_exists(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}
