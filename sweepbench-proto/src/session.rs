//! Protocol Session
//!
//! Reliable line exchange with one engine process. Writes are flushed
//! immediately; reads accumulate lines until a caller-supplied marker
//! appears or the deadline passes.
//!
//! Timed reads need readiness information that `BufReader` alone cannot give,
//! so a session over a process pipe carries the raw fd and polls it before
//! each blocking read. Sessions over in-memory readers (tests) skip polling;
//! their reads resolve immediately or end the stream.

use crate::EngineCommand;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::os::unix::io::RawFd;
use std::time::{Duration, Instant};
use sweepbench_core::EngineOptions;
use thiserror::Error;
use tracing::trace;

/// Upper bound for one poll slice, so liveness is rechecked regularly even
/// under long trial timeouts.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Errors from protocol exchange with the engine.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying stream error
    #[error("I/O error talking to engine: {0}")]
    Io(#[from] std::io::Error),

    /// The marker did not appear within the allotted time
    #[error("timed out after {waited:?} waiting for '{marker}'")]
    Timeout {
        /// Marker that was being awaited
        marker: String,
        /// How long the session waited
        waited: Duration,
    },

    /// The stream ended before the marker appeared
    #[error("engine closed its output stream while waiting for '{marker}'")]
    Closed {
        /// Marker that was being awaited
        marker: String,
    },
}

/// Result of polling the read fd for data.
enum PollStatus {
    Readable,
    TimedOut,
    Closed,
}

/// Wait for data on a file descriptor, up to `timeout`.
fn wait_for_readable(fd: RawFd, timeout: Duration) -> Result<PollStatus, std::io::Error> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let result = unsafe { libc::poll(&mut pollfd, 1, timeout.as_millis() as libc::c_int) };

    if result < 0 {
        Err(std::io::Error::last_os_error())
    } else if result == 0 {
        Ok(PollStatus::TimedOut)
    } else if pollfd.revents & libc::POLLIN != 0 {
        // Data first: a closing pipe can still hold unread lines
        Ok(PollStatus::Readable)
    } else if pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
        Ok(PollStatus::Closed)
    } else {
        Ok(PollStatus::TimedOut)
    }
}

/// A request/response session over one engine's standard streams.
pub struct ProtocolSession<R: Read, W: Write> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
    poll_fd: Option<RawFd>,
}

impl<R: Read, W: Write> ProtocolSession<R, W> {
    /// Create a session over in-memory or otherwise always-ready streams.
    /// `await_marker` deadlines are only checked between reads in this mode.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            poll_fd: None,
        }
    }

    /// Create a session over a process pipe, polling `fd` before each read so
    /// that marker waits respect their deadline even when the engine goes
    /// silent.
    pub fn with_poll_fd(reader: R, writer: W, fd: RawFd) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            poll_fd: Some(fd),
        }
    }

    /// Write a single raw command line and flush immediately.
    pub fn send_line(&mut self, line: &str) -> Result<(), ProtocolError> {
        trace!(command = line, "-> engine");
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Encode and send one command.
    pub fn send(&mut self, command: &EngineCommand) -> Result<(), ProtocolError> {
        self.send_line(&command.to_string())
    }

    /// Emit one `setoption` line per entry, in the mapping's insertion order,
    /// so repeated runs replay the identical configuration sequence.
    pub fn send_options(&mut self, options: &EngineOptions) -> Result<(), ProtocolError> {
        for (name, value) in options.iter() {
            self.send(&EngineCommand::set_option(name, value.clone()))?;
        }
        Ok(())
    }

    /// Read lines until one contains `marker` or `timeout` elapses. Returns
    /// the accumulated lines, marker line included.
    pub fn await_marker(
        &mut self,
        marker: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, ProtocolError> {
        let start = Instant::now();
        let deadline = start + timeout;
        let mut lines = Vec::new();

        loop {
            // Only poll when the buffer is drained; buffered lines are
            // served regardless of what the fd reports.
            if self.reader.buffer().is_empty() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(ProtocolError::Timeout {
                        marker: marker.to_string(),
                        waited: start.elapsed(),
                    });
                }
                if let Some(fd) = self.poll_fd {
                    match wait_for_readable(fd, remaining.min(POLL_SLICE))? {
                        PollStatus::Readable => {}
                        PollStatus::TimedOut => continue,
                        // Fall through to the read: EOF is reported there,
                        // and a half-closed pipe may still yield data.
                        PollStatus::Closed => {}
                    }
                }
            }

            let mut line = String::new();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Err(ProtocolError::Closed {
                    marker: marker.to_string(),
                });
            }
            let line = line.trim_end().to_string();
            trace!(line = %line, "<- engine");
            let hit = line.contains(marker);
            lines.push(line);
            if hit {
                return Ok(lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Cursor;
    use std::os::unix::io::{AsRawFd, FromRawFd};

    fn session_over(input: &str) -> ProtocolSession<Cursor<Vec<u8>>, Vec<u8>> {
        ProtocolSession::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn await_marker_accumulates_lines_including_marker() {
        let mut session = session_over("id name testengine\ninfo string ok\nuciok\nextra\n");
        let lines = session
            .await_marker("uciok", Duration::from_secs(1))
            .unwrap();
        assert_eq!(lines, ["id name testengine", "info string ok", "uciok"]);
    }

    #[test]
    fn await_marker_reports_closed_stream() {
        let mut session = session_over("info depth 1\n");
        let err = session
            .await_marker("bestmove", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Closed { .. }));
    }

    #[test]
    fn send_options_replays_insertion_order() {
        let mut session = session_over("");
        let options = EngineOptions::new()
            .with("PathSamples", 50i64)
            .with("Lambda", 0.1)
            .with("Mode", "competitive");
        session.send_options(&options).unwrap();

        let written = String::from_utf8(session.writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            written,
            "setoption name PathSamples value 50\n\
             setoption name Lambda value 0.1\n\
             setoption name Mode value competitive\n"
        );
    }

    #[test]
    fn await_marker_times_out_on_silent_pipe() {
        // A real pipe with nothing written: poll must bound the wait.
        let mut fds = [0 as RawFd; 2];
        let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(ret, 0);
        let read_end = unsafe { File::from_raw_fd(fds[0]) };
        let _write_end = unsafe { File::from_raw_fd(fds[1]) };

        let fd = read_end.as_raw_fd();
        let mut session = ProtocolSession::with_poll_fd(read_end, Vec::new(), fd);

        let start = Instant::now();
        let err = session
            .await_marker("bestmove", Duration::from_millis(150))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Timeout { .. }));
        assert!(start.elapsed() >= Duration::from_millis(150));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn await_marker_reads_lines_written_through_pipe() {
        let mut fds = [0 as RawFd; 2];
        let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(ret, 0);
        let read_end = unsafe { File::from_raw_fd(fds[0]) };
        let mut write_end = unsafe { File::from_raw_fd(fds[1]) };

        write_end
            .write_all(b"info nodes 100\nbestmove e2e4\n")
            .unwrap();

        let fd = read_end.as_raw_fd();
        let mut session = ProtocolSession::with_poll_fd(read_end, Vec::new(), fd);
        let lines = session
            .await_marker("bestmove", Duration::from_secs(1))
            .unwrap();
        assert_eq!(lines, ["info nodes 100", "bestmove e2e4"]);
    }
}
