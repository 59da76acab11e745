#![warn(missing_docs)]
//! Sweepbench Engine Protocol
//!
//! Text-protocol exchange with one engine process over its standard streams.
//! Commands go out as single lines, responses come back as lines accumulated
//! until a marker appears. Handles command encoding, deterministic option
//! replay, timed marker waits, and search-output field extraction.
//!
//! Retries are deliberately absent at this layer; whether a timeout is
//! transient or fatal is the supervisor's and executor's call.

mod command;
mod output;
mod session;

pub use command::EngineCommand;
pub use output::{parse_search_output, OutputError};
pub use session::{ProtocolError, ProtocolSession};

/// Marker line terminating the initialization handshake
pub const INIT_MARKER: &str = "uciok";

/// Marker line answering a liveness probe
pub const READY_MARKER: &str = "readyok";

/// Marker line terminating a search, carrying the best move
pub const SEARCH_MARKER: &str = "bestmove";
