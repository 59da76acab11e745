//! Engine Command Encoding
//!
//! Each variant renders to exactly one protocol line via `Display`.

use sweepbench_core::OptionValue;

/// A command sent to the engine process.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Start the initialization handshake (`uci`)
    Init,
    /// Liveness probe (`isready`)
    IsReady,
    /// Assign one configuration option
    SetOption {
        /// Option name as the engine advertises it
        name: String,
        /// Scalar value, rendered in its wire form
        value: OptionValue,
    },
    /// Load the position to analyze
    Position {
        /// FEN payload, or `startpos` for the initial position
        payload: String,
    },
    /// Start the workload with explicit resource bounds. At least one bound
    /// should be set; whichever triggers first ends the search.
    Go {
        /// Node-count ceiling
        nodes: Option<u64>,
        /// Wall-clock ceiling in milliseconds
        movetime_ms: Option<u64>,
    },
    /// Interrupt the current search
    Stop,
    /// Request graceful process shutdown
    Quit,
}

impl EngineCommand {
    /// Convenience constructor for `setoption`.
    pub fn set_option(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        EngineCommand::SetOption {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for `position`.
    pub fn position(payload: impl Into<String>) -> Self {
        EngineCommand::Position {
            payload: payload.into(),
        }
    }
}

impl std::fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineCommand::Init => write!(f, "uci"),
            EngineCommand::IsReady => write!(f, "isready"),
            EngineCommand::SetOption { name, value } => {
                write!(f, "setoption name {} value {}", name, value)
            }
            EngineCommand::Position { payload } => {
                if payload == "startpos" {
                    write!(f, "position startpos")
                } else {
                    write!(f, "position fen {}", payload)
                }
            }
            EngineCommand::Go { nodes, movetime_ms } => {
                write!(f, "go")?;
                if let Some(n) = nodes {
                    write!(f, " nodes {}", n)?;
                }
                if let Some(ms) = movetime_ms {
                    write!(f, " movetime {}", ms)?;
                }
                if nodes.is_none() && movetime_ms.is_none() {
                    write!(f, " infinite")?;
                }
                Ok(())
            }
            EngineCommand::Stop => write!(f, "stop"),
            EngineCommand::Quit => write!(f, "quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_handshake_and_probe() {
        assert_eq!(EngineCommand::Init.to_string(), "uci");
        assert_eq!(EngineCommand::IsReady.to_string(), "isready");
        assert_eq!(EngineCommand::Quit.to_string(), "quit");
    }

    #[test]
    fn renders_setoption_lines() {
        assert_eq!(
            EngineCommand::set_option("PathSamples", 50i64).to_string(),
            "setoption name PathSamples value 50"
        );
        assert_eq!(
            EngineCommand::set_option("Lambda", 0.1).to_string(),
            "setoption name Lambda value 0.1"
        );
        assert_eq!(
            EngineCommand::set_option("Mode", "competitive").to_string(),
            "setoption name Mode value competitive"
        );
    }

    #[test]
    fn renders_position_variants() {
        assert_eq!(
            EngineCommand::position("startpos").to_string(),
            "position startpos"
        );
        assert_eq!(
            EngineCommand::position("8/8/8/8/8/8/8/K6k w - - 0 1").to_string(),
            "position fen 8/8/8/8/8/8/8/K6k w - - 0 1"
        );
    }

    #[test]
    fn renders_go_with_bounds() {
        assert_eq!(
            EngineCommand::Go {
                nodes: Some(26_000),
                movetime_ms: Some(15_000),
            }
            .to_string(),
            "go nodes 26000 movetime 15000"
        );
        assert_eq!(
            EngineCommand::Go {
                nodes: None,
                movetime_ms: Some(3000),
            }
            .to_string(),
            "go movetime 3000"
        );
        assert_eq!(
            EngineCommand::Go {
                nodes: None,
                movetime_ms: None,
            }
            .to_string(),
            "go infinite"
        );
    }
}
