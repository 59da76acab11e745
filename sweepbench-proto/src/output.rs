//! Search Output Parsing
//!
//! Extracts result fields from the lines accumulated up to the `bestmove`
//! marker. Field extraction is keyword-driven over `info` lines; numeric
//! fields the engine never reported stay at their defaults, matching how
//! engines freely omit fields. Only a missing or empty best move makes the
//! output unusable.

use sweepbench_core::SearchMetrics;
use thiserror::Error;

/// Errors from interpreting a completed search's output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// No lines were captured at all
    #[error("search produced no output lines")]
    EmptyOutput,

    /// The marker line carried no move token
    #[error("completion line '{line}' carries no best move")]
    MissingBestMove {
        /// The offending line
        line: String,
    },
}

/// Parse the output lines of one search into `SearchMetrics`.
///
/// `lines` is the sequence returned by a successful
/// [`await_marker`](crate::ProtocolSession::await_marker) on
/// [`SEARCH_MARKER`](crate::SEARCH_MARKER); the last matching line is
/// authoritative for the best move, the deepest `info` line for the counters.
pub fn parse_search_output(lines: &[String]) -> Result<SearchMetrics, OutputError> {
    if lines.is_empty() {
        return Err(OutputError::EmptyOutput);
    }

    let mut metrics = SearchMetrics::default();

    for line in lines {
        let mut tokens = line.split_whitespace().peekable();
        match tokens.peek().copied() {
            Some("bestmove") => {
                let _ = tokens.next();
                match tokens.next() {
                    Some(mv) if !mv.is_empty() => metrics.best_move = mv.to_string(),
                    _ => {
                        return Err(OutputError::MissingBestMove {
                            line: line.clone(),
                        })
                    }
                }
            }
            Some("info") => {
                let mut tokens = tokens.skip(1);
                while let Some(token) = tokens.next() {
                    match token {
                        "nodes" => {
                            if let Some(v) = tokens.next().and_then(|t| t.parse().ok()) {
                                metrics.nodes = v;
                            }
                        }
                        "nps" => {
                            if let Some(v) = tokens.next().and_then(|t| t.parse().ok()) {
                                metrics.nps = v;
                            }
                        }
                        "depth" => {
                            if let Some(v) = tokens.next().and_then(|t| t.parse().ok()) {
                                metrics.depth = Some(v);
                            }
                        }
                        "score" => match tokens.next() {
                            Some("cp") => {
                                if let Some(v) = tokens.next().and_then(|t| t.parse().ok()) {
                                    metrics.score_cp = Some(v);
                                }
                            }
                            // Forced mate carries no centipawn figure
                            Some("mate") => {
                                let _ = tokens.next();
                                metrics.score_cp = None;
                            }
                            _ => {}
                        },
                        "pv" => {
                            // Rest of the line is the principal variation
                            metrics.pv_len = tokens.by_ref().count();
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if metrics.best_move.is_empty() {
        return Err(OutputError::MissingBestMove {
            line: lines.last().cloned().unwrap_or_default(),
        });
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_typical_engine_output() {
        let output = lines(&[
            "info depth 8 seldepth 12 nodes 12000 nps 240000 score cp 35 pv e2e4 e7e5 g1f3",
            "info depth 12 seldepth 20 nodes 26000 nps 260000 score cp 28 pv e2e4 e7e5 g1f3 b8c6",
            "bestmove e2e4 ponder e7e5",
        ]);
        let metrics = parse_search_output(&output).unwrap();
        assert_eq!(metrics.best_move, "e2e4");
        assert_eq!(metrics.nodes, 26_000);
        assert_eq!(metrics.nps, 260_000);
        assert_eq!(metrics.depth, Some(12));
        assert_eq!(metrics.score_cp, Some(28));
        assert_eq!(metrics.pv_len, 4);
    }

    #[test]
    fn later_info_lines_win() {
        let output = lines(&[
            "info depth 2 nodes 100 score cp -10 pv d2d4",
            "info depth 6 nodes 5000 score cp 15 pv d2d4 d7d5",
            "bestmove d2d4",
        ]);
        let metrics = parse_search_output(&output).unwrap();
        assert_eq!(metrics.depth, Some(6));
        assert_eq!(metrics.nodes, 5000);
        assert_eq!(metrics.score_cp, Some(15));
        assert_eq!(metrics.pv_len, 2);
    }

    #[test]
    fn mate_scores_have_no_centipawns() {
        let output = lines(&[
            "info depth 20 nodes 9000 score mate 3 pv h5f7",
            "bestmove h5f7",
        ]);
        let metrics = parse_search_output(&output).unwrap();
        assert_eq!(metrics.score_cp, None);
        assert_eq!(metrics.best_move, "h5f7");
    }

    #[test]
    fn tolerates_missing_counters() {
        let output = lines(&["bestmove g1f3"]);
        let metrics = parse_search_output(&output).unwrap();
        assert_eq!(metrics.best_move, "g1f3");
        assert_eq!(metrics.nodes, 0);
        assert_eq!(metrics.depth, None);
        assert_eq!(metrics.pv_len, 0);
    }

    #[test]
    fn rejects_bare_completion_line() {
        let output = lines(&["info nodes 100", "bestmove"]);
        let err = parse_search_output(&output).unwrap_err();
        assert!(matches!(err, OutputError::MissingBestMove { .. }));
    }

    #[test]
    fn rejects_empty_output() {
        assert_eq!(parse_search_output(&[]), Err(OutputError::EmptyOutput));
    }

    #[test]
    fn ignores_unknown_tokens() {
        let output = lines(&[
            "info string NNUE evaluation enabled",
            "info depth 4 currmove e2e4 currmovenumber 1 nodes 800 nps abc",
            "bestmove e2e4",
        ]);
        let metrics = parse_search_output(&output).unwrap();
        assert_eq!(metrics.nodes, 800);
        // Unparseable nps token is dropped, not an error
        assert_eq!(metrics.nps, 0);
    }
}
