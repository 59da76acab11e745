//! Test Case Definitions
//!
//! A `TestCase` is an immutable description of one analysis workload: a
//! position payload handed to the engine plus identifying metadata. The set
//! of cases is fixed before a sweep starts and never mutated during one.

use serde::{Deserialize, Serialize};

/// Rough difficulty grade of a position, used as a grouping axis in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Few reasonable continuations, shallow tactics
    Low,
    /// Mixed positional/tactical content
    Medium,
    /// Sharp positions with deep tactical lines
    High,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

/// One analysis workload: a position the engine is asked to search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique identifier, used as an aggregation key
    pub id: String,
    /// Position payload in FEN, or `startpos` for the initial position
    pub position: String,
    /// Human-readable description for reports
    pub label: String,
    /// Difficulty grade
    pub complexity: Complexity,
}

impl TestCase {
    /// Create a test case.
    pub fn new(
        id: impl Into<String>,
        position: impl Into<String>,
        label: impl Into<String>,
        complexity: Complexity,
    ) -> Self {
        Self {
            id: id.into(),
            position: position.into(),
            label: label.into(),
            complexity,
        }
    }

    /// Whether this case uses the engine's built-in start position.
    pub fn is_startpos(&self) -> bool {
        self.position == "startpos"
    }

    /// The default graded position suite, used when a sweep definition
    /// supplies no cases of its own.
    pub fn builtin_suite() -> Vec<TestCase> {
        vec![
            TestCase::new(
                "simple_opening",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
                "Quiet opening after 1.e4",
                Complexity::Low,
            ),
            TestCase::new(
                "complex_opening",
                "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 0 4",
                "Italian structure with open diagonals",
                Complexity::Medium,
            ),
            TestCase::new(
                "tactical_middlegame",
                "r2qkb1r/ppp2ppp/2n1bn2/3pp3/3PP3/2N2N2/PPP2PPP/R1BQKB1R w KQkq - 0 6",
                "Central tension, tactics available",
                Complexity::High,
            ),
            TestCase::new(
                "complex_middlegame",
                "r1bq1rk1/ppp1nppp/3p1n2/4p3/2B1P3/2NP1N2/PPP2PPP/R1BQK2R w KQ - 0 7",
                "Closed center, maneuvering game",
                Complexity::High,
            ),
            TestCase::new(
                "simple_endgame",
                "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
                "Rook endgame with passed pawns",
                Complexity::Low,
            ),
            TestCase::new(
                "complex_endgame",
                "2r3k1/1p3ppp/p2p4/4n3/P1P1P3/2N2P2/1P4PP/3R2K1 w - - 0 1",
                "Minor piece vs rook activity",
                Complexity::Medium,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_suite_has_unique_ids() {
        let suite = TestCase::builtin_suite();
        let mut ids: Vec<&str> = suite.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), suite.len());
    }

    #[test]
    fn builtin_suite_covers_all_grades() {
        let suite = TestCase::builtin_suite();
        for grade in [Complexity::Low, Complexity::Medium, Complexity::High] {
            assert!(suite.iter().any(|c| c.complexity == grade));
        }
    }

    #[test]
    fn startpos_detection() {
        let case = TestCase::new("start", "startpos", "Initial position", Complexity::Low);
        assert!(case.is_startpos());
        assert!(!TestCase::builtin_suite()[0].is_startpos());
    }

    #[test]
    fn complexity_serializes_lowercase() {
        let json = serde_json::to_string(&Complexity::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
