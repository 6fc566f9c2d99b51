//! Tactical pattern analysis for chess positions.
//!
//! - static detectors over a single position ([`detectors`])
//! - one-ply opportunity and risk search over legal moves ([`opportunities`])
//! - classification of what a player missed against an engine
//!   recommendation ([`missed`])
//!
//! Every query rebuilds its board from the FEN it is given and shares no
//! state with other queries.

pub mod board;
pub mod config;
pub mod detectors;
pub mod error;
pub mod eval_cache;
pub mod fixtures;
pub mod missed;
pub mod opportunities;
pub mod pattern;

pub use chess_core::Side;

pub use config::AnalysisConfig;
pub use error::TacticsError;
pub use eval_cache::{EngineEval, EvalCache};
pub use missed::{detect_missed_tactics, DetectedTactic, PieceRoles, TacticType};
pub use opportunities::{find_risky_moves, find_tactical_opportunities};
pub use pattern::{PatternType, TacticalOpportunity, TacticalPattern, TacticalRisk};

use chess_core::notation::parse_board;

/// All static patterns for `side` in the position given by `fen`.
pub fn detect_patterns(fen: &str, side: Side) -> Result<Vec<TacticalPattern>, TacticsError> {
    let board = parse_board(fen)?;
    Ok(detectors::detect_all(&board, side.into()))
}

/// Patterns of one type only.
pub fn detect_pattern(
    fen: &str,
    side: Side,
    pattern_type: PatternType,
) -> Result<Vec<TacticalPattern>, TacticsError> {
    Ok(detect_patterns(fen, side)?
        .into_iter()
        .filter(|p| p.pattern_type == pattern_type)
        .collect())
}
