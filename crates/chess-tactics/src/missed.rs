//! Missed-tactic classification: given the move a player made and the move
//! an engine preferred, decide what the player overlooked.
//!
//! The result distinguishes three outcomes:
//! - `[]`: the move was not reviewed (loss under threshold, the player found
//!   the recommended move, or the recommendation does not decode)
//! - one or more tactic entries
//! - a single `none` entry: reviewed, nothing notable found

use chess_core::notation::{decode_move, move_to_uci, position_with_turn};
use chess_core::Side;
use serde::{Deserialize, Serialize};
use shakmaty::{Board, Chess, Move, Position};
use tracing::debug;

use crate::board::{
    material_diff, piece_value, role_name, KNIGHT_VALUE, PAWN_VALUE, QUEEN_VALUE, ROOK_VALUE,
};
use crate::config::DEFAULT_LOSS_THRESHOLD;
use crate::detectors::detect_all;
use crate::pattern::{PatternType, TacticalPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticType {
    WinPawn,
    WinPiece,
    WinRook,
    WinQueen,
    Pin,
    Skewer,
    Fork,
    DiscoveredAttack,
    DiscoveredCheck,
    DoubleAttack,
    Overloading,
    BackRankWeakness,
    TrappedPiece,
    #[serde(rename = "none")]
    NoTactic,
}

impl TacticType {
    /// Capture category for a net material gain, if it is worth a pawn or more.
    pub fn from_gain(net: i32) -> Option<TacticType> {
        match net {
            n if n >= QUEEN_VALUE => Some(TacticType::WinQueen),
            n if n >= ROOK_VALUE => Some(TacticType::WinRook),
            n if n >= KNIGHT_VALUE => Some(TacticType::WinPiece),
            n if n >= PAWN_VALUE => Some(TacticType::WinPawn),
            _ => None,
        }
    }
}

impl From<PatternType> for TacticType {
    fn from(pattern: PatternType) -> Self {
        match pattern {
            PatternType::Pin => TacticType::Pin,
            PatternType::Skewer => TacticType::Skewer,
            PatternType::Fork => TacticType::Fork,
            PatternType::DiscoveredAttack => TacticType::DiscoveredAttack,
            PatternType::DiscoveredCheck => TacticType::DiscoveredCheck,
            PatternType::DoubleAttack => TacticType::DoubleAttack,
            PatternType::Overloading => TacticType::Overloading,
            PatternType::BackRankWeakness => TacticType::BackRankWeakness,
            PatternType::TrappedPiece => TacticType::TrappedPiece,
        }
    }
}

/// Roles of the pieces involved in a missed tactic. Captures fill
/// `capturer`/`captured`, geometric patterns fill `attacker`/`target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRoles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl PieceRoles {
    fn is_empty(&self) -> bool {
        *self == PieceRoles::default()
    }
}

/// One missed-tactic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTactic {
    pub tactic_type: TacticType,
    /// The recommended move, coordinate form
    #[serde(rename = "move")]
    pub mv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_squares: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_roles: Option<PieceRoles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_delta: Option<i32>,
}

impl DetectedTactic {
    fn nothing_found(mv: String) -> Self {
        Self {
            tactic_type: TacticType::NoTactic,
            mv,
            affected_squares: None,
            piece_roles: None,
            material_delta: None,
        }
    }
}

/// Classify what the mover missed by playing `played` instead of
/// `recommended`. `loss` is the evaluation drop in centipawns from the
/// mover's point of view; `threshold` defaults to 50.
pub fn detect_missed_tactics(
    fen: &str,
    mover: Side,
    played: &str,
    recommended: &str,
    loss: i32,
    threshold: Option<i32>,
) -> Vec<DetectedTactic> {
    let threshold = threshold.unwrap_or(DEFAULT_LOSS_THRESHOLD);
    if loss < threshold {
        debug!(loss, threshold, "Loss below threshold, not reviewed");
        return Vec::new();
    }
    if played.trim() == recommended.trim() {
        return Vec::new();
    }

    let pos = match position_with_turn(fen, mover) {
        Ok(pos) => pos,
        Err(e) => {
            debug!(error = %e, "Position unavailable, not reviewed");
            return Vec::new();
        }
    };
    let best = match decode_move(&pos, recommended) {
        Some(mv) => mv,
        None => {
            debug!(recommended, "Recommended move does not decode, not reviewed");
            return Vec::new();
        }
    };
    if decode_move(&pos, played).as_ref() == Some(&best) {
        return Vec::new();
    }

    let uci = move_to_uci(&best);
    let mut after = pos.clone();
    after.play_unchecked(best.clone());

    let mut tactics = Vec::new();
    if let Some(capture) = safe_capture(&pos, &after, &best, &uci) {
        tactics.push(capture);
    }
    for pattern in created_patterns(pos.board(), after.board(), mover.into()) {
        tactics.push(pattern_tactic(after.board(), &pattern, &uci));
    }

    if tactics.is_empty() {
        tactics.push(DetectedTactic::nothing_found(uci));
    }
    debug!(
        played,
        recommended,
        found = tactics.len(),
        "Missed-tactic review finished"
    );
    tactics
}

/// Can the side to move in `after` legally capture on `square`?
fn can_recapture(after: &Chess, square: shakmaty::Square) -> bool {
    after
        .legal_moves()
        .iter()
        .any(|m| m.is_capture() && m.to() == square)
}

/// A capture the opponent cannot answer by winning back as much or more.
fn safe_capture(before: &Chess, after: &Chess, mv: &Move, uci: &str) -> Option<DetectedTactic> {
    let captured = mv.capture()?;
    let from = mv.from()?;
    let mover = before.turn();
    let capturer = mv.promotion().unwrap_or(mv.role());

    let gain = material_diff(after.board(), mover) - material_diff(before.board(), mover);
    let net = if !can_recapture(after, mv.to()) {
        gain
    } else if piece_value(captured) > piece_value(capturer) {
        gain - piece_value(capturer)
    } else {
        return None;
    };

    let tactic_type = TacticType::from_gain(net)?;
    let piece_roles = PieceRoles {
        capturer: Some(role_name(capturer).to_string()),
        captured: Some(role_name(captured).to_string()),
        ..PieceRoles::default()
    };

    Some(DetectedTactic {
        tactic_type,
        mv: uci.to_string(),
        affected_squares: Some(vec![from.to_string(), mv.to().to_string()]),
        piece_roles: Some(piece_roles),
        material_delta: Some(net),
    })
}

/// Patterns the mover has after the move that were not already on the board.
fn created_patterns(before: &Board, after: &Board, mover: shakmaty::Color) -> Vec<TacticalPattern> {
    let existing = detect_all(before, mover);
    let mut created: Vec<TacticalPattern> = Vec::new();
    for pattern in detect_all(after, mover) {
        if !existing.contains(&pattern) && !created.contains(&pattern) {
            created.push(pattern);
        }
    }
    created
}

fn pattern_tactic(board: &Board, pattern: &TacticalPattern, uci: &str) -> DetectedTactic {
    let role_at = |sq: Option<&shakmaty::Square>| {
        sq.and_then(|sq| board.piece_at(*sq))
            .map(|p| role_name(p.role).to_string())
    };
    let piece_roles = PieceRoles {
        attacker: role_at(pattern.attacker_squares.first()),
        target: role_at(pattern.target_squares.first()),
        ..PieceRoles::default()
    };

    DetectedTactic {
        tactic_type: pattern.pattern_type.into(),
        mv: uci.to_string(),
        affected_squares: Some(
            pattern
                .affected_squares()
                .iter()
                .map(|sq| sq.to_string())
                .collect(),
        ),
        piece_roles: (!piece_roles.is_empty()).then_some(piece_roles),
        material_delta: None,
    }
}
