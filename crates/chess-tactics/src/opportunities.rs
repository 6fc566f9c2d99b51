//! One-ply lookahead: which legal moves create a tactical pattern for the
//! mover (opportunities) and which hand one to the opponent (risks).

use chess_core::notation::{move_to_uci, position_with_turn};
use chess_core::Side;
use shakmaty::{Chess, Move, Position, Role, Square};
use tracing::debug;

use crate::board::legal_destinations;
use crate::detectors::detect_except;
use crate::detectors::overloading::valuable_defended;
use crate::pattern::{PatternType, TacticalOpportunity, TacticalPattern, TacticalRisk};

/// Types reported by the move-level checks themselves rather than by the
/// static suite run on the resulting position.
const MOVE_LEVEL_TYPES: [PatternType; 4] = [
    PatternType::TrappedPiece,
    PatternType::DiscoveredAttack,
    PatternType::DiscoveredCheck,
    PatternType::Overloading,
];

/// Opportunities for `side` in the position given by `fen`.
///
/// When `side` is not the side to move the position is analysed as if it
/// were; if that position is illegal the result is empty.
pub fn find_tactical_opportunities(fen: &str, side: Side) -> Vec<TacticalOpportunity> {
    match position_with_turn(fen, side) {
        Ok(pos) => opportunities_in(&pos),
        Err(e) => {
            debug!(error = %e, "No opportunities: position unavailable");
            Vec::new()
        }
    }
}

/// Moves for `side` after which the opponent has opportunities.
pub fn find_risky_moves(fen: &str, side: Side) -> Vec<TacticalRisk> {
    match position_with_turn(fen, side) {
        Ok(pos) => risks_in(&pos),
        Err(e) => {
            debug!(error = %e, "No risks: position unavailable");
            Vec::new()
        }
    }
}

/// Legal moves of the side to move, minus any king capture.
fn candidate_moves(pos: &Chess) -> Vec<Move> {
    pos.legal_moves()
        .into_iter()
        .filter(|mv| mv.capture() != Some(Role::King))
        .collect()
}

/// Opportunities for the side to move in `pos`.
pub fn opportunities_in(pos: &Chess) -> Vec<TacticalOpportunity> {
    let mut opportunities = Vec::new();
    let moves = candidate_moves(pos);

    for mv in &moves {
        let uci = move_to_uci(mv);
        for pattern in patterns_after_move(pos, mv) {
            opportunities.push(TacticalOpportunity {
                mv: uci.clone(),
                pattern,
            });
        }
    }

    debug!(
        moves = moves.len(),
        opportunities = opportunities.len(),
        "Move-level opportunities computed"
    );
    opportunities
}

/// Risks for the side to move in `pos`: for each move, the opponent's
/// opportunities in the resulting position.
pub fn risks_in(pos: &Chess) -> Vec<TacticalRisk> {
    let mut risks = Vec::new();

    for mv in candidate_moves(pos) {
        let mut after = pos.clone();
        after.play_unchecked(mv.clone());

        let mut opponent_patterns: Vec<TacticalPattern> = Vec::new();
        for opportunity in opportunities_in(&after) {
            if !opponent_patterns.contains(&opportunity.pattern) {
                opponent_patterns.push(opportunity.pattern);
            }
        }

        if !opponent_patterns.is_empty() {
            risks.push(TacticalRisk {
                mv: move_to_uci(&mv),
                opponent_patterns,
            });
        }
    }

    debug!(risky_moves = risks.len(), "Move-level risks computed");
    risks
}

/// Every pattern the mover gets from playing `mv` in `pos`.
pub fn patterns_after_move(pos: &Chess, mv: &Move) -> Vec<TacticalPattern> {
    let mover = pos.turn();
    let side = Side::from(mover);
    let before = pos.board();

    let mut after = pos.clone();
    after.play_unchecked(mv.clone());

    let mut patterns: Vec<TacticalPattern> = Vec::new();
    let mut push = |pattern: TacticalPattern| {
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    };

    // Capturing a piece that could not move anyway
    if let Some(from) = mv.from() {
        if mv.capture().is_some() && !mv.is_en_passant() && legal_destinations(before, mv.to()).is_empty() {
            push(TacticalPattern::new(
                PatternType::TrappedPiece,
                side,
                vec![from],
                vec![mv.to()],
            ));
        }
    }

    if after.is_check() {
        let king = after.board().king_of(!mover);
        let moved = landing_squares(mv, mover);

        for checker in after.checkers() {
            // A check from a piece that did not move was uncovered
            if let (Some(from), Some(king)) = (mv.from(), king) {
                if !moved.contains(&checker) {
                    push(
                        TacticalPattern::new(PatternType::DiscoveredCheck, side, vec![checker], vec![king])
                            .with_keys(vec![from]),
                    );
                }
            }

            // The only answer by capture pulls a defender away from its duties
            for reply in after.legal_moves() {
                if reply.to() != checker || reply.capture().is_none() {
                    continue;
                }
                let Some(defender) = reply.from() else { continue };
                let duties = valuable_defended(after.board(), defender);
                if !duties.is_empty() {
                    push(
                        TacticalPattern::new(PatternType::Overloading, side, vec![checker], duties)
                            .with_keys(vec![defender]),
                    );
                }
            }
        }
    }

    for pattern in detect_except(after.board(), mover, &MOVE_LEVEL_TYPES) {
        push(pattern);
    }

    patterns
}

/// Squares occupied by the moving side's pieces that changed place.
fn landing_squares(mv: &Move, mover: shakmaty::Color) -> Vec<Square> {
    match mv.castling_side() {
        Some(castling) => vec![castling.king_to(mover), castling.rook_to(mover)],
        None => vec![mv.to()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::notation::{decode_move, parse_position};

    fn opportunities_for(fen: &str, uci: &str) -> Vec<TacticalPattern> {
        let pos = parse_position(fen).unwrap();
        let mv = decode_move(&pos, uci).unwrap();
        patterns_after_move(&pos, &mv)
    }

    #[test]
    fn test_discovered_check_by_knight_move() {
        // Knight e2 leaves the e-file, rook e1 gives check
        let patterns = opportunities_for("4k3/8/8/8/8/8/4N3/4R1K1 w - - 0 1", "e2c3");
        let discovered: Vec<_> = patterns
            .iter()
            .filter(|p| p.pattern_type == PatternType::DiscoveredCheck)
            .collect();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].attacker_squares, vec![Square::E1]);
        assert_eq!(discovered[0].target_squares, vec![Square::E8]);
        assert_eq!(discovered[0].key_squares, vec![Square::E2]);
    }

    #[test]
    fn test_direct_check_is_not_discovered() {
        let patterns = opportunities_for("4k3/8/8/8/8/8/8/R5K1 w - - 0 1", "a1a8");
        assert!(patterns.iter().all(|p| p.pattern_type != PatternType::DiscoveredCheck));
    }

    #[test]
    fn test_capturing_trapped_piece() {
        // The knight on a8 is walled in by its own pawns
        let patterns = opportunities_for("n3k3/2p5/1p6/8/8/8/8/Q3K3 w - - 0 1", "a1a8");
        assert!(patterns.iter().any(|p| p.pattern_type == PatternType::TrappedPiece
            && p.attacker_squares == vec![Square::A1]
            && p.target_squares == vec![Square::A8]));
    }

    #[test]
    fn test_en_passant_is_not_a_trapped_capture() {
        // exd6 lands on an empty square
        let patterns = opportunities_for("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5d6");
        assert!(patterns.iter().all(|p| p.pattern_type != PatternType::TrappedPiece));
    }

    #[test]
    fn test_castling_rook_check_is_not_discovered() {
        // O-O puts the rook on f1, giving check along the f-file
        let pos = parse_position("5k2/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mv = decode_move(&pos, "e1g1").unwrap();
        assert!(mv.is_castle());
        let mut after = pos.clone();
        after.play_unchecked(mv.clone());
        assert!(after.is_check());

        let patterns = patterns_after_move(&pos, &mv);
        assert!(patterns.iter().all(|p| p.pattern_type != PatternType::DiscoveredCheck));
    }

    #[test]
    fn test_overloaded_recapture() {
        // Ra8+ can only be taken by the bishop, which also guards the knight on c6
        let patterns = opportunities_for("6k1/1b3ppp/2n5/8/8/8/8/R5K1 w - - 0 1", "a1a8");
        let overloading: Vec<_> = patterns
            .iter()
            .filter(|p| p.pattern_type == PatternType::Overloading)
            .collect();
        assert_eq!(overloading.len(), 1);
        assert_eq!(overloading[0].attacker_squares, vec![Square::A8]);
        assert_eq!(overloading[0].target_squares, vec![Square::C6]);
        assert_eq!(overloading[0].key_squares, vec![Square::B7]);
        // The static suite still runs on the resulting position
        assert!(patterns.iter().any(|p| p.pattern_type == PatternType::BackRankWeakness));
    }

    #[test]
    fn test_requested_side_not_to_move() {
        let fen = "4k3/8/8/8/8/8/4N3/4R1K1 b - - 0 1";
        let white = find_tactical_opportunities(fen, Side::White);
        assert!(white
            .iter()
            .any(|o| o.mv == "e2c3" && o.pattern.pattern_type == PatternType::DiscoveredCheck));
        assert!(white.iter().all(|o| o.pattern.side == Side::White));
    }

    #[test]
    fn test_illegal_turn_override_is_empty() {
        // Black is in check, so White cannot be to move
        assert!(find_tactical_opportunities("4k3/8/8/8/8/8/8/4RK2 b - - 0 1", Side::White).is_empty());
    }

    #[test]
    fn test_queen_move_allows_knight_fork() {
        let risks = find_risky_moves("7k/8/8/4n3/8/8/8/3Q2K1 w - - 0 1", Side::White);
        let qd2 = risks.iter().find(|r| r.mv == "d1d2").expect("Qd2 should be risky");
        assert!(qd2.opponent_patterns.iter().any(|p| p.pattern_type == PatternType::Fork
            && p.attacker_squares == vec![Square::F3]
            && p.target_squares == vec![Square::G1, Square::D2]));
        for risk in &risks {
            assert!(risk.opponent_patterns.iter().all(|p| p.side == Side::Black));
        }
    }

    #[test]
    fn test_risks_for_side_not_to_move() {
        let risks = find_risky_moves("7k/8/8/4n3/8/8/8/3Q2K1 b - - 0 1", Side::White);
        assert!(risks.iter().any(|r| r.mv == "d1d2"));
        assert!(risks
            .iter()
            .all(|r| r.opponent_patterns.iter().all(|p| p.side == Side::Black)));
    }

    #[test]
    fn test_rook_endgame_has_no_risks() {
        assert!(find_risky_moves("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Side::White).is_empty());
    }
}
