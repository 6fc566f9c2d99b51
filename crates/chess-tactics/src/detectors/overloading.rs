/// Overloaded defenders: an attacked enemy piece that is the guard of two or
/// more valuable pieces.

use shakmaty::{Board, Color, Role, Square};

use crate::board::{attackers, defended_squares, piece_value, pieces_of, MIN_TARGET_VALUE};
use crate::pattern::{PatternType, TacticalPattern};

/// Valuable non-king pieces the piece on `square` protects.
pub fn valuable_defended(board: &Board, square: Square) -> Vec<Square> {
    defended_squares(board, square)
        .into_iter()
        .filter(|&sq| {
            board
                .piece_at(sq)
                .is_some_and(|p| p.role != Role::King && piece_value(p.role) >= MIN_TARGET_VALUE)
        })
        .collect()
}

pub fn detect_overloading(board: &Board, side: Color) -> Vec<TacticalPattern> {
    let mut patterns = Vec::new();

    for (sq, _) in pieces_of(board, !side) {
        let defended = valuable_defended(board, sq);
        if defended.len() < 2 {
            continue;
        }
        let attacked_by = attackers(board, side, sq);
        if attacked_by.is_empty() {
            continue;
        }
        patterns.push(
            TacticalPattern::new(PatternType::Overloading, side.into(), attacked_by, defended)
                .with_keys(vec![sq]),
        );
    }

    patterns
}
