/// Back-rank weakness: the enemy king is boxed in on its home rank and a
/// rook or queen already has a clear line to it.

use shakmaty::{attacks, Board, Color, Role, Square};

use crate::board::{back_rank, king_square, pieces_of};
use crate::pattern::{PatternType, TacticalPattern};

/// The squares in front of a king on its home rank (file -1, 0, +1).
pub fn escape_squares(king: Square, color: Color) -> Vec<Square> {
    let dr = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    attacks::king_attacks(king)
        .into_iter()
        .filter(|sq| sq.rank() as i32 - king.rank() as i32 == dr)
        .collect()
}

pub fn detect_back_rank_weakness(board: &Board, side: Color) -> Vec<TacticalPattern> {
    let defender = !side;
    let king = match king_square(board, defender) {
        Some(sq) => sq,
        None => return Vec::new(),
    };
    if king.rank() != back_rank(defender) {
        return Vec::new();
    }

    let escapes = escape_squares(king, defender);
    if !escapes.iter().all(|&sq| board.piece_at(sq).is_some()) {
        return Vec::new();
    }

    let attacker = pieces_of(board, side).into_iter().find(|&(sq, piece)| {
        matches!(piece.role, Role::Rook | Role::Queen)
            && (sq.file() == king.file() || sq.rank() == king.rank())
            && (attacks::between(sq, king) & board.occupied()).is_empty()
    });

    match attacker {
        Some((sq, _)) => vec![TacticalPattern::new(
            PatternType::BackRankWeakness,
            side.into(),
            vec![sq],
            vec![king],
        )
        .with_keys(escapes)],
        None => Vec::new(),
    }
}
