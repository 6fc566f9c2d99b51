/// Trapped pieces: enemy pieces (other than the king) with no legal move.

use shakmaty::{Board, Color, Role};

use crate::board::{attackers, legal_destinations, pieces_of};
use crate::pattern::{PatternType, TacticalPattern};

pub fn detect_trapped_pieces(board: &Board, side: Color) -> Vec<TacticalPattern> {
    pieces_of(board, !side)
        .into_iter()
        .filter(|&(sq, piece)| piece.role != Role::King && legal_destinations(board, sq).is_empty())
        .map(|(sq, _)| {
            TacticalPattern::new(
                PatternType::TrappedPiece,
                side.into(),
                attackers(board, side, sq),
                vec![sq],
            )
        })
        .collect()
}
