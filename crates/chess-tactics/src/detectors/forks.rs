/// Fork detection: one piece attacking two or more valuable enemy pieces.

use shakmaty::{Board, Color, Square};

use crate::board::{attacks_from, piece_value, pieces_of, MIN_TARGET_VALUE};
use crate::pattern::{PatternType, TacticalPattern};

/// Reported targets per fork.
const MAX_FORK_TARGETS: usize = 2;

pub fn detect_forks(board: &Board, side: Color) -> Vec<TacticalPattern> {
    let mut patterns = Vec::new();

    for (sq, _) in pieces_of(board, side) {
        let mut targets: Vec<(Square, i32)> = attacks_from(board, sq)
            .into_iter()
            .filter_map(|target| {
                let piece = board.piece_at(target)?;
                let value = piece_value(piece.role);
                (piece.color != side && value >= MIN_TARGET_VALUE).then_some((target, value))
            })
            .collect();

        if targets.len() < 2 {
            continue;
        }

        // Highest value first, lower square index on ties
        targets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let reported = targets
            .iter()
            .take(MAX_FORK_TARGETS)
            .map(|&(target, _)| target)
            .collect();

        patterns.push(TacticalPattern::new(PatternType::Fork, side.into(), vec![sq], reported));
    }

    patterns
}
