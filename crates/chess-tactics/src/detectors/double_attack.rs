/// Double attack: the side attacks two or more valuable enemy pieces at once.

use shakmaty::{Board, Color, Square};

use crate::board::{attack_map, piece_value, pieces_of, MIN_TARGET_VALUE};
use crate::pattern::{PatternType, TacticalPattern};

/// Emits at most one pattern. Attackers are the pieces hitting at least two
/// of the targets, which may be none when each target has its own attacker.
pub fn detect_double_attacks(board: &Board, side: Color) -> Vec<TacticalPattern> {
    let map = attack_map(board, side);

    let targets: Vec<Square> = map
        .keys()
        .copied()
        .filter(|&sq| {
            board
                .piece_at(sq)
                .is_some_and(|p| p.color != side && piece_value(p.role) >= MIN_TARGET_VALUE)
        })
        .collect();

    if targets.len() < 2 {
        return Vec::new();
    }

    let attackers: Vec<Square> = pieces_of(board, side)
        .into_iter()
        .map(|(sq, _)| sq)
        .filter(|sq| {
            targets
                .iter()
                .filter(|target| map.get(target).is_some_and(|from| from.contains(sq)))
                .count()
                >= 2
        })
        .collect();

    vec![TacticalPattern::new(PatternType::DoubleAttack, side.into(), attackers, targets)]
}
