/// Discovered attacks: a slider whose line to an enemy piece is blocked only
/// by one of its own pieces.

use shakmaty::{Board, Color, Role};

use crate::board::{pieces_of, ray_occupants, ray_starts};
use crate::pattern::{PatternType, TacticalPattern};

/// The blocker is recorded as the key square; moving it reveals the attack.
pub fn detect_discovered_attacks(board: &Board, side: Color) -> Vec<TacticalPattern> {
    let mut patterns = Vec::new();

    for (sq, piece) in pieces_of(board, side) {
        for toward in ray_starts(piece.role, sq) {
            let ray = ray_occupants(board, sq, toward);
            let (blocker_sq, blocker) = match ray.first() {
                Some(&first) => first,
                None => continue,
            };
            let (target_sq, target) = match ray.get(1) {
                Some(&second) => second,
                None => continue,
            };
            if blocker.color != side || target.color == side {
                continue;
            }

            let pattern_type = if target.role == Role::King {
                PatternType::DiscoveredCheck
            } else {
                PatternType::DiscoveredAttack
            };
            patterns.push(
                TacticalPattern::new(pattern_type, side.into(), vec![sq], vec![target_sq])
                    .with_keys(vec![blocker_sq]),
            );
        }
    }

    patterns
}
