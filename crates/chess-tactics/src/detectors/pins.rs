/// Pin and skewer detection along sliding-piece rays.

use shakmaty::{Board, Color, Role};

use crate::board::{piece_value, pieces_of, ray_occupants, ray_starts, MIN_TARGET_VALUE};
use crate::pattern::{PatternType, TacticalPattern};

/// For every slider of `side` and every direction, pair each opponent piece on
/// the ray with the next opponent piece behind it:
///
/// - PIN when the rear piece is the king or worth more than the front piece
/// - SKEWER when the front piece is worth more than the rear one (and at
///   least a minor piece)
///
/// Own pieces along the ray are skipped over. A king pin ends the scan of
/// that ray.
pub fn detect_pins_and_skewers(board: &Board, side: Color) -> Vec<TacticalPattern> {
    let mut patterns = Vec::new();

    for (sq, piece) in pieces_of(board, side) {
        for toward in ray_starts(piece.role, sq) {
            let ray = ray_occupants(board, sq, toward);

            for (i, &(first_sq, first)) in ray.iter().enumerate() {
                if first.color == side {
                    continue;
                }
                let second = ray[i + 1..].iter().find(|(_, p)| p.color != side);
                let (second_sq, second) = match second {
                    Some(&pair) => pair,
                    None => break,
                };

                let first_value = piece_value(first.role);
                let second_value = piece_value(second.role);

                if second.role == Role::King {
                    patterns.push(
                        TacticalPattern::new(PatternType::Pin, side.into(), vec![sq], vec![first_sq])
                            .with_keys(vec![second_sq]),
                    );
                    break;
                } else if second_value > first_value {
                    patterns.push(
                        TacticalPattern::new(PatternType::Pin, side.into(), vec![sq], vec![first_sq])
                            .with_keys(vec![second_sq]),
                    );
                } else if first_value > second_value && first_value >= MIN_TARGET_VALUE {
                    patterns.push(TacticalPattern::new(
                        PatternType::Skewer,
                        side.into(),
                        vec![sq],
                        vec![first_sq],
                    ));
                }
            }
        }
    }

    patterns
}
