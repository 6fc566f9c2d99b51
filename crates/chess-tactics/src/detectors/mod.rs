/// Static tactical pattern detectors.
///
/// Each detector is a pure function of a board and the side whose
/// opportunities are being looked for. Output order is deterministic: pieces
/// are visited in square order and rays in a fixed direction order.

pub mod back_rank;
pub mod discovered;
pub mod double_attack;
pub mod forks;
pub mod overloading;
pub mod pins;
pub mod trapped;

use shakmaty::{Board, Color};

use crate::pattern::{PatternType, TacticalPattern};

pub type DetectorFn = fn(&Board, Color) -> Vec<TacticalPattern>;

/// Every static detector, with the pattern types it can emit.
pub const DETECTORS: &[(&str, &[PatternType], DetectorFn)] = &[
    ("pin_skewer", &[PatternType::Pin, PatternType::Skewer], pins::detect_pins_and_skewers),
    ("fork", &[PatternType::Fork], forks::detect_forks),
    (
        "discovered",
        &[PatternType::DiscoveredAttack, PatternType::DiscoveredCheck],
        discovered::detect_discovered_attacks,
    ),
    ("double_attack", &[PatternType::DoubleAttack], double_attack::detect_double_attacks),
    ("overloading", &[PatternType::Overloading], overloading::detect_overloading),
    ("back_rank", &[PatternType::BackRankWeakness], back_rank::detect_back_rank_weakness),
    ("trapped_piece", &[PatternType::TrappedPiece], trapped::detect_trapped_pieces),
];

/// Run the full suite for `side`.
pub fn detect_all(board: &Board, side: Color) -> Vec<TacticalPattern> {
    detect_except(board, side, &[])
}

/// Run the suite, skipping detectors whose every pattern type is excluded
/// and dropping excluded types from the rest.
pub fn detect_except(board: &Board, side: Color, excluded: &[PatternType]) -> Vec<TacticalPattern> {
    let mut patterns = Vec::new();
    for (name, types, detect) in DETECTORS {
        if types.iter().all(|t| excluded.contains(t)) {
            continue;
        }
        let found: Vec<TacticalPattern> = detect(board, side)
            .into_iter()
            .filter(|p| !excluded.contains(&p.pattern_type))
            .collect();
        tracing::trace!(detector = *name, count = found.len(), "Detector finished");
        patterns.extend(found);
    }
    patterns
}
