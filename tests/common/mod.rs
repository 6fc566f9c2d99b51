#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chess_core::notation::parse_board;
use chess_tactics::detectors::detect_all;
use chess_tactics::{PatternType, TacticalPattern};
use shakmaty::{Board, Color};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const OPEN_E_PAWN_FEN: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";

/// Assorted middlegame and endgame positions for property checks.
pub const SAMPLE_FENS: &[&str] = &[
    START_FEN,
    OPEN_E_PAWN_FEN,
    "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 1 5",
    "r3k2r/ppp2ppp/2n1b3/3qp3/1b1P4/2N1BN2/PPP1QPPP/R3K2R w KQkq - 0 10",
    "2r1k3/1b3q2/3N4/8/8/8/8/4K3 w - - 0 1",
    "3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1",
    "4k3/8/2n5/1B6/8/8/8/4K3 w - - 0 1",
    "6k1/1b3ppp/2n5/8/8/8/8/R5K1 w - - 0 1",
];

pub fn board(fen: &str) -> Board {
    parse_board(fen).unwrap_or_else(|e| panic!("bad FEN {fen}: {e}"))
}

pub fn patterns_of(fen: &str, side: Color, pattern_type: PatternType) -> Vec<TacticalPattern> {
    detect_all(&board(fen), side)
        .into_iter()
        .filter(|p| p.pattern_type == pattern_type)
        .collect()
}

/// Generate a unique suffix based on timestamp to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}", ts % 1_000_000_000)
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chess-tactics-{label}-{}", unique_suffix()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
