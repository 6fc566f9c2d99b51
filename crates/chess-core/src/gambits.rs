//! Gambit line matcher: prefix-matches a played SAN sequence against a
//! catalog of named gambit lines.

use serde::{Deserialize, Serialize};
use shakmaty::{san::San, Chess, Position};
use std::sync::LazyLock;

use crate::error::CoreError;
use crate::notation::normalize_san;
use crate::side::Side;

/// A named gambit line, given as SAN moves from the starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GambitLine {
    pub id: String,
    pub name: String,
    /// The side offering the gambit.
    pub side: Side,
    pub move_prefix: Vec<String>,
}

impl GambitLine {
    fn new(id: &str, name: &str, side: Side, moves: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            side,
            move_prefix: moves.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GambitMatch {
    pub gambit_id: String,
    pub name: String,
    pub side: Side,
    pub matched_moves: usize,
    pub is_exact_line: bool,
}

/// Built-in catalog of well-known gambits.
pub static GAMBIT_CATALOG: LazyLock<Vec<GambitLine>> = LazyLock::new(|| {
    use Side::{Black, White};
    vec![
        GambitLine::new("kings_gambit", "King's Gambit", White, &["e4", "e5", "f4"]),
        GambitLine::new("queens_gambit", "Queen's Gambit", White, &["d4", "d5", "c4"]),
        GambitLine::new("danish_gambit", "Danish Gambit", White, &["e4", "e5", "d4", "exd4", "c3"]),
        GambitLine::new(
            "evans_gambit",
            "Evans Gambit",
            White,
            &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "b4"],
        ),
        GambitLine::new("smith_morra_gambit", "Smith-Morra Gambit", White, &["e4", "c5", "d4", "cxd4", "c3"]),
        GambitLine::new(
            "scotch_gambit",
            "Scotch Gambit",
            White,
            &["e4", "e5", "Nf3", "Nc6", "d4", "exd4", "Bc4"],
        ),
        GambitLine::new("vienna_gambit", "Vienna Gambit", White, &["e4", "e5", "Nc3", "Nf6", "f4"]),
        GambitLine::new("budapest_gambit", "Budapest Gambit", Black, &["d4", "Nf6", "c4", "e5"]),
        GambitLine::new("englund_gambit", "Englund Gambit", Black, &["d4", "e5"]),
        GambitLine::new("albin_countergambit", "Albin Countergambit", Black, &["d4", "d5", "c4", "e5"]),
        GambitLine::new("benko_gambit", "Benko Gambit", Black, &["d4", "Nf6", "c4", "c5", "d5", "b5"]),
        GambitLine::new("latvian_gambit", "Latvian Gambit", Black, &["e4", "e5", "Nf3", "f5"]),
        GambitLine::new(
            "stafford_gambit",
            "Stafford Gambit",
            Black,
            &["e4", "e5", "Nf3", "Nf6", "Nxe5", "Nc6"],
        ),
    ]
});

/// Length of the common SAN prefix, ignoring check marks and annotations.
fn common_prefix_len(played: &[String], prefix: &[String]) -> usize {
    played
        .iter()
        .zip(prefix.iter())
        .take_while(|(a, b)| normalize_san(a) == normalize_san(b))
        .count()
}

/// Match a played sequence against `catalog`, longest match first.
pub fn match_gambits(played: &[String], catalog: &[GambitLine]) -> Vec<GambitMatch> {
    let mut matches: Vec<GambitMatch> = catalog
        .iter()
        .filter_map(|line| {
            let matched = common_prefix_len(played, &line.move_prefix);
            if matched == 0 {
                return None;
            }
            Some(GambitMatch {
                gambit_id: line.id.clone(),
                name: line.name.clone(),
                side: line.side,
                matched_moves: matched,
                is_exact_line: matched == line.move_prefix.len() && matched == played.len(),
            })
        })
        .collect();

    // Stable: ties keep catalog order
    matches.sort_by(|a, b| b.matched_moves.cmp(&a.matched_moves));
    matches
}

/// Match against the built-in catalog.
pub fn match_known_gambits(played: &[String]) -> Vec<GambitMatch> {
    match_gambits(played, &GAMBIT_CATALOG)
}

/// Check that every line of a catalog is playable from the starting position.
pub fn validate_catalog(catalog: &[GambitLine]) -> Result<(), CoreError> {
    for line in catalog {
        if line.move_prefix.is_empty() {
            return Err(CoreError::Catalog(format!("{}: empty move prefix", line.id)));
        }
        let mut pos = Chess::default();
        for move_san in &line.move_prefix {
            let san: San = normalize_san(move_san)
                .parse()
                .map_err(|e| CoreError::Catalog(format!("{}: invalid SAN '{move_san}': {e}", line.id)))?;
            let mv = san
                .to_move(&pos)
                .map_err(|e| CoreError::Catalog(format!("{}: illegal move '{move_san}': {e}", line.id)))?;
            pos.play_unchecked(mv);
        }
    }
    Ok(())
}

/// Load and validate a catalog from JSON (an array of gambit lines).
pub fn load_catalog(json: &str) -> Result<Vec<GambitLine>, CoreError> {
    let catalog: Vec<GambitLine> =
        serde_json::from_str(json).map_err(|e| CoreError::Catalog(e.to_string()))?;
    validate_catalog(&catalog)?;
    tracing::debug!(lines = catalog.len(), "Loaded gambit catalog");
    Ok(catalog)
}
