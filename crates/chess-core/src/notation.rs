//! Position and move notation helpers on top of shakmaty.
//!
//! Every entry point rebuilds its working position from the FEN string it is
//! given. Move decoders return `None` for text that is not a legal move in
//! that position, never an error.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{Board, CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::error::CoreError;
use crate::side::Side;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a full FEN into a playable position.
pub fn parse_position(fen: &str) -> Result<Chess, CoreError> {
    let parsed: Fen = fen.trim().parse().map_err(|e| CoreError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| CoreError::IllegalPosition {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })
}

/// Parse only the piece-placement field of a FEN.
///
/// Geometry queries do not need a legal position, so this accepts boards a
/// rules engine would reject (e.g. the side not to move being in check).
pub fn parse_board(fen: &str) -> Result<Board, CoreError> {
    let placement = fen.split_whitespace().next().unwrap_or("");
    placement.parse::<Board>().map_err(|e| CoreError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })
}

/// Rebuild the position with `side` to move.
///
/// When the turn changes the en-passant field is cleared, since it only ever
/// belongs to the side that was to move. Fails if the result is illegal, for
/// example when the side that would now wait is in check.
pub fn position_with_turn(fen: &str, side: Side) -> Result<Chess, CoreError> {
    let mut fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.is_empty() {
        return Err(CoreError::InvalidFen {
            fen: fen.to_string(),
            reason: "empty FEN".into(),
        });
    }
    let turn = match side {
        Side::White => "w",
        Side::Black => "b",
    };
    match fields.get(1).copied() {
        Some(current) if current == turn => return parse_position(fen),
        Some(_) => {
            fields[1] = turn;
            if fields.len() > 3 {
                fields[3] = "-";
            }
        }
        None => fields.push(turn),
    }
    parse_position(&fields.join(" "))
}

/// Strip check/mate suffixes and annotation glyphs from a SAN token.
pub fn normalize_san(san: &str) -> &str {
    san.trim().trim_end_matches(['+', '#', '!', '?'])
}

/// Full FEN of a position; the en-passant square is written only when a
/// capture there is legal.
pub fn position_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Decode a move given in coordinate (`f3e5`, `e7e8q`) or algebraic
/// (`Nxe5`, `O-O`) form. Returns `None` if it is not legal in `pos`.
pub fn decode_move(pos: &Chess, text: &str) -> Option<Move> {
    let text = normalize_san(text);
    if text.is_empty() {
        return None;
    }
    if let Ok(uci) = text.parse::<UciMove>() {
        if let Ok(mv) = uci.to_move(pos) {
            return Some(mv);
        }
    }
    let san: San = text.parse().ok()?;
    san.to_move(pos).ok()
}

/// Coordinate form of a legal move (castling as king-to-destination).
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// Algebraic form of a legal move in `pos`.
pub fn move_to_san(pos: &Chess, mv: &Move) -> String {
    San::from_move(pos, mv.clone()).to_string()
}

/// Convert a single UCI move to SAN at a given position.
pub fn uci_to_san(fen: &str, uci: &str) -> Option<String> {
    let pos = parse_position(fen).ok()?;
    let uci_move: UciMove = uci.trim().parse().ok()?;
    let legal_move = uci_move.to_move(&pos).ok()?;
    Some(move_to_san(&pos, &legal_move))
}

/// Convert a single SAN move to UCI at a given position.
pub fn san_to_uci(fen: &str, san: &str) -> Option<String> {
    let pos = parse_position(fen).ok()?;
    let san: San = normalize_san(san).parse().ok()?;
    let legal_move = san.to_move(&pos).ok()?;
    Some(move_to_uci(&legal_move))
}

/// Convert a UCI line to SAN, stopping at the first illegal move.
pub fn uci_line_to_san(fen: &str, uci_line: &str) -> Vec<String> {
    let mut pos = match parse_position(fen) {
        Ok(p) => p,
        Err(_) => return Vec::new(),
    };
    let mut moves = Vec::new();
    for token in uci_line.split_whitespace() {
        let legal_move = match token.parse::<UciMove>().ok().and_then(|u| u.to_move(&pos).ok()) {
            Some(m) => m,
            None => break,
        };
        moves.push(move_to_san(&pos, &legal_move));
        pos.play_unchecked(legal_move);
    }
    moves
}
