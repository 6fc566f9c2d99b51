/// Board query layer for tactical analysis.
///
/// Attack geometry here is pseudo-legal and independent of whose turn it is:
/// a piece attacks a square if its movement pattern reaches it, whether or
/// not moving there would expose its own king. `legal_destinations` layers
/// own-king safety on top of the same attack tables.

use std::collections::BTreeMap;

use shakmaty::{attacks, Bitboard, Board, Color, Piece, Rank, Role, Square};

// Piece values in centipawns
pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 300;
pub const BISHOP_VALUE: i32 = 300;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;
pub const KING_VALUE: i32 = 20_000;

/// Minimum value for a piece to count as a tactical target.
pub const MIN_TARGET_VALUE: i32 = 300;

/// Piece value (king included, as an effectively infinite value)
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// Is this a ray (sliding) piece type?
pub fn is_ray_piece(role: Role) -> bool {
    matches!(role, Role::Queen | Role::Rook | Role::Bishop)
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// Home rank of a colour (rank 1 for White, rank 8 for Black).
pub fn back_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    }
}

/// All (square, piece) pairs for one side, in square order.
pub fn pieces_of(board: &Board, color: Color) -> Vec<(Square, Piece)> {
    board
        .by_color(color)
        .into_iter()
        .filter_map(|sq| board.piece_at(sq).map(|piece| (sq, piece)))
        .collect()
}

/// Material for one side in centipawns, kings excluded.
pub fn material_count(board: &Board, color: Color) -> i32 {
    pieces_of(board, color)
        .into_iter()
        .filter(|(_, p)| p.role != Role::King)
        .map(|(_, p)| piece_value(p.role))
        .sum()
}

/// Material balance from `color`'s point of view.
pub fn material_diff(board: &Board, color: Color) -> i32 {
    material_count(board, color) - material_count(board, !color)
}

/// Find the king square for a color
pub fn king_square(board: &Board, color: Color) -> Option<Square> {
    board.king_of(color)
}

/// Attack set of `piece` standing on `square`, given the occupied squares.
fn piece_attacks(square: Square, piece: Piece, occupied: Bitboard) -> Bitboard {
    match piece.role {
        Role::Pawn => attacks::pawn_attacks(piece.color, square),
        Role::Knight => attacks::knight_attacks(square),
        Role::Bishop => attacks::bishop_attacks(square, occupied),
        Role::Rook => attacks::rook_attacks(square, occupied),
        Role::Queen => attacks::queen_attacks(square, occupied),
        Role::King => attacks::king_attacks(square),
    }
}

/// Bitboard of squares attacked by the piece on `square`.
///
/// Sliding rays stop at, and include, the first occupied square.
pub fn attack_set(board: &Board, square: Square) -> Bitboard {
    match board.piece_at(square) {
        Some(piece) => piece_attacks(square, piece, board.occupied()),
        None => Bitboard::EMPTY,
    }
}

/// Get squares attacked by the piece on a given square, in square order.
pub fn attacks_from(board: &Board, square: Square) -> Vec<Square> {
    attack_set(board, square).into_iter().collect()
}

/// The neighbouring square of each line a slider moves along. Empty for
/// non-sliders.
pub fn ray_starts(role: Role, square: Square) -> Bitboard {
    if !is_ray_piece(role) {
        return Bitboard::EMPTY;
    }
    let lines = match role {
        Role::Bishop => attacks::bishop_attacks(square, Bitboard::EMPTY),
        Role::Rook => attacks::rook_attacks(square, Bitboard::EMPTY),
        _ => attacks::queen_attacks(square, Bitboard::EMPTY),
    };
    lines & attacks::king_attacks(square)
}

/// Every occupied square on the line from `from` through its neighbour
/// `toward`, nearest first, up to the board edge.
pub fn ray_occupants(board: &Board, from: Square, toward: Square) -> Vec<(Square, Piece)> {
    let mut beyond: Vec<Square> = (attacks::ray(from, toward) & board.occupied())
        .into_iter()
        .filter(|&sq| sq == toward || attacks::between(from, sq).contains(toward))
        .collect();
    beyond.sort_by_key(|&sq| attacks::between(from, sq).count());
    beyond
        .into_iter()
        .filter_map(|sq| board.piece_at(sq).map(|piece| (sq, piece)))
        .collect()
}

/// Bitboard of `color` pieces attacking `square`.
pub fn attackers_of(board: &Board, color: Color, square: Square) -> Bitboard {
    let occupied = board.occupied();
    let candidates = (attacks::rook_attacks(square, occupied) & board.rooks_and_queens())
        | (attacks::bishop_attacks(square, occupied) & board.bishops_and_queens())
        | (attacks::knight_attacks(square) & board.knights())
        | (attacks::king_attacks(square) & board.kings())
        | (attacks::pawn_attacks(!color, square) & board.pawns());
    candidates & board.by_color(color)
}

/// Get all pieces of a given color that attack a square
pub fn attackers(board: &Board, color: Color, square: Square) -> Vec<Square> {
    attackers_of(board, color, square).into_iter().collect()
}

/// Is `square` attacked by any piece of `by`?
pub fn is_attacked(board: &Board, square: Square, by: Color) -> bool {
    attackers_of(board, by, square).any()
}

/// Attack map for one side: target square -> attacking squares.
pub fn attack_map(board: &Board, color: Color) -> BTreeMap<Square, Vec<Square>> {
    let mut map: BTreeMap<Square, Vec<Square>> = BTreeMap::new();
    for (sq, _) in pieces_of(board, color) {
        for target in attack_set(board, sq) {
            map.entry(target).or_default().push(sq);
        }
    }
    map
}

/// Squares holding the piece's own side that it protects.
pub fn defended_squares(board: &Board, square: Square) -> Vec<Square> {
    match board.piece_at(square) {
        Some(piece) => (attack_set(board, square) & board.by_color(piece.color))
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

/// Move destinations ignoring own-king safety.
fn pseudo_destinations(board: &Board, square: Square, piece: Piece) -> Bitboard {
    let capturable = board.by_color(!piece.color) & !board.kings();
    if piece.role != Role::Pawn {
        return attack_set(board, square) & (!board.occupied() | capturable);
    }

    // Pawn: diagonal captures only where an enemy stands, plus forward pushes
    let mut result = attacks::pawn_attacks(piece.color, square) & capturable;
    let (step, start_rank) = match piece.color {
        Color::White => (8, Rank::Second),
        Color::Black => (-8, Rank::Seventh),
    };
    if let Some(one_ahead) = square.offset(step).filter(|&sq| !board.occupied().contains(sq)) {
        result.add(one_ahead);
        if square.rank() == start_rank {
            if let Some(two_ahead) = one_ahead.offset(step).filter(|&sq| !board.occupied().contains(sq)) {
                result.add(two_ahead);
            }
        }
    }
    result
}

/// Would moving `piece` from `from` to `to` leave its own king attacked?
fn exposes_king(board: &Board, from: Square, to: Square, piece: Piece) -> bool {
    let mut after = board.clone();
    after.remove_piece_at(from);
    after.set_piece_at(to, piece);
    match after.king_of(piece.color) {
        Some(king_sq) => is_attacked(&after, king_sq, !piece.color),
        None => false,
    }
}

/// Fully-legal destinations of the piece on `square`, for either side.
///
/// Castling and en passant are not generated; neither can free a non-king
/// piece that otherwise has no moves.
pub fn legal_destinations(board: &Board, square: Square) -> Vec<Square> {
    let piece = match board.piece_at(square) {
        Some(p) => p,
        None => return Vec::new(),
    };
    pseudo_destinations(board, square, piece)
        .into_iter()
        .filter(|&to| !exposes_king(board, square, to, piece))
        .collect()
}
