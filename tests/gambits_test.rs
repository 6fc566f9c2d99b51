//! Gambit matching on move lists converted from coordinate notation.

mod common;

use chess_core::gambits::match_known_gambits;
use chess_core::notation::uci_line_to_san;
use chess_core::Side;
use common::START_FEN;

#[test]
fn test_uci_game_matches_danish_gambit() {
    let played = uci_line_to_san(START_FEN, "e2e4 e7e5 d2d4 e5d4 c2c3");
    assert_eq!(played, vec!["e4", "e5", "d4", "exd4", "c3"]);

    let matches = match_known_gambits(&played);
    assert_eq!(matches[0].gambit_id, "danish_gambit");
    assert_eq!(matches[0].side, Side::White);
    assert!(matches[0].is_exact_line);
}

#[test]
fn test_black_gambit_after_queen_pawn() {
    let played = uci_line_to_san(START_FEN, "d2d4 g8f6 c2c4 e7e5");
    let matches = match_known_gambits(&played);
    let budapest = matches.iter().find(|m| m.gambit_id == "budapest_gambit").unwrap();
    assert_eq!(budapest.side, Side::Black);
    assert_eq!(budapest.matched_moves, 4);
    assert!(budapest.is_exact_line);
}

#[test]
fn test_match_json_uses_camel_case() {
    let played = uci_line_to_san(START_FEN, "e2e4 e7e5 f2f4");
    let json = serde_json::to_value(match_known_gambits(&played)).unwrap();
    assert_eq!(json[0]["gambitId"], "kings_gambit");
    assert_eq!(json[0]["matchedMoves"], 3);
    assert_eq!(json[0]["isExactLine"], true);
}
