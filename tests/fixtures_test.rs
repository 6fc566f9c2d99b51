//! Fixture pool loading from files on disk.

mod common;

use std::fs;

use chess_tactics::fixtures::{
    case_from_lichess_row, save_fixtures, select_puzzles, validate_case, FixtureFile, FixturePool,
    LichessPuzzle, RATING_RANGE,
};
use chess_tactics::{PatternType, TacticsError};
use common::temp_dir;

const PIN_FILE: &str = r#"{
  "description": "High-quality PIN tactical puzzles from Lichess database",
  "source": "https://database.lichess.org/",
  "generatedAt": "auto-generated",
  "cases": [
    {
      "id": "pin01",
      "initialFen": "4k3/8/2n5/8/8/8/8/4KB2 w - - 0 1",
      "sideToMove": "white",
      "rating": 1100,
      "bestMove": {"san": "Bb5", "uci": "f1b5"},
      "moves": [{"uci": "f1b5", "san": "Bb5", "player": true}],
      "resultingFen": "4k3/8/2n5/1B6/8/8/8/4K3 b - - 1 1",
      "expectedPattern": {"type": "PIN"},
      "context": "Lichess puzzle pin01 (Rating: 1100, Popularity: 90)",
      "tags": ["pin", "short"]
    }
  ]
}"#;

const FORK_FILE: &str = r#"{
  "description": "High-quality FORK tactical puzzles from Lichess database",
  "source": "https://database.lichess.org/",
  "generatedAt": "auto-generated",
  "cases": [
    {
      "id": "fork01",
      "initialFen": "r3k3/8/8/1N6/8/8/8/4K3 w - - 0 1",
      "sideToMove": "white",
      "rating": 1600,
      "bestMove": {"san": "Nc7+", "uci": "b5c7"},
      "moves": [{"uci": "b5c7", "san": "Nc7+", "player": true}],
      "resultingFen": "r3k3/2N5/8/8/8/8/8/4K3 b - - 1 1",
      "expectedPattern": {"type": "FORK"},
      "context": "Lichess puzzle fork01 (Rating: 1600, Popularity: 95)",
      "tags": ["fork", "short"]
    }
  ]
}"#;

#[test]
fn test_load_and_validate_pool() {
    let dir = temp_dir("pool");
    fs::write(dir.join("pin.json"), PIN_FILE).unwrap();
    fs::write(dir.join("fork.json"), FORK_FILE).unwrap();

    let pool = FixturePool::load_dir(&dir).unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.cases(PatternType::Skewer).len(), 0);

    let fork = pool.pick(PatternType::Fork, RATING_RANGE, 7).unwrap();
    assert_eq!(fork.id, "fork01");
    assert_eq!(fork.best_move.uci, "b5c7");

    for (_, case) in pool.iter() {
        assert!(validate_case(case).unwrap(), "{} not confirmed", case.id);
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_rating_filter_can_empty_a_pattern() {
    let dir = temp_dir("rating");
    fs::write(dir.join("pin.json"), PIN_FILE).unwrap();
    let pool = FixturePool::load_dir(&dir).unwrap();
    assert!(matches!(
        pool.pick(PatternType::Pin, 1500..=2200, 0),
        Err(TacticsError::EmptyFixturePool(_))
    ));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_empty_directory_is_fatal() {
    let dir = temp_dir("empty");
    assert!(matches!(
        FixturePool::load_dir(&dir),
        Err(TacticsError::EmptyFixturePool(_))
    ));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_directory_is_error() {
    let dir = temp_dir("missing").join("nope");
    assert!(matches!(FixturePool::load_dir(&dir), Err(TacticsError::Fixture(_))));
}

#[test]
fn test_malformed_file_is_error() {
    let dir = temp_dir("malformed");
    fs::write(dir.join("pin.json"), "{ not json").unwrap();
    assert!(matches!(FixturePool::load_dir(&dir), Err(TacticsError::Json(_))));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_generated_file_loads_back() {
    let rows: Vec<LichessPuzzle> = [
        "pinA,3k4/8/2n5/8/8/8/8/4KB2 b - - 0 1,d8e8 f1b5,1100,80,70,200,pin short,https://lichess.org/a#1,",
        "pinB,3k4/8/2n5/8/8/8/8/4KB2 b - - 0 1,d8e8 f1b5 e8d7 b5c6,1400,75,95,900,pin middlegame,https://lichess.org/b#1,",
    ]
    .iter()
    .map(|line| LichessPuzzle::from_csv_line(line).unwrap())
    .collect();

    let cases: Vec<_> = select_puzzles(&rows, PatternType::Pin, 10)
        .iter()
        .map(|row| case_from_lichess_row(row, PatternType::Pin).unwrap())
        .collect();
    assert_eq!(cases[0].id, "pinB");

    let dir = temp_dir("generated");
    let path = save_fixtures(&dir, PatternType::Pin, cases).unwrap();
    assert_eq!(path, dir.join("pin.json"));

    let file: FixtureFile = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(file.description, "High-quality PIN tactical puzzles from Lichess database");

    let pool = FixturePool::load_dir(&dir).unwrap();
    assert_eq!(pool.len(), 2);
    for (_, case) in pool.iter() {
        assert!(validate_case(case).unwrap(), "{} not confirmed", case.id);
    }
    fs::remove_dir_all(&dir).ok();
}
