//! Tactical puzzle fixture pool.
//!
//! Fixture files are built from the Lichess puzzle database, one file per
//! pattern (`pin.json`, `fork.json`, ...). Each case starts from the position
//! after the opponent's setup move, with the solving side to move.
//!
//! The generation side lives here too: rows of the Lichess puzzle CSV are
//! filtered by quality, converted to cases and written out per pattern.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufRead;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chess_core::notation::{decode_move, move_to_san, move_to_uci, parse_position, position_fen};
use chess_core::Side;
use serde::{Deserialize, Serialize};
use shakmaty::Position;
use tracing::{info, warn};

use crate::detectors::detect_all;
use crate::error::TacticsError;
use crate::opportunities::patterns_after_move;
use crate::pattern::PatternType;

/// Rating band used when the pool was generated.
pub const RATING_RANGE: RangeInclusive<u32> = 800..=2200;

// Quality bar for puzzles taken from the database
pub const MIN_POPULARITY: i32 = 50;
pub const MIN_PLAYS: u32 = 50;
pub const DEFAULT_PUZZLES_PER_PATTERN: usize = 20;

pub const LICHESS_SOURCE: &str = "https://database.lichess.org/";

/// Patterns that have a fixture file.
pub const FIXTURE_PATTERNS: [PatternType; 8] = [
    PatternType::Pin,
    PatternType::Fork,
    PatternType::Skewer,
    PatternType::DiscoveredCheck,
    PatternType::DoubleAttack,
    PatternType::Overloading,
    PatternType::BackRankWeakness,
    PatternType::TrappedPiece,
];

/// Lichess puzzle themes that select puzzles for a pattern.
pub fn lichess_themes(pattern: PatternType) -> &'static [&'static str] {
    match pattern {
        PatternType::Pin => &["pin"],
        PatternType::Fork => &["fork"],
        PatternType::Skewer => &["skewer"],
        PatternType::DiscoveredCheck | PatternType::DiscoveredAttack => &["discoveredAttack"],
        PatternType::DoubleAttack => &["doubleCheck", "fork"],
        PatternType::Overloading => &["overloading"],
        PatternType::BackRankWeakness => &["backRankMate"],
        PatternType::TrappedPiece => &["trappedPiece"],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureFile {
    pub description: String,
    pub source: String,
    pub generated_at: String,
    pub cases: Vec<PuzzleCase>,
}

impl FixtureFile {
    /// Envelope for a freshly generated pattern file.
    pub fn for_pattern(pattern: PatternType, cases: Vec<PuzzleCase>) -> Self {
        Self {
            description: format!("High-quality {pattern} tactical puzzles from Lichess database"),
            source: LICHESS_SOURCE.to_string(),
            generated_at: "auto-generated".to_string(),
            cases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureMove {
    pub san: String,
    pub uci: String,
}

/// One move of the solution line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMove {
    pub uci: String,
    pub san: String,
    /// True for the solving side's moves
    pub player: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleCase {
    pub id: String,
    pub initial_fen: String,
    pub side_to_move: Side,
    pub rating: u32,
    pub best_move: FixtureMove,
    #[serde(default)]
    pub moves: Vec<LineMove>,
    #[serde(default)]
    pub resulting_fen: String,
    pub expected_pattern: ExpectedPattern,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One row of the Lichess puzzle database export.
///
/// `fen` is the position before the opponent's setup move; `moves` holds the
/// setup move followed by the solution line, in coordinate form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LichessPuzzle {
    pub puzzle_id: String,
    #[serde(rename = "FEN")]
    pub fen: String,
    pub moves: String,
    pub rating: u32,
    pub popularity: i32,
    pub nb_plays: u32,
    pub themes: String,
}

fn column<T: FromStr>(fields: &[&str], index: usize, name: &str) -> Result<T, TacticsError> {
    fields
        .get(index)
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| TacticsError::Fixture(format!("bad {name} column in puzzle row")))
}

impl LichessPuzzle {
    /// Parse a data row of the CSV export
    /// (`PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,...`).
    pub fn from_csv_line(line: &str) -> Result<Self, TacticsError> {
        let fields: Vec<&str> = line.trim_end().split(',').collect();
        if fields.len() < 8 {
            return Err(TacticsError::Fixture(format!(
                "expected at least 8 columns, found {}",
                fields.len()
            )));
        }
        Ok(Self {
            puzzle_id: column(&fields, 0, "PuzzleId")?,
            fen: column(&fields, 1, "FEN")?,
            moves: column(&fields, 2, "Moves")?,
            rating: column(&fields, 3, "Rating")?,
            popularity: column(&fields, 5, "Popularity")?,
            nb_plays: column(&fields, 6, "NbPlays")?,
            themes: column(&fields, 7, "Themes")?,
        })
    }

    pub fn theme_list(&self) -> impl Iterator<Item = &str> {
        self.themes.split_whitespace()
    }

    /// Popular, often played, and rated inside `RATING_RANGE`.
    pub fn meets_quality_bar(&self) -> bool {
        self.popularity >= MIN_POPULARITY
            && self.nb_plays >= MIN_PLAYS
            && RATING_RANGE.contains(&self.rating)
    }

    pub fn has_theme_for(&self, pattern: PatternType) -> bool {
        let themes = lichess_themes(pattern);
        self.theme_list().any(|theme| themes.contains(&theme))
    }

    fn selected_for(&self, pattern: PatternType) -> bool {
        self.has_theme_for(pattern) && self.meets_quality_bar()
    }
}

fn most_popular_first(puzzles: &mut [LichessPuzzle]) {
    puzzles.sort_by(|a, b| b.popularity.cmp(&a.popularity));
}

/// The first `max` rows that carry a theme for `pattern` and pass the
/// quality bar, most popular first.
pub fn select_puzzles<'a>(
    rows: impl IntoIterator<Item = &'a LichessPuzzle>,
    pattern: PatternType,
    max: usize,
) -> Vec<LichessPuzzle> {
    let mut selected: Vec<LichessPuzzle> = rows
        .into_iter()
        .filter(|row| row.selected_for(pattern))
        .take(max)
        .cloned()
        .collect();
    most_popular_first(&mut selected);
    selected
}

/// Stream the CSV export once and select up to `max` puzzles for each of
/// `patterns`. Malformed rows are skipped.
pub fn select_from_csv(
    reader: impl BufRead,
    patterns: &[PatternType],
    max: usize,
) -> Result<BTreeMap<PatternType, Vec<LichessPuzzle>>, TacticsError> {
    let mut selected: BTreeMap<PatternType, Vec<LichessPuzzle>> =
        patterns.iter().map(|p| (*p, Vec::new())).collect();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with("PuzzleId") {
            continue;
        }
        let row = match LichessPuzzle::from_csv_line(&line) {
            Ok(row) => row,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "Skipping puzzle row");
                continue;
            }
        };
        for (pattern, bucket) in selected.iter_mut() {
            if bucket.len() < max && row.selected_for(*pattern) {
                bucket.push(row.clone());
            }
        }
        if selected.values().all(|bucket| bucket.len() >= max) {
            break;
        }
    }

    for (pattern, bucket) in selected.iter_mut() {
        most_popular_first(bucket);
        info!(pattern = %pattern, puzzles = bucket.len(), "Selected puzzles");
    }
    Ok(selected)
}

/// Convert a database row into a fixture case: play the setup move, then
/// replay the solution line recording SAN and whose move each one is.
pub fn case_from_lichess_row(row: &LichessPuzzle, pattern: PatternType) -> Result<PuzzleCase, TacticsError> {
    let line: Vec<&str> = row.moves.split_whitespace().collect();
    if line.len() < 2 {
        return Err(TacticsError::Fixture(format!(
            "{}: needs a setup move and a solution",
            row.puzzle_id
        )));
    }

    let mut pos = parse_position(&row.fen)?;
    let illegal = |uci: &str| TacticsError::Fixture(format!("{}: illegal move {uci}", row.puzzle_id));

    let setup = decode_move(&pos, line[0]).ok_or_else(|| illegal(line[0]))?;
    pos.play_unchecked(setup);
    let initial_fen = position_fen(&pos);
    let side_to_move = Side::from(pos.turn());

    let mut moves = Vec::with_capacity(line.len() - 1);
    for (ply, &uci) in line.iter().enumerate().skip(1) {
        let mv = decode_move(&pos, uci).ok_or_else(|| illegal(uci))?;
        moves.push(LineMove {
            uci: uci.to_string(),
            san: move_to_san(&pos, &mv),
            player: ply % 2 == 1,
        });
        pos.play_unchecked(mv);
    }

    let best_move = FixtureMove {
        san: moves[0].san.clone(),
        uci: moves[0].uci.clone(),
    };

    Ok(PuzzleCase {
        id: row.puzzle_id.clone(),
        initial_fen,
        side_to_move,
        rating: row.rating,
        best_move,
        moves,
        resulting_fen: position_fen(&pos),
        expected_pattern: ExpectedPattern { pattern_type: pattern },
        context: format!(
            "Lichess puzzle {} (Rating: {}, Popularity: {})",
            row.puzzle_id, row.rating, row.popularity
        ),
        tags: row.theme_list().map(str::to_string).collect(),
    })
}

/// Write `<dir>/<pattern>.json` in the fixture file format.
pub fn save_fixtures(dir: &Path, pattern: PatternType, cases: Vec<PuzzleCase>) -> Result<PathBuf, TacticsError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", pattern.as_snake()));
    let count = cases.len();
    let file = FixtureFile::for_pattern(pattern, cases);
    fs::write(&path, serde_json::to_string_pretty(&file)?)?;
    info!(path = %path.display(), cases = count, "Saved fixture file");
    Ok(path)
}

#[derive(Debug, Clone, Default)]
pub struct FixturePool {
    cases: BTreeMap<PatternType, Vec<PuzzleCase>>,
}

impl FixturePool {
    /// Load every known pattern file present in `dir`.
    ///
    /// Missing files are skipped; a pool with no cases at all is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, TacticsError> {
        if !dir.is_dir() {
            return Err(TacticsError::Fixture(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut pool = FixturePool::default();
        for pattern in FIXTURE_PATTERNS {
            let path = dir.join(format!("{}.json", pattern.as_snake()));
            if !path.exists() {
                warn!(path = %path.display(), "Fixture file missing");
                continue;
            }
            let raw = fs::read_to_string(&path)?;
            let file: FixtureFile = serde_json::from_str(&raw)?;
            info!(pattern = %pattern, cases = file.cases.len(), "Loaded fixture file");
            pool.insert_all(pattern, file.cases);
        }

        if pool.is_empty() {
            return Err(TacticsError::EmptyFixturePool(dir.display().to_string()));
        }
        Ok(pool)
    }

    pub fn insert_all(&mut self, pattern: PatternType, cases: Vec<PuzzleCase>) {
        self.cases.entry(pattern).or_default().extend(cases);
    }

    pub fn cases(&self, pattern: PatternType) -> &[PuzzleCase] {
        self.cases.get(&pattern).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.cases.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every case, with the pattern it was filed under.
    pub fn iter(&self) -> impl Iterator<Item = (PatternType, &PuzzleCase)> {
        self.cases
            .iter()
            .flat_map(|(pattern, cases)| cases.iter().map(move |case| (*pattern, case)))
    }

    /// Pick a case for `pattern` rated within `rating`. `index` wraps around
    /// the matching cases, so the same index always gives the same case.
    pub fn pick(
        &self,
        pattern: PatternType,
        rating: RangeInclusive<u32>,
        index: usize,
    ) -> Result<&PuzzleCase, TacticsError> {
        let candidates: Vec<&PuzzleCase> = self
            .cases(pattern)
            .iter()
            .filter(|case| rating.contains(&case.rating))
            .collect();

        if candidates.is_empty() {
            return Err(TacticsError::EmptyFixturePool(format!(
                "no {} cases rated {}-{}",
                pattern,
                rating.start(),
                rating.end()
            )));
        }
        Ok(candidates[index % candidates.len()])
    }
}

/// Play the case's best move and check that the expected pattern shows up,
/// either on the resulting board or as a move-level opportunity of that move.
pub fn validate_case(case: &PuzzleCase) -> Result<bool, TacticsError> {
    let pos = parse_position(&case.initial_fen)?;
    let best = decode_move(&pos, &case.best_move.uci).ok_or_else(|| {
        TacticsError::Fixture(format!(
            "{}: best move {} is not legal",
            case.id, case.best_move.uci
        ))
    })?;
    if Side::from(pos.turn()) != case.side_to_move {
        return Err(TacticsError::Fixture(format!(
            "{}: side to move does not match FEN",
            case.id
        )));
    }

    let expected = case.expected_pattern.pattern_type;
    let mut after = pos.clone();
    after.play_unchecked(best.clone());

    let on_board = detect_all(after.board(), pos.turn())
        .iter()
        .any(|p| p.pattern_type == expected);
    let found = on_board
        || patterns_after_move(&pos, &best)
            .iter()
            .any(|p| p.pattern_type == expected);

    tracing::debug!(id = %case.id, best = %move_to_uci(&best), found, "Validated fixture case");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, rating: u32, pattern: PatternType) -> PuzzleCase {
        PuzzleCase {
            id: id.to_string(),
            initial_fen: "4k3/8/2n5/8/8/8/8/4KB2 w - - 0 1".to_string(),
            side_to_move: Side::White,
            rating,
            best_move: FixtureMove {
                san: "Bb5".to_string(),
                uci: "f1b5".to_string(),
            },
            moves: Vec::new(),
            resulting_fen: String::new(),
            expected_pattern: ExpectedPattern { pattern_type: pattern },
            context: String::new(),
            tags: vec!["pin".to_string()],
        }
    }

    #[test]
    fn test_pick_is_deterministic_and_wraps() {
        let mut pool = FixturePool::default();
        pool.insert_all(
            PatternType::Pin,
            vec![case("a", 900, PatternType::Pin), case("b", 1500, PatternType::Pin), case("c", 2500, PatternType::Pin)],
        );
        assert_eq!(pool.pick(PatternType::Pin, RATING_RANGE, 0).unwrap().id, "a");
        assert_eq!(pool.pick(PatternType::Pin, RATING_RANGE, 1).unwrap().id, "b");
        // "c" is outside the rating band, so index 2 wraps to "a"
        assert_eq!(pool.pick(PatternType::Pin, RATING_RANGE, 2).unwrap().id, "a");
    }

    #[test]
    fn test_pick_from_empty_pattern_is_error() {
        let pool = FixturePool::default();
        assert!(matches!(
            pool.pick(PatternType::Fork, RATING_RANGE, 0),
            Err(TacticsError::EmptyFixturePool(_))
        ));
    }

    #[test]
    fn test_validate_case() {
        assert!(validate_case(&case("pin", 1200, PatternType::Pin)).unwrap());
        assert!(!validate_case(&case("fork", 1200, PatternType::Fork)).unwrap());
    }

    #[test]
    fn test_validate_case_rejects_illegal_best_move() {
        let mut bad = case("bad", 1200, PatternType::Pin);
        bad.best_move.uci = "f1f8".to_string();
        assert!(matches!(validate_case(&bad), Err(TacticsError::Fixture(_))));
    }

    #[test]
    fn test_case_json_shape() {
        let json = r#"{
            "id": "00sHx",
            "initialFen": "4k3/8/2n5/8/8/8/8/4KB2 w - - 0 1",
            "sideToMove": "white",
            "rating": 1234,
            "bestMove": {"san": "Bb5", "uci": "f1b5"},
            "moves": [{"uci": "f1b5", "san": "Bb5", "player": true}],
            "resultingFen": "4k3/8/2n5/1B6/8/8/8/4K3 b - - 1 1",
            "expectedPattern": {"type": "PIN"},
            "context": "Lichess puzzle 00sHx",
            "tags": ["pin", "middlegame"]
        }"#;
        let parsed: PuzzleCase = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.expected_pattern.pattern_type, PatternType::Pin);
        assert_eq!(parsed.moves.len(), 1);
        assert!(parsed.moves[0].player);
    }

    const PIN_ROW: &str = "00pin,3k4/8/2n5/8/8/8/8/4KB2 b - - 0 1,d8e8 f1b5 e8d7 b5c6,1234,75,90,320,pin short middlegame,https://lichess.org/abcdef#10,";

    fn row(id: &str, popularity: i32, plays: u32, rating: u32, themes: &str) -> LichessPuzzle {
        LichessPuzzle {
            puzzle_id: id.to_string(),
            fen: "3k4/8/2n5/8/8/8/8/4KB2 b - - 0 1".to_string(),
            moves: "d8e8 f1b5".to_string(),
            rating,
            popularity,
            nb_plays: plays,
            themes: themes.to_string(),
        }
    }

    #[test]
    fn test_csv_row_parsing() {
        let parsed = LichessPuzzle::from_csv_line(PIN_ROW).unwrap();
        assert_eq!(parsed.puzzle_id, "00pin");
        assert_eq!(parsed.rating, 1234);
        assert_eq!(parsed.popularity, 90);
        assert_eq!(parsed.nb_plays, 320);
        assert!(parsed.has_theme_for(PatternType::Pin));
        assert!(!parsed.has_theme_for(PatternType::Fork));

        assert!(LichessPuzzle::from_csv_line("00pin,fen,moves").is_err());
        assert!(LichessPuzzle::from_csv_line("00pin,fen,moves,high,75,90,320,pin").is_err());
    }

    #[test]
    fn test_select_puzzles_filters_caps_and_sorts() {
        let rows = vec![
            row("a", 60, 100, 1000, "pin"),
            row("b", 95, 100, 1500, "pin endgame"),
            row("c", 70, 100, 2500, "pin"),
            row("d", 40, 100, 1200, "pin"),
            row("e", 90, 10, 1200, "pin"),
            row("f", 99, 100, 1200, "fork"),
            row("g", 80, 100, 1800, "pin"),
        ];
        let ids = |selected: Vec<LichessPuzzle>| selected.into_iter().map(|r| r.puzzle_id).collect::<Vec<_>>();

        assert_eq!(ids(select_puzzles(&rows, PatternType::Pin, 20)), vec!["b", "g", "a"]);
        // The cap applies in file order, before sorting
        assert_eq!(ids(select_puzzles(&rows, PatternType::Pin, 2)), vec!["b", "a"]);
        // Fork puzzles also count as double attacks
        assert_eq!(ids(select_puzzles(&rows, PatternType::DoubleAttack, 20)), vec!["f"]);
    }

    #[test]
    fn test_select_from_csv() {
        let csv = format!(
            "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags\n{PIN_ROW}\nbroken,row\n"
        );
        let selected = select_from_csv(csv.as_bytes(), &[PatternType::Pin, PatternType::Fork], 5).unwrap();
        assert_eq!(selected[&PatternType::Pin].len(), 1);
        assert!(selected[&PatternType::Fork].is_empty());
    }

    #[test]
    fn test_case_from_lichess_row() {
        let parsed = LichessPuzzle::from_csv_line(PIN_ROW).unwrap();
        let case = case_from_lichess_row(&parsed, PatternType::Pin).unwrap();

        assert_eq!(case.id, "00pin");
        assert_eq!(case.initial_fen, "4k3/8/2n5/8/8/8/8/4KB2 w - - 1 2");
        assert_eq!(case.side_to_move, Side::White);
        assert_eq!(case.best_move, FixtureMove { san: "Bb5".to_string(), uci: "f1b5".to_string() });
        let line: Vec<(&str, bool)> = case.moves.iter().map(|m| (m.san.as_str(), m.player)).collect();
        assert_eq!(line, vec![("Bb5", true), ("Kd7", false), ("Bxc6+", true)]);
        assert_eq!(case.resulting_fen, "8/3k4/2B5/8/8/8/8/4K3 b - - 0 3");
        assert_eq!(case.context, "Lichess puzzle 00pin (Rating: 1234, Popularity: 90)");
        assert_eq!(case.tags, vec!["pin", "short", "middlegame"]);
        assert!(validate_case(&case).unwrap());
    }

    #[test]
    fn test_case_from_row_with_illegal_line() {
        let mut bad = LichessPuzzle::from_csv_line(PIN_ROW).unwrap();
        bad.moves = "d8e8 f1f8".to_string();
        assert!(matches!(case_from_lichess_row(&bad, PatternType::Pin), Err(TacticsError::Fixture(_))));
        bad.moves = "d8e8".to_string();
        assert!(matches!(case_from_lichess_row(&bad, PatternType::Pin), Err(TacticsError::Fixture(_))));
    }

    #[test]
    fn test_fixture_file_envelope() {
        let file = FixtureFile::for_pattern(PatternType::BackRankWeakness, Vec::new());
        assert_eq!(file.description, "High-quality BACK_RANK_WEAKNESS tactical puzzles from Lichess database");
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["source"], LICHESS_SOURCE);
        assert_eq!(json["generatedAt"], "auto-generated");
        assert!(json["cases"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_theme_mapping() {
        assert_eq!(lichess_themes(PatternType::DoubleAttack), &["doubleCheck", "fork"]);
        assert_eq!(lichess_themes(PatternType::BackRankWeakness), &["backRankMate"]);
        assert!(FIXTURE_PATTERNS.iter().all(|p| !lichess_themes(*p).is_empty()));
    }
}
