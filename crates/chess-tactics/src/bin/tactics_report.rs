//! Command-line front end for the tactics engine.
//!
//! Usage:
//!   tactics-report patterns <fen> [white|black]
//!   tactics-report moves <fen>
//!   tactics-report review <requests.jsonl>
//!   tactics-report validate-fixtures [dir]
//!   tactics-report build-fixtures <lichess_db_puzzle.csv> <out_dir> [max_per_pattern]
//!
//! `review` reads one request per line:
//!   {"fen": "...", "played": "d4", "best_move": "f3e5", "cp": 40, "loss": 100}
//! `best_move` may be omitted when an earlier line already supplied one for
//! the same position.

use std::env;
use std::fs;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chess_core::Side;
use chess_tactics::fixtures::{
    case_from_lichess_row, save_fixtures, select_from_csv, validate_case, FixturePool,
    DEFAULT_PUZZLES_PER_PATTERN, FIXTURE_PATTERNS,
};
use chess_tactics::{
    detect_missed_tactics, detect_patterns, find_risky_moves, find_tactical_opportunities,
    AnalysisConfig, EngineEval, EvalCache,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Deserialize)]
struct ReviewRequest {
    fen: String,
    played: String,
    #[serde(default)]
    best_move: Option<String>,
    #[serde(default)]
    cp: Option<i32>,
    loss: i32,
    #[serde(default)]
    side: Option<Side>,
}

/// Side to move from the FEN turn field, defaulting to White.
fn side_to_move(fen: &str) -> Side {
    fen.split_whitespace()
        .nth(1)
        .and_then(|t| t.parse().ok())
        .unwrap_or(Side::White)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_patterns(args: &[String]) -> anyhow::Result<()> {
    let fen = args.first().context("patterns needs a FEN")?;
    let side = match args.get(1) {
        Some(s) => s.parse::<Side>().map_err(anyhow::Error::msg)?,
        None => side_to_move(fen),
    };
    let patterns = detect_patterns(fen, side)?;
    info!(count = patterns.len(), side = %side, "Static patterns detected");
    print_json(&json!({ "side": side, "patterns": patterns }))
}

fn cmd_moves(args: &[String]) -> anyhow::Result<()> {
    let fen = args.first().context("moves needs a FEN")?;
    let side = side_to_move(fen);
    let opportunities = find_tactical_opportunities(fen, side);
    let risks = find_risky_moves(fen, side);
    info!(
        opportunities = opportunities.len(),
        risky_moves = risks.len(),
        "Move-level analysis finished"
    );
    print_json(&json!({ "side": side, "opportunities": opportunities, "risks": risks }))
}

fn cmd_review(args: &[String], config: &AnalysisConfig) -> anyhow::Result<()> {
    let path = args.first().context("review needs a JSONL file")?;
    let data = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let mut cache = EvalCache::new(config.eval_cache_capacity);
    let mut reviewed = 0;

    for (line_no, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let request: ReviewRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "Skipping malformed review request");
                continue;
            }
        };

        if let Some(best) = &request.best_move {
            cache.insert(
                &request.fen,
                EngineEval {
                    best_move: best.clone(),
                    cp: request.cp.unwrap_or(0),
                },
            );
        }
        let Some(best_move) = cache.get(&request.fen).map(|e| e.best_move.clone()) else {
            warn!(line = line_no + 1, "No engine move for position, skipping");
            continue;
        };

        let mover = request.side.unwrap_or_else(|| side_to_move(&request.fen));
        let tactics = detect_missed_tactics(
            &request.fen,
            mover,
            &request.played,
            &best_move,
            request.loss,
            Some(config.loss_threshold),
        );
        println!(
            "{}",
            serde_json::to_string(&json!({ "line": line_no + 1, "tactics": tactics }))?
        );
        reviewed += 1;
    }

    info!(reviewed, cached_positions = cache.len(), "Review finished");
    Ok(())
}

fn cmd_validate_fixtures(args: &[String], config: &AnalysisConfig) -> anyhow::Result<()> {
    let dir = match (args.first(), &config.fixtures_dir) {
        (Some(arg), _) => PathBuf::from(arg),
        (None, Some(dir)) => dir.clone(),
        (None, None) => bail!("validate-fixtures needs a directory (or TACTICS_FIXTURES_DIR)"),
    };
    let pool = FixturePool::load_dir(&dir)?;

    let mut confirmed = 0;
    let mut failed = 0;
    for (pattern, case) in pool.iter() {
        match validate_case(case) {
            Ok(true) => confirmed += 1,
            Ok(false) => {
                info!(id = %case.id, pattern = %pattern, "Expected pattern not found");
            }
            Err(e) => {
                warn!(id = %case.id, error = %e, "Invalid fixture case");
                failed += 1;
            }
        }
    }

    info!(total = pool.len(), confirmed, failed, "Fixture validation finished");
    println!("{confirmed}/{} cases confirmed, {failed} invalid", pool.len());
    Ok(())
}

fn cmd_build_fixtures(args: &[String]) -> anyhow::Result<()> {
    let csv_path = args.first().context("build-fixtures needs the puzzle CSV")?;
    let out_dir = PathBuf::from(args.get(1).context("build-fixtures needs an output directory")?);
    let max = match args.get(2) {
        Some(raw) => raw.parse().with_context(|| format!("invalid puzzle count '{raw}'"))?,
        None => DEFAULT_PUZZLES_PER_PATTERN,
    };

    let file = fs::File::open(csv_path).with_context(|| format!("failed to open {csv_path}"))?;
    let selected = select_from_csv(BufReader::new(file), &FIXTURE_PATTERNS, max)?;

    for (pattern, rows) in selected {
        let mut cases = Vec::with_capacity(rows.len());
        for row in &rows {
            match case_from_lichess_row(row, pattern) {
                Ok(case) => cases.push(case),
                Err(e) => warn!(id = %row.puzzle_id, error = %e, "Skipping puzzle"),
            }
        }
        let path = save_fixtures(&out_dir, pattern, cases)?;
        println!("{pattern}: {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let config = AnalysisConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => bail!("usage: tactics-report <patterns|moves|review|validate-fixtures|build-fixtures> ..."),
    };

    match command {
        "patterns" => cmd_patterns(rest),
        "moves" => cmd_moves(rest),
        "review" => cmd_review(rest, &config),
        "validate-fixtures" => cmd_validate_fixtures(rest, &config),
        "build-fixtures" => cmd_build_fixtures(rest),
        other => bail!("unknown command '{other}'"),
    }
}
