//! Analysis configuration from environment variables

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::TacticsError;

/// Default evaluation loss (centipawns) below which a move is not reviewed.
pub const DEFAULT_LOSS_THRESHOLD: i32 = 50;

pub const DEFAULT_EVAL_CACHE_CAPACITY: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Minimum evaluation loss before the missed-tactic classifier runs
    pub loss_threshold: i32,

    /// Entries kept by the evaluation cache before evicting
    pub eval_cache_capacity: usize,

    /// Directory holding tactical puzzle fixture files
    pub fixtures_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            loss_threshold: DEFAULT_LOSS_THRESHOLD,
            eval_cache_capacity: DEFAULT_EVAL_CACHE_CAPACITY,
            fixtures_dir: None,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    /// Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Result<Self, TacticsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TacticsError> {
        let defaults = Self::default();

        let loss_threshold = lookup("TACTICS_LOSS_THRESHOLD")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.loss_threshold);

        let eval_cache_capacity = lookup("TACTICS_EVAL_CACHE_CAPACITY")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.eval_cache_capacity);
        if eval_cache_capacity == 0 {
            return Err(TacticsError::Config("TACTICS_EVAL_CACHE_CAPACITY must be positive"));
        }

        let fixtures_dir = lookup("TACTICS_FIXTURES_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        info!(
            loss_threshold,
            eval_cache_capacity,
            fixtures_dir = ?fixtures_dir,
            "Analysis config loaded"
        );

        Ok(Self {
            loss_threshold,
            eval_cache_capacity,
            fixtures_dir,
        })
    }
}
