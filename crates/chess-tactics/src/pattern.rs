//! Tactical pattern records produced by the detectors.

use std::fmt;

use chess_core::Side;
use serde::{Deserialize, Serialize};
use shakmaty::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternType {
    Pin,
    Skewer,
    Fork,
    DiscoveredAttack,
    DiscoveredCheck,
    DoubleAttack,
    Overloading,
    BackRankWeakness,
    TrappedPiece,
}

impl PatternType {
    pub const ALL: [PatternType; 9] = [
        PatternType::Pin,
        PatternType::Skewer,
        PatternType::Fork,
        PatternType::DiscoveredAttack,
        PatternType::DiscoveredCheck,
        PatternType::DoubleAttack,
        PatternType::Overloading,
        PatternType::BackRankWeakness,
        PatternType::TrappedPiece,
    ];

    /// Lowercase name, as used in fixture file names and tactic types.
    pub fn as_snake(self) -> &'static str {
        match self {
            PatternType::Pin => "pin",
            PatternType::Skewer => "skewer",
            PatternType::Fork => "fork",
            PatternType::DiscoveredAttack => "discovered_attack",
            PatternType::DiscoveredCheck => "discovered_check",
            PatternType::DoubleAttack => "double_attack",
            PatternType::Overloading => "overloading",
            PatternType::BackRankWeakness => "back_rank_weakness",
            PatternType::TrappedPiece => "trapped_piece",
        }
    }

    /// Parse either `PIN`/`BACK_RANK_WEAKNESS` or `pin`/`back_rank_weakness`.
    pub fn from_name(name: &str) -> Option<PatternType> {
        let lower = name.trim().to_ascii_lowercase();
        PatternType::ALL.into_iter().find(|p| p.as_snake() == lower)
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_snake().to_ascii_uppercase())
    }
}

/// A geometric motif found in a position, from the point of view of `side`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub side: Side,
    #[serde(with = "square_list")]
    pub attacker_squares: Vec<Square>,
    #[serde(with = "square_list")]
    pub target_squares: Vec<Square>,
    #[serde(with = "square_list", default, skip_serializing_if = "Vec::is_empty")]
    pub key_squares: Vec<Square>,
}

impl TacticalPattern {
    pub fn new(
        pattern_type: PatternType,
        side: Side,
        attacker_squares: Vec<Square>,
        target_squares: Vec<Square>,
    ) -> Self {
        Self {
            pattern_type,
            side,
            attacker_squares,
            target_squares,
            key_squares: Vec::new(),
        }
    }

    pub fn with_keys(mut self, key_squares: Vec<Square>) -> Self {
        self.key_squares = key_squares;
        self
    }

    /// Attackers, then targets, then key squares, without repeats.
    pub fn affected_squares(&self) -> Vec<Square> {
        let mut result: Vec<Square> = Vec::new();
        for sq in self
            .attacker_squares
            .iter()
            .chain(&self.target_squares)
            .chain(&self.key_squares)
        {
            if !result.contains(sq) {
                result.push(*sq);
            }
        }
        result
    }
}

/// A candidate move together with a pattern it creates for the mover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalOpportunity {
    /// Coordinate form, e.g. `f3e5`
    #[serde(rename = "move")]
    pub mv: String,
    pub pattern: TacticalPattern,
}

/// A candidate move together with what it hands the opponent next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalRisk {
    #[serde(rename = "move")]
    pub mv: String,
    pub opponent_patterns: Vec<TacticalPattern>,
}

/// Squares serialize as algebraic strings (`"e4"`).
pub(crate) mod square_list {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use shakmaty::Square;

    pub fn serialize<S: Serializer>(squares: &[Square], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(squares.iter().map(|sq| sq.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Square>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|s| {
                s.parse::<Square>()
                    .map_err(|_| D::Error::custom(format!("invalid square '{s}'")))
            })
            .collect()
    }
}
