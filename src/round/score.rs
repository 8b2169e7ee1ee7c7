//! Score Entry and Hole Input
//!
//! One hole's input is the par, each player's stroke score, the carried
//! all-tie flag from the previous hole, and the rule configuration in force.
//! Scores may be entered as raw stroke counts or as named results (birdie,
//! bogey, ...) that resolve against par. Resolution happens once, up front;
//! the settlement engine only ever sees resolved stroke counts.

use crate::round::rules::RuleConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Smallest legal par for a hole.
pub const MIN_PAR: u8 = 3;
/// Largest legal par for a hole.
pub const MAX_PAR: u8 = 5;

/// A named hole result, resolved as an offset from par.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedResult {
    /// Two under par.
    Eagle,
    /// One under par.
    Birdie,
    /// Even with par.
    Par,
    /// One over par.
    Bogey,
    /// Two over par.
    DoubleBogey,
    /// Three over par.
    TripleBogey,
    /// Four over par.
    QuadrupleBogey,
}

impl NamedResult {
    /// Stroke offset from par.
    pub fn offset(self) -> i16 {
        match self {
            NamedResult::Eagle => -2,
            NamedResult::Birdie => -1,
            NamedResult::Par => 0,
            NamedResult::Bogey => 1,
            NamedResult::DoubleBogey => 2,
            NamedResult::TripleBogey => 3,
            NamedResult::QuadrupleBogey => 4,
        }
    }

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            NamedResult::Eagle => "eagle",
            NamedResult::Birdie => "birdie",
            NamedResult::Par => "par",
            NamedResult::Bogey => "bogey",
            NamedResult::DoubleBogey => "double",
            NamedResult::TripleBogey => "triple",
            NamedResult::QuadrupleBogey => "quad",
        }
    }
}

impl FromStr for NamedResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eagle" => Ok(NamedResult::Eagle),
            "birdie" => Ok(NamedResult::Birdie),
            "par" => Ok(NamedResult::Par),
            "bogey" => Ok(NamedResult::Bogey),
            "double" | "double-bogey" => Ok(NamedResult::DoubleBogey),
            "triple" | "triple-bogey" => Ok(NamedResult::TripleBogey),
            "quad" | "quadruple" | "quadruple-bogey" => Ok(NamedResult::QuadrupleBogey),
            other => Err(format!("Unknown result name: {}", other)),
        }
    }
}

/// One player's score for a hole: raw strokes or a named result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreEntry {
    /// Raw stroke count.
    Strokes(u8),
    /// Named result resolved against par.
    Named(NamedResult),
}

impl ScoreEntry {
    /// Resolve to a stroke count against the given par.
    ///
    /// Returned as `i16` so an out-of-range entry (e.g. a hypothetical
    /// zero-stroke score) survives to validation instead of wrapping.
    pub fn resolve(self, par: u8) -> i16 {
        match self {
            ScoreEntry::Strokes(s) => i16::from(s),
            ScoreEntry::Named(named) => i16::from(par) + named.offset(),
        }
    }
}

impl From<NamedResult> for ScoreEntry {
    fn from(named: NamedResult) -> Self {
        ScoreEntry::Named(named)
    }
}

/// Everything the settlement engine needs to settle one hole.
///
/// `prev_all_tied` is carried state from the previous hole: it is true when
/// every player recorded the identical score there, which doubles the stake
/// on this hole under both multiplier policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleInput {
    /// Par for the hole (3, 4, or 5).
    pub par: u8,
    /// One entry per player; `scores.len()` defines the player count.
    pub scores: Vec<ScoreEntry>,
    /// All-tie flag carried from the previous hole.
    pub prev_all_tied: bool,
    /// Rule configuration in force for this hole.
    pub rules: RuleConfig,
}

impl HoleInput {
    /// Convenience constructor for raw stroke scores.
    pub fn from_strokes(par: u8, strokes: &[u8], prev_all_tied: bool, rules: RuleConfig) -> Self {
        Self {
            par,
            scores: strokes.iter().copied().map(ScoreEntry::Strokes).collect(),
            prev_all_tied,
            rules,
        }
    }
}
