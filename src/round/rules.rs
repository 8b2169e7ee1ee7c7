//! Rule Configuration
//!
//! Every observed table plays a variant of the same wager: a base stake per
//! stroke of difference, doubled by trigger conditions (birdie/eagle, a
//! three-or-more-way tie, a carried all-tie hole), bounded by an optional
//! monetary cap. The variants differ in three orthogonal choices, each
//! modeled as an explicit enum rather than scattered flags:
//!
//! - **Multiplier policy** — how trigger conditions combine into a stake
//!   multiplier (capped additive doubling vs. uncapped multiplicative batch).
//! - **Settlement mode** — whether each pair's stake reflects that pair's own
//!   bonuses or one hole-wide stake applies to every pair.
//! - **Cap granularity** — whether the cap clamps the per-stroke stake or the
//!   per-pair total.
//!
//! Configuration is immutable per hole: the host hands a fresh copy to the
//! engine with every `HoleInput`. Presets for the observed variants are
//! provided as named constructors; a TOML preset file can override any
//! subset of fields.

use crate::round::money::Amount;
use crate::round::settlement::SettlementError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How trigger conditions combine into a stake multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierPolicy {
    /// Count triggered conditions (personal bonus count + three-way tie +
    /// carried tie) and double per condition, saturating at quadruple:
    /// `min(2^count, 4)`.
    AdditiveDoubling,
    /// Multiply by 2 independently for each hole-wide condition (three-way
    /// tie, carried tie, any birdie/eagle this hole). Reaches 8; only a
    /// monetary cap bounds it.
    MultiplicativeBatch,
}

/// How stakes are assigned across player pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// Each pair's stake reflects that pair's own bonus conditions.
    Pairwise,
    /// One hole-wide stake applies uniformly to every pair.
    FlatStake,
}

/// What the monetary cap clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapMode {
    /// Clamp the per-stroke stake before it is multiplied by the gap.
    PerStroke,
    /// Clamp each pair's settled total.
    PerPair,
}

/// Complete rule configuration for one hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Stake per stroke of difference, before multipliers. Must be positive.
    pub base_amount: Amount,
    /// Optional monetary cap; interpretation depends on `cap_mode`.
    /// `None` disables the cap entirely.
    pub max_amount: Option<Amount>,
    /// Birdie doubles the scorer's stroke value when enabled.
    pub birdie_bonus: bool,
    /// Eagle (or better) quadruples the scorer's stroke value when enabled.
    pub eagle_bonus: bool,
    /// How trigger conditions combine into a multiplier.
    pub multiplier_policy: MultiplierPolicy,
    /// Per-pair or hole-wide stakes.
    pub settlement_mode: SettlementMode,
    /// Cap granularity.
    pub cap_mode: CapMode,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::classic_flat()
    }
}

impl RuleConfig {
    /// The classic table rules: additive doubling saturating at quadruple,
    /// one hole-wide stake, per-stroke cap, base 5,000 capped at 20,000.
    pub fn classic_flat() -> Self {
        Self {
            base_amount: 5_000,
            max_amount: Some(20_000),
            birdie_bonus: true,
            eagle_bonus: true,
            multiplier_policy: MultiplierPolicy::AdditiveDoubling,
            settlement_mode: SettlementMode::FlatStake,
            cap_mode: CapMode::PerStroke,
        }
    }

    /// Pairwise variant of the classic rules: each pair's stake reflects the
    /// pair's own birdie/eagle bonuses.
    pub fn pairwise_standard() -> Self {
        Self {
            settlement_mode: SettlementMode::Pairwise,
            ..Self::classic_flat()
        }
    }

    /// Batch-doubling variant: hole-wide conditions each double the stake
    /// multiplicatively (up to 8x), with the cap applied per pair total.
    pub fn batch_doubling() -> Self {
        Self {
            multiplier_policy: MultiplierPolicy::MultiplicativeBatch,
            settlement_mode: SettlementMode::Pairwise,
            cap_mode: CapMode::PerPair,
            ..Self::classic_flat()
        }
    }

    /// Validate the configuration. Called by the engine before settling.
    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.base_amount <= 0 {
            return Err(SettlementError::NonPositiveBase {
                base_amount: self.base_amount,
            });
        }
        if let Some(max) = self.max_amount {
            if max < 0 {
                return Err(SettlementError::NegativeCap { max_amount: max });
            }
        }
        Ok(())
    }

    /// Parse a (possibly partial) TOML preset; unspecified fields fall back
    /// to the defaults. The result is validated before it is returned.
    pub fn from_toml_str(text: &str) -> Result<Self, RulesFileError> {
        let config: Self = toml::from_str(text).map_err(|e| RulesFileError::Parse {
            detail: e.to_string(),
        })?;
        config.validate().map_err(RulesFileError::Invalid)?;
        Ok(config)
    }

    /// Load a preset from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, RulesFileError> {
        let text = std::fs::read_to_string(path).map_err(|e| RulesFileError::Read {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// One-line human summary of the rules in force.
    pub fn summary(&self) -> String {
        let cap = match self.max_amount {
            Some(max) => format!(
                "{} {}",
                crate::round::money::format_won(max),
                match self.cap_mode {
                    CapMode::PerStroke => "per stroke",
                    CapMode::PerPair => "per pair",
                }
            ),
            None => "none".to_string(),
        };
        format!(
            "base {} | cap {} | birdie {} | eagle {} | {:?} | {:?}",
            crate::round::money::format_won(self.base_amount),
            cap,
            if self.birdie_bonus { "on" } else { "off" },
            if self.eagle_bonus { "on" } else { "off" },
            self.multiplier_policy,
            self.settlement_mode,
        )
    }
}

/// Errors loading a rule preset file.
#[derive(Debug, Clone)]
pub enum RulesFileError {
    /// The file could not be read.
    Read { path: String, detail: String },
    /// The file is not valid TOML for a rule configuration.
    Parse { detail: String },
    /// The file parsed but the configuration is rejected by validation.
    Invalid(SettlementError),
}

impl std::fmt::Display for RulesFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, detail } => write!(f, "Cannot read rules file {}: {}", path, detail),
            Self::Parse { detail } => write!(f, "Cannot parse rules file: {}", detail),
            Self::Invalid(err) => write!(f, "Rules file rejected: {}", err),
        }
    }
}

impl std::error::Error for RulesFileError {}
