//! Hole Settlement Engine
//!
//! Pure, total settlement of a single hole: given each player's strokes, the
//! par, the carried all-tie flag, and the rules in force, produce the signed
//! pairwise money matrix and per-player deltas.
//!
//! # Contract
//!
//! - **Sign convention**: `matrix[i][j]` is the amount player i owes player
//!   j, so `matrix[i][j] == -matrix[j][i]` and a positive per-player delta
//!   (the row sum) means that player pays overall.
//! - **Zero-sum**: deltas always sum to zero; money only moves between
//!   players, never in or out of the table.
//! - **Bonus shift**: a birdie shifts its scorer's effective differential by
//!   an extra -1 (the stroke counts double) and an eagle or better by an
//!   extra -2 (the strokes count quadruple), BEFORE any stake multiplier.
//!   Pair gaps are computed from these bonus-adjusted differentials.
//! - **Tie detection** uses the RAW strokes, never the adjusted ones.
//! - **Cap once per pair**: the monetary cap clamps each pair exactly once
//!   (stake or pair total, per `CapMode`), then deltas are summed.
//!
//! An all-tied hole settles to zero with multiplier 1; its only effect is
//! the `all_tied` flag the ledger carries into the next hole.

use crate::round::money::Amount;
use crate::round::rules::{CapMode, MultiplierPolicy, RuleConfig, SettlementMode};
use crate::round::score::{HoleInput, MAX_PAR, MIN_PAR};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

/// Settlement rejection. Every variant is a caller-correctable input or
/// configuration problem; the engine has no other failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementError {
    /// Par outside {3, 4, 5}.
    InvalidPar { par: u8 },
    /// Fewer than two players.
    TooFewPlayers { players: usize },
    /// A resolved stroke count below 1.
    InvalidStrokes { player: usize, strokes: i16 },
    /// Base stake must be positive.
    NonPositiveBase { base_amount: Amount },
    /// Monetary cap must be non-negative when present.
    NegativeCap { max_amount: Amount },
}

impl SettlementError {
    /// True for configuration problems (as opposed to score-input problems).
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::NonPositiveBase { .. } | Self::NegativeCap { .. }
        )
    }
}

impl std::fmt::Display for SettlementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPar { par } => {
                write!(f, "Par must be between {} and {}, got {}", MIN_PAR, MAX_PAR, par)
            }
            Self::TooFewPlayers { players } => {
                write!(f, "At least two players required, got {}", players)
            }
            Self::InvalidStrokes { player, strokes } => {
                write!(f, "Player {} resolved to {} strokes (minimum 1)", player, strokes)
            }
            Self::NonPositiveBase { base_amount } => {
                write!(f, "Base amount must be positive, got {}", base_amount)
            }
            Self::NegativeCap { max_amount } => {
                write!(f, "Max amount must be non-negative, got {}", max_amount)
            }
        }
    }
}

impl std::error::Error for SettlementError {}

// =============================================================================
// TIE CONDITIONS
// =============================================================================

/// Tie conditions detected from the raw strokes of one hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieConditions {
    /// Some stroke value is shared by three or more players.
    pub tie_three_or_more: bool,
    /// Every player recorded the identical stroke count.
    pub all_tied: bool,
}

/// Detect tie conditions from raw strokes.
pub fn detect_tie_conditions(strokes: &[u8]) -> TieConditions {
    let all_tied = strokes.windows(2).all(|w| w[0] == w[1]);
    let tie_three_or_more = strokes
        .iter()
        .any(|s| strokes.iter().filter(|t| *t == s).count() >= 3);
    TieConditions {
        tie_three_or_more,
        all_tied,
    }
}

// =============================================================================
// BONUS-ADJUSTED DIFFERENTIALS
// =============================================================================

/// Bonus-adjusted differential for one player.
///
/// Raw differential is `strokes - par`; an enabled birdie bonus shifts it by
/// an extra -1, an enabled eagle bonus by an extra -2. Disabled bonuses
/// leave the raw differential untouched.
pub fn bonus_adjusted_diff(strokes: u8, par: u8, rules: &RuleConfig) -> i64 {
    let raw = i64::from(strokes) - i64::from(par);
    if raw == -1 && rules.birdie_bonus {
        raw - 1
    } else if raw <= -2 && rules.eagle_bonus {
        raw - 2
    } else {
        raw
    }
}

/// Number of personal bonus conditions a score triggers (birdie = 1,
/// eagle or better = 2), honoring the enable toggles.
pub fn personal_bonus_count(strokes: u8, par: u8, rules: &RuleConfig) -> u32 {
    let raw = i64::from(strokes) - i64::from(par);
    if raw == -1 && rules.birdie_bonus {
        1
    } else if raw <= -2 && rules.eagle_bonus {
        2
    } else {
        0
    }
}

// =============================================================================
// MULTIPLIER RESOLUTION
// =============================================================================

/// Resolve the stake multiplier for one pair (or the whole hole in
/// flat-stake mode) from the triggered conditions.
///
/// The two policies are NOT equivalent and must never be unified: additive
/// doubling saturates at 4x, while the batch policy doubles independently
/// per hole-wide condition and reaches 8x.
pub fn resolve_multiplier(
    tie_three_or_more: bool,
    prev_all_tied: bool,
    any_bonus: bool,
    personal_bonus_count: u32,
    rules: &RuleConfig,
) -> u32 {
    match rules.multiplier_policy {
        MultiplierPolicy::AdditiveDoubling => {
            let count = personal_bonus_count
                + u32::from(tie_three_or_more)
                + u32::from(prev_all_tied);
            // Saturate the shift before it can overflow, then cap at 4x.
            2u32.saturating_pow(count).min(4)
        }
        MultiplierPolicy::MultiplicativeBatch => {
            let mut multiplier = 1;
            if tie_three_or_more {
                multiplier *= 2;
            }
            if prev_all_tied {
                multiplier *= 2;
            }
            if any_bonus {
                multiplier *= 2;
            }
            multiplier
        }
    }
}

// =============================================================================
// AUDIT TRIGGERS
// =============================================================================

/// One triggered condition, recorded for explanation and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Player scored a birdie with the birdie bonus enabled.
    BirdieBonus { player: usize },
    /// Player scored an eagle or better with the eagle bonus enabled.
    EagleBonus { player: usize },
    /// A stroke value was shared by three or more players.
    ThreeWayTie { strokes: u8, players: usize },
    /// The previous hole was an all-tie; this hole's stake is doubled.
    CarriedTie,
    /// Batch policy: some birdie/eagle this hole doubled the whole stake.
    BonusBatch,
    /// The monetary cap clamped a pair's settlement.
    StakeCapped {
        payer: usize,
        payee: usize,
        uncapped: Amount,
        capped: Amount,
    },
    /// Every player tied; no money changes hands.
    AllTied,
}

// =============================================================================
// HOLE RESULT
// =============================================================================

/// Settled outcome of one hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleResult {
    /// Par the hole was played to.
    pub par: u8,
    /// Resolved raw strokes per player (kept for display and handicap).
    pub strokes: Vec<u8>,
    /// Signed per-player total; positive = owes, negative = receives.
    /// Always the row sum of `matrix` and always zero-sum.
    pub per_player_delta: Vec<Amount>,
    /// `matrix[i][j]` = amount i owes j; antisymmetric, zero diagonal.
    pub matrix: Vec<Vec<Amount>>,
    /// Every player recorded the identical score. Seeds the next hole's
    /// `prev_all_tied`.
    pub all_tied: bool,
    /// Largest stake multiplier applied to any pair this hole.
    pub applied_multiplier: u32,
    /// Structured audit of every triggered condition.
    pub triggers: Vec<Trigger>,
}

impl HoleResult {
    fn zero(par: u8, strokes: Vec<u8>, triggers: Vec<Trigger>) -> Self {
        let n = strokes.len();
        Self {
            par,
            strokes,
            per_player_delta: vec![0; n],
            matrix: vec![vec![0; n]; n],
            all_tied: true,
            applied_multiplier: 1,
            triggers,
        }
    }
}

// =============================================================================
// SETTLEMENT
// =============================================================================

/// Settle one hole.
///
/// Pure and total apart from input/config validation: identical input always
/// produces the identical result, and errors leave no state behind (there is
/// none to leave).
pub fn settle_hole(input: &HoleInput) -> Result<HoleResult, SettlementError> {
    input.rules.validate()?;

    if !(MIN_PAR..=MAX_PAR).contains(&input.par) {
        return Err(SettlementError::InvalidPar { par: input.par });
    }
    if input.scores.len() < 2 {
        return Err(SettlementError::TooFewPlayers {
            players: input.scores.len(),
        });
    }

    let mut strokes = Vec::with_capacity(input.scores.len());
    for (player, entry) in input.scores.iter().enumerate() {
        let resolved = entry.resolve(input.par);
        if resolved < 1 {
            return Err(SettlementError::InvalidStrokes {
                player,
                strokes: resolved,
            });
        }
        strokes.push(resolved as u8);
    }

    let n = strokes.len();
    let rules = &input.rules;
    let ties = detect_tie_conditions(&strokes);

    if ties.all_tied {
        return Ok(HoleResult::zero(input.par, strokes, vec![Trigger::AllTied]));
    }

    let adjusted: Vec<i64> = strokes
        .iter()
        .map(|&s| bonus_adjusted_diff(s, input.par, rules))
        .collect();
    let bonus: Vec<u32> = strokes
        .iter()
        .map(|&s| personal_bonus_count(s, input.par, rules))
        .collect();
    let any_bonus = bonus.iter().any(|&b| b > 0);

    let mut triggers = Vec::new();
    for (player, &count) in bonus.iter().enumerate() {
        match count {
            1 => triggers.push(Trigger::BirdieBonus { player }),
            2 => triggers.push(Trigger::EagleBonus { player }),
            _ => {}
        }
    }
    if ties.tie_three_or_more {
        // Record each stroke value shared by three or more players once.
        let mut seen = Vec::new();
        for &value in &strokes {
            let count = strokes.iter().filter(|&&s| s == value).count();
            if count >= 3 && !seen.contains(&value) {
                seen.push(value);
                triggers.push(Trigger::ThreeWayTie {
                    strokes: value,
                    players: count,
                });
            }
        }
    }
    if input.prev_all_tied {
        triggers.push(Trigger::CarriedTie);
    }
    if any_bonus && rules.multiplier_policy == MultiplierPolicy::MultiplicativeBatch {
        triggers.push(Trigger::BonusBatch);
    }

    // Hole-wide personal count for flat-stake mode: the strongest personal
    // bonus at the table sets the shared stake.
    let flat_personal = bonus.iter().copied().max().unwrap_or(0);

    let mut matrix: Vec<Vec<Amount>> = vec![vec![0; n]; n];
    let mut applied_multiplier = 1u32;

    for i in 0..n {
        for j in (i + 1)..n {
            let personal = match rules.settlement_mode {
                SettlementMode::Pairwise => bonus[i] + bonus[j],
                SettlementMode::FlatStake => flat_personal,
            };
            let multiplier = resolve_multiplier(
                ties.tie_three_or_more,
                input.prev_all_tied,
                any_bonus,
                personal,
                rules,
            );
            applied_multiplier = applied_multiplier.max(multiplier);

            let uncapped_stake = rules.base_amount * Amount::from(multiplier);
            let stake = match (rules.cap_mode, rules.max_amount) {
                (CapMode::PerStroke, Some(max)) => uncapped_stake.min(max),
                _ => uncapped_stake,
            };

            let gap = adjusted[i] - adjusted[j];
            let uncapped_amount = gap * uncapped_stake;
            let mut amount = gap * stake;
            if let (CapMode::PerPair, Some(max)) = (rules.cap_mode, rules.max_amount) {
                amount = amount.clamp(-max, max);
            }

            if amount != uncapped_amount {
                let (payer, payee) = if uncapped_amount > 0 { (i, j) } else { (j, i) };
                triggers.push(Trigger::StakeCapped {
                    payer,
                    payee,
                    uncapped: uncapped_amount.abs(),
                    capped: amount.abs(),
                });
            }

            matrix[i][j] = amount;
            matrix[j][i] = -amount;
        }
    }

    let per_player_delta: Vec<Amount> = matrix.iter().map(|row| row.iter().sum()).collect();

    Ok(HoleResult {
        par: input.par,
        strokes,
        per_player_delta,
        matrix,
        all_tied: false,
        applied_multiplier,
        triggers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_shift_doubles_birdie_quadruples_eagle() {
        let rules = RuleConfig::default();
        assert_eq!(bonus_adjusted_diff(3, 4, &rules), -2); // birdie: -1 -> -2
        assert_eq!(bonus_adjusted_diff(2, 4, &rules), -4); // eagle: -2 -> -4
        assert_eq!(bonus_adjusted_diff(5, 4, &rules), 1); // bogey untouched
        let no_bonus = RuleConfig {
            birdie_bonus: false,
            eagle_bonus: false,
            ..RuleConfig::default()
        };
        assert_eq!(bonus_adjusted_diff(3, 4, &no_bonus), -1);
        assert_eq!(bonus_adjusted_diff(2, 4, &no_bonus), -2);
    }

    #[test]
    fn test_tie_detection_uses_raw_scores() {
        let ties = detect_tie_conditions(&[4, 4, 4, 5]);
        assert!(ties.tie_three_or_more);
        assert!(!ties.all_tied);

        let ties = detect_tie_conditions(&[4, 4, 4, 4]);
        assert!(ties.tie_three_or_more);
        assert!(ties.all_tied);

        let ties = detect_tie_conditions(&[3, 4, 4, 5]);
        assert!(!ties.tie_three_or_more);
        assert!(!ties.all_tied);
    }

    #[test]
    fn test_additive_policy_saturates_at_quadruple() {
        let rules = RuleConfig {
            multiplier_policy: MultiplierPolicy::AdditiveDoubling,
            ..RuleConfig::default()
        };
        assert_eq!(resolve_multiplier(false, false, false, 0, &rules), 1);
        assert_eq!(resolve_multiplier(true, false, false, 0, &rules), 2);
        assert_eq!(resolve_multiplier(true, true, false, 0, &rules), 4);
        // Eagle + tie + carry would be 2^4 = 16 uncapped; saturates at 4
        assert_eq!(resolve_multiplier(true, true, true, 2, &rules), 4);
    }

    #[test]
    fn test_batch_policy_reaches_eight() {
        let rules = RuleConfig {
            multiplier_policy: MultiplierPolicy::MultiplicativeBatch,
            ..RuleConfig::default()
        };
        assert_eq!(resolve_multiplier(false, false, false, 0, &rules), 1);
        assert_eq!(resolve_multiplier(true, false, true, 0, &rules), 4);
        assert_eq!(resolve_multiplier(true, true, true, 0, &rules), 8);
        // Personal counts are irrelevant to the batch policy
        assert_eq!(resolve_multiplier(false, false, false, 2, &rules), 1);
    }

    #[test]
    fn test_invalid_par_rejected() {
        let input = HoleInput::from_strokes(6, &[4, 4, 4, 5], false, RuleConfig::default());
        assert_eq!(
            settle_hole(&input),
            Err(SettlementError::InvalidPar { par: 6 })
        );
    }

    #[test]
    fn test_single_player_rejected() {
        let input = HoleInput::from_strokes(4, &[4], false, RuleConfig::default());
        assert_eq!(
            settle_hole(&input),
            Err(SettlementError::TooFewPlayers { players: 1 })
        );
    }

    #[test]
    fn test_zero_strokes_rejected() {
        let input = HoleInput::from_strokes(4, &[0, 4, 4, 5], false, RuleConfig::default());
        assert_eq!(
            settle_hole(&input),
            Err(SettlementError::InvalidStrokes {
                player: 0,
                strokes: 0
            })
        );
    }
}
