//! Round Ledger
//!
//! Owns the running state of one round: per-player cumulative totals, the
//! carried all-tie flag, and the append-only (but truncatable) history of
//! settled holes. One ledger per round; a host serving several tables
//! instantiates one ledger each, with no shared state between them.
//!
//! # Invariants
//!
//! 1. `cumulative[i]` always equals the sum of `per_player_delta[i]` over
//!    the history.
//! 2. `prev_all_tied` always equals the all-tied flag of the most recent
//!    history entry (false when the history is empty) — including after any
//!    number of undos.
//! 3. Errors never partially apply: a rejected commit leaves the ledger
//!    exactly as it was.
//!
//! The ledger is a flat serde-serializable structure; persisting it across
//! process restarts is the host's business, not ours.

use crate::round::money::Amount;
use crate::round::score::HoleInput;
use crate::round::settlement::HoleResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Holes in a regulation round.
pub const HOLES_PER_ROUND: u32 = 18;

// =============================================================================
// ERRORS
// =============================================================================

/// Ledger operation errors. All leave the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// Committed result does not match the ledger's player count.
    PlayerCountMismatch { expected: usize, actual: usize },
    /// Handicap requested before the round is complete.
    RoundNotComplete { current_hole: u32 },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlayerCountMismatch { expected, actual } => {
                write!(f, "Expected {} players, got {}", expected, actual)
            }
            Self::RoundNotComplete { current_hole } => {
                write!(
                    f,
                    "Handicap unavailable before hole {} is settled (currently on hole {})",
                    HOLES_PER_ROUND, current_hole
                )
            }
        }
    }
}

impl std::error::Error for LedgerError {}

// =============================================================================
// HISTORY ENTRY
// =============================================================================

/// One settled hole as recorded in the ledger history: the input that was
/// settled together with the result it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledHole {
    /// 1-based hole number.
    pub hole: u32,
    pub input: HoleInput,
    pub result: HoleResult,
}

// =============================================================================
// HANDICAP
// =============================================================================

/// Next-round handicap stakes derived from a completed round.
///
/// Total stroke gaps times the base amount, with no bonus, multiplier, or
/// cap — the seed stakes for the following round. Same sign convention as
/// hole settlement: `matrix[i][j]` positive means i owes j.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandicapResult {
    /// Total raw strokes per player over the round.
    pub total_strokes: Vec<u32>,
    /// Pairwise handicap stakes.
    pub matrix: Vec<Vec<Amount>>,
    /// Row sums; positive = owes.
    pub per_player_delta: Vec<Amount>,
}

// =============================================================================
// ROUND LEDGER
// =============================================================================

/// Running state of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundLedger {
    players: usize,
    cumulative: Vec<Amount>,
    prev_all_tied: bool,
    current_hole: u32,
    history: Vec<SettledHole>,
}

impl RoundLedger {
    /// Fresh ledger for `players` players, positioned on hole 1.
    pub fn new(players: usize) -> Self {
        Self {
            players,
            cumulative: vec![0; players],
            prev_all_tied: false,
            current_hole: 1,
            history: Vec::new(),
        }
    }

    pub fn players(&self) -> usize {
        self.players
    }

    /// Cumulative signed totals; positive = owes.
    pub fn cumulative(&self) -> &[Amount] {
        &self.cumulative
    }

    /// All-tie flag to feed into the next hole's input.
    pub fn prev_all_tied(&self) -> bool {
        self.prev_all_tied
    }

    /// 1-based number of the hole to be played next.
    pub fn current_hole(&self) -> u32 {
        self.current_hole
    }

    pub fn history(&self) -> &[SettledHole] {
        &self.history
    }

    /// True once all holes of the round have been settled.
    pub fn round_complete(&self) -> bool {
        self.current_hole > HOLES_PER_ROUND
    }

    /// Commit a settled hole: append to history, add the deltas to the
    /// cumulative totals, carry the all-tie flag, advance the hole counter.
    pub fn commit(&mut self, input: HoleInput, result: HoleResult) -> Result<(), LedgerError> {
        if result.per_player_delta.len() != self.players || input.scores.len() != self.players {
            return Err(LedgerError::PlayerCountMismatch {
                expected: self.players,
                actual: result.per_player_delta.len().max(input.scores.len()),
            });
        }

        for (total, delta) in self.cumulative.iter_mut().zip(&result.per_player_delta) {
            *total += delta;
        }
        self.prev_all_tied = result.all_tied;
        debug!(
            hole = self.current_hole,
            all_tied = result.all_tied,
            multiplier = result.applied_multiplier,
            "hole committed"
        );
        self.history.push(SettledHole {
            hole: self.current_hole,
            input,
            result,
        });
        self.current_hole += 1;
        Ok(())
    }

    /// Revert the most recent commit. Returns false (and does nothing) when
    /// the history is empty.
    ///
    /// The carried all-tie flag is restored from the entry that is now most
    /// recent, not merely cleared — undoing several holes in a row must land
    /// on exactly the state each earlier hole left behind.
    pub fn undo(&mut self) -> bool {
        let Some(last) = self.history.pop() else {
            return false;
        };
        for (total, delta) in self.cumulative.iter_mut().zip(&last.result.per_player_delta) {
            *total -= delta;
        }
        self.current_hole -= 1;
        self.prev_all_tied = self
            .history
            .last()
            .map(|entry| entry.result.all_tied)
            .unwrap_or(false);
        debug!(hole = last.hole, "hole reverted");
        true
    }

    /// Start a new round: zero totals, empty history, hole 1.
    pub fn reset(&mut self) {
        info!(players = self.players, "round reset");
        self.cumulative = vec![0; self.players];
        self.prev_all_tied = false;
        self.current_hole = 1;
        self.history.clear();
    }

    /// Compute next-round handicap stakes from the completed round.
    ///
    /// Read-only; available only once the round is complete. Sums the raw
    /// strokes recorded in history and settles the total gaps at
    /// `base_amount` per stroke, with no bonus, multiplier, or cap.
    pub fn compute_handicap(&self, base_amount: Amount) -> Result<HandicapResult, LedgerError> {
        if !self.round_complete() {
            return Err(LedgerError::RoundNotComplete {
                current_hole: self.current_hole,
            });
        }

        let mut total_strokes = vec![0u32; self.players];
        for entry in &self.history {
            for (total, &strokes) in total_strokes.iter_mut().zip(&entry.result.strokes) {
                *total += u32::from(strokes);
            }
        }

        let n = self.players;
        let mut matrix: Vec<Vec<Amount>> = vec![vec![0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let gap = i64::from(total_strokes[i]) - i64::from(total_strokes[j]);
                let amount = gap * base_amount;
                matrix[i][j] = amount;
                matrix[j][i] = -amount;
            }
        }
        let per_player_delta = matrix.iter().map(|row| row.iter().sum()).collect();

        Ok(HandicapResult {
            total_strokes,
            matrix,
            per_player_delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::rules::RuleConfig;
    use crate::round::settlement::settle_hole;

    #[test]
    fn test_fresh_ledger_state() {
        let ledger = RoundLedger::new(4);
        assert_eq!(ledger.cumulative(), &[0, 0, 0, 0]);
        assert!(!ledger.prev_all_tied());
        assert_eq!(ledger.current_hole(), 1);
        assert!(ledger.history().is_empty());
        assert!(!ledger.round_complete());
    }

    #[test]
    fn test_commit_rejects_player_count_mismatch() {
        let mut ledger = RoundLedger::new(4);
        let input = HoleInput::from_strokes(4, &[4, 5], false, RuleConfig::default());
        let result = settle_hole(&input).unwrap();
        assert_eq!(
            ledger.commit(input, result),
            Err(LedgerError::PlayerCountMismatch {
                expected: 4,
                actual: 2
            })
        );
        // Rejected commit leaves the ledger untouched
        assert_eq!(ledger.current_hole(), 1);
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut ledger = RoundLedger::new(4);
        assert!(!ledger.undo());
        assert_eq!(ledger.current_hole(), 1);
    }
}
