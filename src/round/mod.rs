//! Golf Wagering Settlement
//!
//! Deterministic settlement engine for a four-player (generalizing to n >= 2)
//! per-hole golf wager, plus the round ledger that carries state between
//! holes.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │            Host             │
//!                    │ (CLI / any presentation UI) │
//!                    └──────┬───────────────┬──────┘
//!                HoleInput  │               │ commit / undo / reset
//!                           ▼               ▼
//!                ┌────────────────┐   ┌─────────────┐
//!                │  settle_hole   │──▶│ RoundLedger │
//!                │ (pure, total)  │   │  (stateful) │
//!                └────────────────┘   └─────────────┘
//!                           │               │
//!                      HoleResult      cumulative totals,
//!                   (matrix, deltas,   carried tie flag,
//!                    audit triggers)   history, handicap
//! ```
//!
//! # Determinism Guarantees
//!
//! - Settlement is a pure function of `HoleInput`; no clock, no RNG, no I/O.
//! - All money arithmetic is integer (whole won); every hole settles exactly
//!   zero-sum.
//! - The ledger is mutated only by `commit`, `undo`, and `reset`, each of
//!   which either fully applies or leaves the state untouched.

pub mod ledger;
pub mod money;
pub mod rules;
pub mod score;
pub mod settlement;

#[cfg(test)]
mod ledger_tests;

// Re-exports for convenience
pub use ledger::{
    HandicapResult, LedgerError, RoundLedger, SettledHole, HOLES_PER_ROUND,
};
pub use money::{format_won, Amount, Flow};
pub use rules::{CapMode, MultiplierPolicy, RuleConfig, RulesFileError, SettlementMode};
pub use score::{HoleInput, NamedResult, ScoreEntry, MAX_PAR, MIN_PAR};
pub use settlement::{
    bonus_adjusted_diff, detect_tie_conditions, personal_bonus_count, resolve_multiplier,
    settle_hole, HoleResult, SettlementError, TieConditions, Trigger,
};
