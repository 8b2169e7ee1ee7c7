//! Round Ledger Contract Tests
//!
//! Pin down the ledger lifecycle:
//! 1. Commit accumulates deltas and carries the all-tie flag
//! 2. Undo is an exact inverse, including multi-step tie-flag restoration
//! 3. Reset is idempotent
//! 4. Handicap is gated on round completion and bonus/multiplier-free

use crate::round::ledger::{LedgerError, RoundLedger, HOLES_PER_ROUND};
use crate::round::money::Amount;
use crate::round::rules::RuleConfig;
use crate::round::score::HoleInput;
use crate::round::settlement::settle_hole;

/// Bonus-free, uncapped rules with a small base so expected amounts stay
/// easy to compute by hand.
fn plain_rules(base_amount: Amount) -> RuleConfig {
    RuleConfig {
        base_amount,
        max_amount: None,
        birdie_bonus: false,
        eagle_bonus: false,
        ..RuleConfig::pairwise_standard()
    }
}

/// Settle and commit one hole, returning the committed deltas.
fn play(ledger: &mut RoundLedger, par: u8, strokes: &[u8], rules: RuleConfig) -> Vec<Amount> {
    let input = HoleInput::from_strokes(par, strokes, ledger.prev_all_tied(), rules);
    let result = settle_hole(&input).unwrap();
    let deltas = result.per_player_delta.clone();
    ledger.commit(input, result).unwrap();
    deltas
}

// =============================================================================
// COMMIT
// =============================================================================

#[test]
fn test_commit_accumulates_known_deltas() {
    let mut ledger = RoundLedger::new(4);
    // Par 4, A bogey, B birdie (bonuses off), C and D par, base 2,500:
    // A pays 10,000, B receives 10,000.
    let deltas = play(&mut ledger, 4, &[5, 3, 4, 4], plain_rules(2_500));
    assert_eq!(deltas, vec![10_000, -10_000, 0, 0]);
    assert_eq!(ledger.cumulative(), &[10_000, -10_000, 0, 0]);
    assert_eq!(ledger.current_hole(), 2);
    assert!(!ledger.prev_all_tied());
    assert_eq!(ledger.history().len(), 1);
}

#[test]
fn test_commit_carries_the_all_tie_flag() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[4, 4, 4, 4], plain_rules(5_000));
    assert!(ledger.prev_all_tied());
    assert_eq!(ledger.cumulative(), &[0, 0, 0, 0]);

    // The next hole sees the carried tie and doubles
    let input = HoleInput::from_strokes(4, &[4, 5, 4, 4], ledger.prev_all_tied(), plain_rules(5_000));
    let result = settle_hole(&input).unwrap();
    // Three-way tie AND carried tie: additive count 2 -> quadruple
    assert_eq!(result.applied_multiplier, 4);
    assert_eq!(result.per_player_delta[1], 3 * 20_000);
    ledger.commit(input, result).unwrap();
    assert!(!ledger.prev_all_tied());
}

// =============================================================================
// UNDO
// =============================================================================

#[test]
fn test_undo_is_an_exact_inverse() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[5, 3, 4, 4], plain_rules(2_500));
    let before = ledger.clone();

    play(&mut ledger, 5, &[5, 5, 5, 5], plain_rules(2_500));
    assert!(ledger.undo());
    assert_eq!(ledger, before, "undo must restore the exact pre-commit state");
}

#[test]
fn test_three_commits_two_undos_equals_first_commit_state() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[5, 3, 4, 4], plain_rules(2_500));
    let after_first = ledger.clone();

    play(&mut ledger, 3, &[2, 3, 4, 5], plain_rules(2_500));
    play(&mut ledger, 5, &[5, 5, 5, 5], plain_rules(2_500));
    assert_eq!(ledger.current_hole(), 4);

    assert!(ledger.undo());
    assert!(ledger.undo());
    assert_eq!(ledger, after_first);
    assert_eq!(ledger.cumulative(), &[10_000, -10_000, 0, 0]);
}

#[test]
fn test_undo_restores_tie_flag_from_remaining_history() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[4, 4, 4, 4], plain_rules(5_000)); // all-tie
    play(&mut ledger, 4, &[3, 4, 5, 6], plain_rules(5_000)); // consumes the carry
    assert!(!ledger.prev_all_tied());

    // Undoing the second hole must re-expose the hole-1 tie, not just
    // clear the flag
    assert!(ledger.undo());
    assert!(ledger.prev_all_tied());

    // Undoing down to an empty history clears it
    assert!(ledger.undo());
    assert!(!ledger.prev_all_tied());
    assert_eq!(ledger.current_hole(), 1);
    assert!(!ledger.undo(), "undo on an empty history is a no-op");
}

// =============================================================================
// RESET
// =============================================================================

#[test]
fn test_reset_returns_to_initial_state() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[5, 3, 4, 4], plain_rules(2_500));
    play(&mut ledger, 4, &[4, 4, 4, 4], plain_rules(2_500));
    ledger.reset();
    assert_eq!(ledger, RoundLedger::new(4));
}

#[test]
fn test_reset_is_idempotent() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[5, 3, 4, 4], plain_rules(2_500));
    ledger.reset();
    let once = ledger.clone();
    ledger.reset();
    assert_eq!(ledger, once);
}

// =============================================================================
// HANDICAP
// =============================================================================

#[test]
fn test_handicap_gated_on_round_completion() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[5, 3, 4, 4], plain_rules(2_500));
    assert_eq!(
        ledger.compute_handicap(1_000),
        Err(LedgerError::RoundNotComplete { current_hole: 2 })
    );
}

#[test]
fn test_handicap_totals_and_stakes() {
    let mut ledger = RoundLedger::new(4);
    // 17 identical holes, then one hole that spreads the field
    for _ in 0..(HOLES_PER_ROUND - 1) {
        play(&mut ledger, 4, &[4, 4, 4, 4], plain_rules(5_000));
    }
    play(&mut ledger, 4, &[3, 4, 5, 6], plain_rules(5_000));
    assert!(ledger.round_complete());

    let handicap = ledger.compute_handicap(1_000).unwrap();
    assert_eq!(handicap.total_strokes, vec![71, 72, 73, 74]);

    // Total stroke gap times the base amount, bonus- and multiplier-free:
    // the hole-18 birdie does NOT count double here.
    assert_eq!(handicap.matrix[3][0], 3_000);
    assert_eq!(handicap.matrix[0][3], -3_000);
    assert_eq!(handicap.per_player_delta, vec![-6_000, -2_000, 2_000, 6_000]);
    let total: Amount = handicap.per_player_delta.iter().sum();
    assert_eq!(total, 0);

    // Read-only: the ledger is unchanged afterwards
    assert_eq!(ledger.history().len(), HOLES_PER_ROUND as usize);
}

// =============================================================================
// SERIALIZATION
// =============================================================================

#[test]
fn test_ledger_serde_round_trip() {
    let mut ledger = RoundLedger::new(4);
    play(&mut ledger, 4, &[3, 4, 4, 5], RuleConfig::default());
    play(&mut ledger, 5, &[5, 5, 5, 5], RuleConfig::batch_doubling());

    let json = serde_json::to_string(&ledger).unwrap();
    let restored: RoundLedger = serde_json::from_str(&json).unwrap();
    assert_eq!(ledger, restored);
}
