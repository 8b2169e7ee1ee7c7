//! Golfbet Backend Library
//!
//! Settlement core for a per-hole golf wager: the pure hole settlement
//! engine and the round ledger. The binary provides an interactive host;
//! any other presentation layer can drive the same entry points.

pub mod round;

// Re-export the primary entry points at the crate root
pub use round::{settle_hole, HoleInput, HoleResult, RoundLedger, RuleConfig};
