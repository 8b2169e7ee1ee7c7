//! Currency Representation
//!
//! All settlement arithmetic uses whole currency units (won) as signed
//! integers. There are no fractional stakes anywhere in the rules, so no
//! fixed-point scale is needed; integer arithmetic keeps every settlement
//! deterministic and exactly zero-sum.

use serde::{Deserialize, Serialize};

/// Whole currency units (won). Positive amounts are owed, negative amounts
/// are received; the direction is fixed per field by its owner's docs.
pub type Amount = i64;

/// Signed direction of a settled amount from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    /// The player pays this amount.
    Pays,
    /// The player receives this amount.
    Receives,
    /// Nothing changes hands.
    Even,
}

impl Flow {
    /// Classify a per-player delta (positive = owes).
    pub fn of(delta: Amount) -> Self {
        match delta.cmp(&0) {
            std::cmp::Ordering::Greater => Flow::Pays,
            std::cmp::Ordering::Less => Flow::Receives,
            std::cmp::Ordering::Equal => Flow::Even,
        }
    }
}

/// Format an amount with thousands separators, e.g. `12,000`.
/// Used for display only; never parsed back.
pub fn format_won(amount: Amount) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_won_grouping() {
        assert_eq!(format_won(0), "0");
        assert_eq!(format_won(5000), "5,000");
        assert_eq!(format_won(20000), "20,000");
        assert_eq!(format_won(1234567), "1,234,567");
        assert_eq!(format_won(-70000), "-70,000");
    }

    #[test]
    fn test_flow_classification() {
        assert_eq!(Flow::of(15000), Flow::Pays);
        assert_eq!(Flow::of(-70000), Flow::Receives);
        assert_eq!(Flow::of(0), Flow::Even);
    }
}
