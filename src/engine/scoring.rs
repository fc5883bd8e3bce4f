//! Profit-score policy.
//!
//! Holds the delta table that maps (category, outcome) to a fixed score
//! adjustment, plus the two comparison evaluators that turn raw quotation
//! and build-vs-buy figures into an `Outcome`.
//!
//! Default table:
//!
//! | Category          | Favorable | Unfavorable |
//! |-------------------|-----------|-------------|
//! | MarketSelection   | +10       | -10         |
//! | BuildVsBuy        | +10       | -5          |
//! | InventoryRisk     | none      | none        |
//! | CapitalAllocation | none      | none        |

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{DecisionCategory, LedgerError, Outcome, MAX_PROFIT_SCORE, MIN_PROFIT_SCORE};

// ---------------------------------------------------------------------------
// Delta table
// ---------------------------------------------------------------------------

/// Score adjustment applied for each outcome of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScoreDelta {
    pub favorable: i32,
    pub unfavorable: i32,
}

impl ScoreDelta {
    pub const fn new(favorable: i32, unfavorable: i32) -> Self {
        Self { favorable, unfavorable }
    }

    pub fn for_outcome(&self, outcome: Outcome) -> i32 {
        match outcome {
            Outcome::Favorable => self.favorable,
            Outcome::Unfavorable => self.unfavorable,
        }
    }
}

/// Configurable scoring policy. Loaded from the `[scoring]` config table;
/// any missing key falls back to the default table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub market_selection: ScoreDelta,
    pub build_vs_buy: ScoreDelta,
    /// Inventory-risk notes are informational unless a delta is set here.
    pub inventory_risk: Option<ScoreDelta>,
    /// Minimum vendor quality rating (1–5) for a quotation to count as favorable.
    pub quality_threshold: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            market_selection: ScoreDelta::new(10, -10),
            build_vs_buy: ScoreDelta::new(10, -5),
            inventory_risk: None,
            quality_threshold: 3,
        }
    }
}

impl ScoringPolicy {
    /// Score delta for a decision. Categories without a configured delta
    /// leave the score unchanged.
    pub fn delta(&self, category: DecisionCategory, outcome: Outcome) -> i32 {
        match category {
            DecisionCategory::MarketSelection => self.market_selection.for_outcome(outcome),
            DecisionCategory::BuildVsBuy => self.build_vs_buy.for_outcome(outcome),
            DecisionCategory::InventoryRisk => self
                .inventory_risk
                .map(|d| d.for_outcome(outcome))
                .unwrap_or(0),
            DecisionCategory::CapitalAllocation => 0,
        }
    }
}

/// Apply a delta and clamp into the valid score range.
pub fn clamp_score(score: i32, delta: i32) -> i32 {
    score.saturating_add(delta).clamp(MIN_PROFIT_SCORE, MAX_PROFIT_SCORE)
}

// ---------------------------------------------------------------------------
// Evaluators
// ---------------------------------------------------------------------------

/// A vendor quotation compared against the market benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationComparison {
    pub market_rate: Decimal,
    pub vendor_rate: Decimal,
    /// Optional 1–5 quality rating; `None` skips the quality gate.
    pub quality_rating: Option<u8>,
}

/// Valid quality ratings.
pub const QUALITY_RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

impl QuotationComparison {
    /// Reject a rating outside 1..=5.
    pub fn validate(&self) -> Result<(), LedgerError> {
        match self.quality_rating {
            Some(q) if !QUALITY_RATING_RANGE.contains(&q) => Err(LedgerError::InvalidRating(q)),
            _ => Ok(()),
        }
    }

    /// Favorable when the vendor undercuts the market and, if rated,
    /// meets the policy's quality threshold.
    pub fn outcome(&self, policy: &ScoringPolicy) -> Outcome {
        let cheaper = self.vendor_rate < self.market_rate;
        let quality_ok = self
            .quality_rating
            .map_or(true, |q| q >= policy.quality_threshold);
        Outcome::from_favorable(cheaper && quality_ok)
    }

    /// Market rate minus vendor rate (negative when overpriced).
    pub fn saving(&self) -> Decimal {
        self.market_rate - self.vendor_rate
    }
}

/// In-house production cost compared against the ready-made market price.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildVsBuyComparison {
    pub in_house_cost: Decimal,
    pub market_price: Decimal,
}

impl BuildVsBuyComparison {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_favorable(self.in_house_cost < self.market_price)
    }

    pub fn saving(&self) -> Decimal {
        self.market_price - self.in_house_cost
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_table() {
        let p = ScoringPolicy::default();
        assert_eq!(p.delta(DecisionCategory::MarketSelection, Outcome::Favorable), 10);
        assert_eq!(p.delta(DecisionCategory::MarketSelection, Outcome::Unfavorable), -10);
        assert_eq!(p.delta(DecisionCategory::BuildVsBuy, Outcome::Favorable), 10);
        assert_eq!(p.delta(DecisionCategory::BuildVsBuy, Outcome::Unfavorable), -5);
        assert_eq!(p.delta(DecisionCategory::InventoryRisk, Outcome::Unfavorable), 0);
        assert_eq!(p.delta(DecisionCategory::CapitalAllocation, Outcome::Favorable), 0);
    }

    #[test]
    fn test_inventory_risk_hook() {
        let p = ScoringPolicy {
            inventory_risk: Some(ScoreDelta::new(5, -15)),
            ..ScoringPolicy::default()
        };
        assert_eq!(p.delta(DecisionCategory::InventoryRisk, Outcome::Favorable), 5);
        assert_eq!(p.delta(DecisionCategory::InventoryRisk, Outcome::Unfavorable), -15);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(195, 10), 200);
        assert_eq!(clamp_score(5, -10), 0);
        assert_eq!(clamp_score(100, 15), 115);
        assert_eq!(clamp_score(i32::MAX, 10), 200);
    }

    #[test]
    fn test_policy_from_partial_toml() {
        let p: ScoringPolicy = toml::from_str(
            r#"
            quality_threshold = 4
            [market_selection]
            favorable = 15
            unfavorable = -10
            "#,
        )
        .unwrap();
        assert_eq!(p.market_selection, ScoreDelta::new(15, -10));
        assert_eq!(p.build_vs_buy, ScoreDelta::new(10, -5));
        assert_eq!(p.quality_threshold, 4);
        assert!(p.inventory_risk.is_none());
    }

    #[test]
    fn test_quotation_cheaper_is_favorable() {
        let q = QuotationComparison {
            market_rate: dec!(100),
            vendor_rate: dec!(90),
            quality_rating: None,
        };
        assert_eq!(q.outcome(&ScoringPolicy::default()), Outcome::Favorable);
        assert_eq!(q.saving(), dec!(10));
    }

    #[test]
    fn test_quotation_equal_price_is_unfavorable() {
        let q = QuotationComparison {
            market_rate: dec!(100),
            vendor_rate: dec!(100),
            quality_rating: None,
        };
        assert_eq!(q.outcome(&ScoringPolicy::default()), Outcome::Unfavorable);
    }

    #[test]
    fn test_quotation_low_quality_is_unfavorable() {
        let policy = ScoringPolicy::default();
        let mut q = QuotationComparison {
            market_rate: dec!(100),
            vendor_rate: dec!(80),
            quality_rating: Some(2),
        };
        assert_eq!(q.outcome(&policy), Outcome::Unfavorable);
        q.quality_rating = Some(3);
        assert_eq!(q.outcome(&policy), Outcome::Favorable);
    }

    #[test]
    fn test_build_vs_buy() {
        let cheaper = BuildVsBuyComparison { in_house_cost: dec!(700), market_price: dec!(1000) };
        assert_eq!(cheaper.outcome(), Outcome::Favorable);
        assert_eq!(cheaper.saving(), dec!(300));

        let dearer = BuildVsBuyComparison { in_house_cost: dec!(1200), market_price: dec!(1000) };
        assert_eq!(dearer.outcome(), Outcome::Unfavorable);
    }

    #[test]
    fn test_quotation_rating_range() {
        let rated = |q| QuotationComparison {
            market_rate: dec!(100),
            vendor_rate: dec!(90),
            quality_rating: Some(q),
        };
        assert!(rated(1).validate().is_ok());
        assert!(rated(5).validate().is_ok());
        assert_eq!(rated(0).validate(), Err(LedgerError::InvalidRating(0)));
        assert_eq!(rated(9).validate(), Err(LedgerError::InvalidRating(9)));

        let unrated = QuotationComparison { quality_rating: None, ..rated(3) };
        assert!(unrated.validate().is_ok());
    }
}
