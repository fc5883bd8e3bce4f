//! Ledger engine: capital lock, spend allocation, and scored decisions.
//!
//! Owns one `InstitutionSession` and applies every mutation atomically:
//! all preconditions are checked before anything is written, so a failed
//! call leaves spend, records, and scores exactly as they were.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::scoring::{
    clamp_score, BuildVsBuyComparison, QuotationComparison, ScoringPolicy,
};
use crate::engine::summary::{self, DashboardView};
use crate::storage::snapshot::Snapshot;
use crate::types::{
    DecisionCategory, DecisionRecord, InstitutionSession, LedgerError, Outcome, Sector,
    MAX_CAPITAL,
};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Result of a committed spend allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendReceipt {
    pub sector: Sector,
    pub amount: Decimal,
    pub sector_spent: Decimal,
    pub remaining_capital: Decimal,
}

/// Result of a committed scored decision, for immediate display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredDecision {
    pub sector: Sector,
    pub category: DecisionCategory,
    pub outcome: Outcome,
    /// Score change actually applied after clamping.
    pub applied_delta: i32,
    pub profit_score: i32,
    pub remaining_capital: Decimal,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The ledger & scoring engine for one institution session.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    session: InstitutionSession,
    policy: ScoringPolicy,
}

impl LedgerEngine {
    pub fn new(institution_name: &str, policy: ScoringPolicy) -> Self {
        Self {
            session: InstitutionSession::new(institution_name),
            policy,
        }
    }

    pub fn session(&self) -> &InstitutionSession {
        &self.session
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn is_locked(&self) -> bool {
        self.session.capital_locked
    }

    /// `total_capital - sum(spent)`, recomputed from the ledgers on every call.
    pub fn remaining_capital(&self) -> Decimal {
        self.session.total_capital - self.session.sectors.total_spent()
    }

    /// Fix the session's total capital. One-shot.
    pub fn lock_capital(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.session.capital_locked {
            warn!(institution = %self.session.institution_name, "Capital lock rejected: already locked");
            return Err(LedgerError::AlreadyLocked);
        }
        if amount <= Decimal::ZERO || amount > MAX_CAPITAL {
            warn!(capital = %amount, "Capital lock rejected: out of range");
            return Err(LedgerError::InvalidAmount(amount));
        }

        self.session.total_capital = amount;
        self.session.capital_locked = true;

        info!(
            institution = %self.session.institution_name,
            capital = %amount,
            "Capital locked"
        );
        Ok(())
    }

    /// Spend from the global pool on behalf of one sector.
    pub fn allocate_spend(
        &mut self,
        sector: Sector,
        amount: Decimal,
        label: &str,
    ) -> Result<SpendReceipt, LedgerError> {
        self.check_spend(sector, amount)?;

        let ledger = self.session.sectors.get_mut(sector);
        ledger.spent += amount;
        ledger.records.push(DecisionRecord::new(
            DecisionCategory::CapitalAllocation,
            label,
            amount,
            "",
        ));
        let sector_spent = ledger.spent;
        let remaining_capital = self.remaining_capital();

        info!(
            sector = %sector,
            label,
            amount = %amount,
            remaining = %remaining_capital,
            "Spend allocated"
        );

        Ok(SpendReceipt {
            sector,
            amount,
            sector_spent,
            remaining_capital,
        })
    }

    /// Record a decision, spend its amount (if any), and move the sector's
    /// profit score by the policy delta for `(category, outcome)`.
    pub fn apply_scored_decision(
        &mut self,
        sector: Sector,
        category: DecisionCategory,
        amount: Decimal,
        outcome: Outcome,
        label: &str,
        notes: &str,
    ) -> Result<ScoredDecision, LedgerError> {
        self.check_spend(sector, amount)?;

        let delta = self.policy.delta(category, outcome);
        let ledger = self.session.sectors.get_mut(sector);
        let before = ledger.profit_score;

        ledger.spent += amount;
        ledger.records.push(DecisionRecord::new(category, label, amount, notes));
        ledger.profit_score = clamp_score(before, delta);

        let profit_score = ledger.profit_score;
        let remaining_capital = self.remaining_capital();

        info!(
            sector = %sector,
            category = ?category,
            outcome = %outcome,
            label,
            amount = %amount,
            score_before = before,
            score_after = profit_score,
            "Decision applied"
        );

        Ok(ScoredDecision {
            sector,
            category,
            outcome,
            applied_delta: profit_score - before,
            profit_score,
            remaining_capital,
        })
    }

    /// Compare a vendor quotation against the market and apply the resulting
    /// market-selection decision.
    pub fn evaluate_quotation(
        &mut self,
        sector: Sector,
        item: &str,
        quotation: &QuotationComparison,
        amount: Decimal,
    ) -> Result<ScoredDecision, LedgerError> {
        quotation.validate()?;
        let outcome = quotation.outcome(&self.policy);
        let mut notes = format!(
            "vendor {:.2} vs market {:.2}",
            quotation.vendor_rate, quotation.market_rate
        );
        if let Some(q) = quotation.quality_rating {
            notes.push_str(&format!(", quality {q}/5"));
        }
        self.apply_scored_decision(
            sector,
            DecisionCategory::MarketSelection,
            amount,
            outcome,
            item,
            &notes,
        )
    }

    /// Compare in-house cost against the ready-made price and apply the
    /// resulting build-vs-buy decision.
    pub fn evaluate_build_vs_buy(
        &mut self,
        sector: Sector,
        item: &str,
        comparison: &BuildVsBuyComparison,
        amount: Decimal,
    ) -> Result<ScoredDecision, LedgerError> {
        let outcome = comparison.outcome();
        let notes = format!(
            "in-house {:.2} vs market {:.2}",
            comparison.in_house_cost, comparison.market_price
        );
        self.apply_scored_decision(
            sector,
            DecisionCategory::BuildVsBuy,
            amount,
            outcome,
            item,
            &notes,
        )
    }

    /// Read-only dashboard projection.
    pub fn compute_dashboard_summary(&self) -> DashboardView {
        summary::compute(&self.session)
    }

    /// Serialise the full session into a snapshot document.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::from_session(&self.session)
    }

    /// Replace the whole session from a JSON snapshot. On any error the
    /// current session is left untouched.
    pub fn restore_snapshot(&mut self, blob: &str) -> Result<(), LedgerError> {
        let snapshot = Snapshot::from_json(blob)?;
        self.restore_from(snapshot)
    }

    /// Replace the whole session from an already-decoded snapshot.
    pub fn restore_from(&mut self, snapshot: Snapshot) -> Result<(), LedgerError> {
        let session = snapshot.into_session()?;
        info!(
            institution = %session.institution_name,
            capital = %session.total_capital,
            locked = session.capital_locked,
            "Session restored from snapshot"
        );
        self.session = session;
        Ok(())
    }

    /// Shared precondition check for anything that spends capital.
    fn check_spend(&self, sector: Sector, amount: Decimal) -> Result<(), LedgerError> {
        if !self.session.capital_locked {
            return Err(LedgerError::NotLocked);
        }
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let remaining = self.remaining_capital();
        if amount > remaining {
            warn!(
                sector = %sector,
                requested = %amount,
                remaining = %remaining,
                "Spend rejected: insufficient capital"
            );
            return Err(LedgerError::InsufficientCapital {
                requested: amount,
                remaining,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
