//! Snapshot document.
//!
//! The JSON shape exchanged with the persistence adapter:
//!
//! ```json
//! {
//!   "institutionName": "...",
//!   "totalCapital": 1000000.0,
//!   "capitalLocked": true,
//!   "sectors": {
//!     "Primary": { "spent": 0.0, "profitScore": 100, "records": [] },
//!     ...
//!   }
//! }
//! ```
//!
//! `categoryBreakdown` and `exportedAt` are written on export but optional
//! on input. Older exports that used `profit` instead of `profitScore` are
//! accepted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    DecisionCategory, DecisionRecord, InstitutionSession, LedgerError, Sector, SectorLedger,
    Sectors, MAX_PROFIT_SCORE, MIN_PROFIT_SCORE,
};

/// Serialised copy of a whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub institution_name: String,
    pub total_capital: Decimal,
    pub capital_locked: bool,
    pub sectors: BTreeMap<Sector, SectorSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSnapshot {
    pub spent: Decimal,
    #[serde(alias = "profit")]
    pub profit_score: i32,
    pub records: Vec<DecisionRecord>,
    /// Per-category amount totals. Derived; ignored on restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_breakdown: Option<BTreeMap<DecisionCategory, Decimal>>,
}

impl SectorSnapshot {
    fn from_ledger(ledger: &SectorLedger) -> Self {
        let breakdown = DecisionCategory::ALL
            .into_iter()
            .map(|c| (c, ledger.total_for(c)))
            .filter(|(_, total)| !total.is_zero())
            .collect();
        Self {
            spent: ledger.spent,
            profit_score: ledger.profit_score,
            records: ledger.records.clone(),
            category_breakdown: Some(breakdown),
        }
    }

    fn into_ledger(self, sector: Sector) -> Result<SectorLedger, LedgerError> {
        if self.spent < Decimal::ZERO {
            return Err(malformed(format!("{sector}: negative spent {}", self.spent)));
        }
        if !(MIN_PROFIT_SCORE..=MAX_PROFIT_SCORE).contains(&self.profit_score) {
            return Err(malformed(format!(
                "{sector}: profitScore {} outside [{MIN_PROFIT_SCORE}, {MAX_PROFIT_SCORE}]",
                self.profit_score
            )));
        }
        if let Some(r) = self.records.iter().find(|r| r.amount < Decimal::ZERO) {
            return Err(malformed(format!(
                "{sector}: record '{}' has negative amount {}",
                r.label, r.amount
            )));
        }
        Ok(SectorLedger {
            spent: self.spent,
            profit_score: self.profit_score,
            records: self.records,
        })
    }
}

impl Snapshot {
    /// Capture the full session.
    pub fn from_session(session: &InstitutionSession) -> Self {
        Self {
            institution_name: session.institution_name.clone(),
            total_capital: session.total_capital,
            capital_locked: session.capital_locked,
            sectors: session
                .sectors
                .iter()
                .map(|(sector, ledger)| (sector, SectorSnapshot::from_ledger(ledger)))
                .collect(),
            exported_at: Some(Utc::now()),
        }
    }

    /// Decode a JSON blob. Missing or mistyped fields become `MalformedSnapshot`.
    pub fn from_json(blob: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(blob).map_err(|e| malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate and convert into a session. Nothing is returned unless the
    /// whole document is consistent.
    pub fn into_session(mut self) -> Result<InstitutionSession, LedgerError> {
        if self.capital_locked && self.total_capital <= Decimal::ZERO {
            return Err(malformed(format!(
                "locked session with non-positive totalCapital {}",
                self.total_capital
            )));
        }
        if !self.capital_locked && !self.total_capital.is_zero() {
            return Err(malformed(format!(
                "unlocked session with totalCapital {}",
                self.total_capital
            )));
        }

        let mut take = |sector: Sector| -> Result<SectorLedger, LedgerError> {
            self.sectors
                .remove(&sector)
                .ok_or_else(|| malformed(format!("missing sector {sector}")))?
                .into_ledger(sector)
        };
        let sectors = Sectors {
            primary: take(Sector::Primary)?,
            secondary: take(Sector::Secondary)?,
            college: take(Sector::College)?,
        };

        let total_spent = sectors.total_spent();
        if total_spent > self.total_capital {
            return Err(malformed(format!(
                "total spent {total_spent} exceeds totalCapital {}",
                self.total_capital
            )));
        }

        Ok(InstitutionSession {
            institution_name: self.institution_name,
            total_capital: self.total_capital,
            capital_locked: self.capital_locked,
            sectors,
        })
    }
}

fn malformed(msg: String) -> LedgerError {
    LedgerError::MalformedSnapshot(msg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
