//! Dashboard projection.
//!
//! Pure, read-only view over an `InstitutionSession`.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{InstitutionSession, Sector};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: Sector,
    pub spent: Decimal,
    pub profit_score: i32,
    pub record_count: usize,
}

/// What the summary dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub institution_name: String,
    pub sectors: Vec<SectorSummary>,
    /// Mean profit score over the three sectors.
    pub average_profit_score: Decimal,
    pub total_capital: Decimal,
    pub total_spent: Decimal,
    pub remaining_capital: Decimal,
    /// Remaining / total, clamped to [0, 1]; zero before capital is locked.
    pub remaining_fraction: Decimal,
    /// Sector with the lowest score (first in display order on ties).
    pub weakest_sector: Sector,
}

pub fn compute(session: &InstitutionSession) -> DashboardView {
    let sectors: Vec<SectorSummary> = session
        .sectors
        .iter()
        .map(|(sector, ledger)| SectorSummary {
            sector,
            spent: ledger.spent,
            profit_score: ledger.profit_score,
            record_count: ledger.records.len(),
        })
        .collect();

    let score_sum: i64 = sectors.iter().map(|s| i64::from(s.profit_score)).sum();
    let average_profit_score = Decimal::from(score_sum) / Decimal::from(sectors.len() as u64);

    let weakest_sector = sectors
        .iter()
        .min_by_key(|s| s.profit_score)
        .map(|s| s.sector)
        .unwrap_or(Sector::Primary);

    let total_spent = session.sectors.total_spent();
    let remaining_capital = session.total_capital - total_spent;
    let remaining_fraction = if session.total_capital > Decimal::ZERO {
        (remaining_capital / session.total_capital).clamp(Decimal::ZERO, Decimal::ONE)
    } else {
        Decimal::ZERO
    };

    DashboardView {
        institution_name: session.institution_name.clone(),
        sectors,
        average_profit_score,
        total_capital: session.total_capital,
        total_spent,
        remaining_capital,
        remaining_fraction,
        weakest_sector,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
