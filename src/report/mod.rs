//! Report renderer.
//!
//! Read-only projections of a session into printable documents: one unit
//! report per sector and one master summary. Rendering is plain text laid
//! out the way the downloaded reports are; nothing here feeds back into the
//! engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::engine::LedgerEngine;
use crate::types::{DecisionRecord, Sector, MAX_PROFIT_SCORE};

const RULE: &str = "----------------------------------------";

// ---------------------------------------------------------------------------
// Sector unit report
// ---------------------------------------------------------------------------

/// Everything a sector unit report shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorReport {
    pub institution_name: String,
    pub sector: Sector,
    pub total_capital: Decimal,
    pub remaining_capital: Decimal,
    pub spent: Decimal,
    pub profit_score: i32,
    pub records: Vec<DecisionRecord>,
    pub generated_at: DateTime<Utc>,
}

impl SectorReport {
    pub fn build(engine: &LedgerEngine, sector: Sector) -> Self {
        let session = engine.session();
        let ledger = session.sectors.get(sector);
        Self {
            institution_name: session.institution_name.clone(),
            sector,
            total_capital: session.total_capital,
            remaining_capital: engine.remaining_capital(),
            spent: ledger.spent,
            profit_score: ledger.profit_score,
            records: ledger.records.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} Unit Report", self.sector)
    }

    pub fn file_name(&self) -> String {
        format!("{}_Report.txt", self.sector)
    }
}

impl fmt::Display for SectorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.institution_name)?;
        writeln!(f, "{}", self.title())?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Sector: {}", self.sector)?;
        writeln!(f, "Total Capital: {:.2}", self.total_capital)?;
        writeln!(f, "Spent: {:.2}", self.spent)?;
        writeln!(f)?;
        if self.records.is_empty() {
            writeln!(f, "No decisions recorded.")?;
        } else {
            writeln!(f, "Decisions ({}):", self.records.len())?;
            for record in &self.records {
                writeln!(f, "  {record}")?;
            }
        }
        writeln!(f, "{RULE}")?;
        writeln!(f, "Strategic Profit Score: {}/{MAX_PROFIT_SCORE}", self.profit_score)?;
        writeln!(f, "Remaining Capital: {:.2}", self.remaining_capital)?;
        write!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))
    }
}

// ---------------------------------------------------------------------------
// Master summary report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterReport {
    pub institution_name: String,
    pub total_capital: Decimal,
    pub total_spent: Decimal,
    pub remaining_capital: Decimal,
    pub average_profit_score: Decimal,
    pub sectors: Vec<(Sector, Decimal, i32)>,
    pub generated_at: DateTime<Utc>,
}

impl MasterReport {
    pub fn build(engine: &LedgerEngine) -> Self {
        let view = engine.compute_dashboard_summary();
        Self {
            institution_name: view.institution_name,
            total_capital: view.total_capital,
            total_spent: view.total_spent,
            remaining_capital: view.remaining_capital,
            average_profit_score: view.average_profit_score,
            sectors: view
                .sectors
                .iter()
                .map(|s| (s.sector, s.spent, s.profit_score))
                .collect(),
            generated_at: Utc::now(),
        }
    }

    pub fn file_name(&self) -> &'static str {
        "Master_Report.txt"
    }
}

impl fmt::Display for MasterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.institution_name)?;
        writeln!(f, "Master Global Summary")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total Capital: {:.2}", self.total_capital)?;
        writeln!(f, "Total Spent: {:.2}", self.total_spent)?;
        writeln!(f)?;
        writeln!(f, "{:<12}{:>16}{:>10}", "Sector", "Spent", "Score")?;
        for (sector, spent, score) in &self.sectors {
            writeln!(f, "{:<12}{:>16.2}{:>10}", sector.to_string(), spent, score)?;
        }
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Strategic Profit Score: {}/{MAX_PROFIT_SCORE}",
            self.average_profit_score.round()
        )?;
        writeln!(f, "Remaining Capital: {:.2}", self.remaining_capital)?;
        write!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
