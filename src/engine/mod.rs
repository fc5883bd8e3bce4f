//! Core engine: capital ledger, profit scoring, and the dashboard view.

pub mod ledger;
pub mod scoring;
pub mod summary;

pub use ledger::{LedgerEngine, ScoredDecision, SpendReceipt};
pub use scoring::{BuildVsBuyComparison, QuotationComparison, ScoreDelta, ScoringPolicy};
pub use summary::{DashboardView, SectorSummary};
