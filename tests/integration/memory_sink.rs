//! Remote sync through an in-memory sink.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use edusupply::engine::{LedgerEngine, ScoringPolicy};
use edusupply::sync::{flatten_records, RemoteSink, SheetRow, SyncDispatcher};
use edusupply::types::{DecisionCategory, Outcome, Sector};

#[derive(Default, Clone)]
struct MemorySink {
    pushed: Arc<Mutex<Vec<(String, Vec<SheetRow>)>>>,
}

#[async_trait]
impl RemoteSink for MemorySink {
    async fn push_rows(&self, institution: &str, rows: &[SheetRow]) -> Result<()> {
        let mut pushed = self.pushed.lock().unwrap();
        pushed.push((institution.to_string(), rows.to_vec()));
        Ok(())
    }

    fn name(&self) -> String {
        "memory".to_string()
    }
}

struct OfflineSink;

#[async_trait]
impl RemoteSink for OfflineSink {
    async fn push_rows(&self, _institution: &str, _rows: &[SheetRow]) -> Result<()> {
        bail!("remote store unreachable")
    }

    fn name(&self) -> String {
        "offline".to_string()
    }
}

fn busy_engine() -> LedgerEngine {
    let mut engine = LedgerEngine::new("Riverside Grammar", ScoringPolicy::default());
    engine.lock_capital(dec!(40000)).unwrap();
    engine.allocate_spend(Sector::College, dec!(5000), "Microscopes").unwrap();
    engine.allocate_spend(Sector::Primary, dec!(1200), "Crayons").unwrap();
    engine
        .apply_scored_decision(
            Sector::Secondary,
            DecisionCategory::MarketSelection,
            Decimal::ZERO,
            Outcome::Favorable,
            "Uniform tender",
            "",
        )
        .unwrap();
    engine
}

#[tokio::test]
async fn rows_are_tagged_and_ordered_by_sector() {
    let engine = busy_engine();
    let sink = MemorySink::default();
    let dispatcher = SyncDispatcher::new(vec![Box::new(sink.clone())]);

    let report = dispatcher.sync(&engine.export_snapshot()).await;
    assert!(report.all_ok());
    assert_eq!(report.rows, 3);

    let pushed = sink.pushed.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    let (institution, rows) = &pushed[0];
    assert_eq!(institution, "Riverside Grammar");
    let sectors: Vec<Sector> = rows.iter().map(|r| r.sector).collect();
    assert_eq!(sectors, vec![Sector::Primary, Sector::Secondary, Sector::College]);
    assert!(rows.iter().all(|r| r.institution == "Riverside Grammar"));
}

#[tokio::test]
async fn failed_sync_leaves_engine_untouched() {
    let engine = busy_engine();
    let before = engine.session().clone();
    let sink = MemorySink::default();
    let dispatcher = SyncDispatcher::new(vec![Box::new(OfflineSink), Box::new(sink.clone())]);

    let report = dispatcher.sync(&engine.export_snapshot()).await;
    assert!(!report.all_ok());
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().any(|r| r.sink == "offline" && !r.ok));
    assert_eq!(sink.pushed.lock().unwrap().len(), 1);
    assert_eq!(engine.session(), &before);
}

#[test]
fn flatten_matches_record_count() {
    let engine = busy_engine();
    let rows = flatten_records(&engine.export_snapshot());
    let records: usize = engine.session().sectors.iter().map(|(_, l)| l.records.len()).sum();
    assert_eq!(rows.len(), records);
}
