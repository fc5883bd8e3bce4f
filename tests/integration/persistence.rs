//! Snapshot persistence through the file adapter.

use rust_decimal_macros::dec;

use edusupply::engine::{LedgerEngine, ScoringPolicy};
use edusupply::storage;
use edusupply::types::{DecisionCategory, LedgerError, Outcome, Sector};

fn temp_path() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("edusupply_it_snapshot_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

#[test]
fn save_logout_login_restore() {
    let path = temp_path();

    let mut engine = LedgerEngine::new("Willow Creek School", ScoringPolicy::default());
    engine.lock_capital(dec!(75000)).unwrap();
    engine.allocate_spend(Sector::Primary, dec!(15000), "Playground").unwrap();
    engine
        .apply_scored_decision(
            Sector::College,
            DecisionCategory::MarketSelection,
            dec!(2500),
            Outcome::Favorable,
            "Laptops",
            "vendor 500.00 vs market 560.00",
        )
        .unwrap();
    storage::save_snapshot(&engine.export_snapshot(), Some(&path)).unwrap();
    let exported = engine.session().clone();
    drop(engine);

    // A fresh session after logout starts unlocked and empty.
    let mut engine = LedgerEngine::new("Willow Creek School", ScoringPolicy::default());
    assert!(!engine.is_locked());

    let snapshot = storage::load_snapshot(Some(&path)).unwrap().unwrap();
    engine.restore_from(snapshot).unwrap();
    assert_eq!(engine.session(), &exported);
    assert_eq!(engine.remaining_capital(), dec!(57500));
    assert_eq!(engine.lock_capital(dec!(1)).unwrap_err(), LedgerError::AlreadyLocked);

    storage::delete_snapshot(Some(&path)).unwrap();
}

#[test]
fn restore_can_return_to_unlocked() {
    let unlocked = LedgerEngine::new("Willow Creek School", ScoringPolicy::default())
        .export_snapshot()
        .to_json()
        .unwrap();

    let mut engine = LedgerEngine::new("Willow Creek School", ScoringPolicy::default());
    engine.lock_capital(dec!(100)).unwrap();
    engine.restore_snapshot(&unlocked).unwrap();

    assert!(!engine.is_locked());
    engine.lock_capital(dec!(250)).unwrap();
    assert_eq!(engine.remaining_capital(), dec!(250));
}

#[test]
fn legacy_snapshot_is_accepted() {
    let legacy = r#"{
        "institutionName": "Old Mill College",
        "totalCapital": 1000000.0,
        "capitalLocked": true,
        "sectors": {
            "Primary":   { "spent": 200000.0, "profit": 115, "records": [] },
            "Secondary": { "spent": 0.0, "profit": 100, "records": [] },
            "College":   { "spent": 0.0, "profit": 90, "records": [] }
        }
    }"#;

    let mut engine = LedgerEngine::new("placeholder", ScoringPolicy::default());
    engine.restore_snapshot(legacy).unwrap();
    assert_eq!(engine.session().institution_name, "Old Mill College");
    assert_eq!(engine.remaining_capital(), dec!(800000));
    assert_eq!(engine.session().sectors.primary.profit_score, 115);
}
