//! End-to-end engine scenarios.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use edusupply::engine::{LedgerEngine, ScoringPolicy};
use edusupply::types::{DecisionCategory, LedgerError, Outcome, Sector};

fn locked(capital: Decimal) -> LedgerEngine {
    let mut engine = LedgerEngine::new("Northbridge Education Trust", ScoringPolicy::default());
    engine.lock_capital(capital).unwrap();
    engine
}

fn market_decision(engine: &mut LedgerEngine, sector: Sector, outcome: Outcome) -> i32 {
    engine
        .apply_scored_decision(
            sector,
            DecisionCategory::MarketSelection,
            Decimal::ZERO,
            outcome,
            "Stationery quote",
            "",
        )
        .unwrap()
        .profit_score
}

#[test]
fn scenario_a_allocation_and_rejection() {
    let mut engine = locked(dec!(1000000));

    let receipt = engine.allocate_spend(Sector::Primary, dec!(200000), "Classrooms").unwrap();
    assert_eq!(receipt.remaining_capital, dec!(800000));

    let err = engine
        .allocate_spend(Sector::Secondary, dec!(900000), "Sports complex")
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientCapital { .. }));
    assert_eq!(engine.remaining_capital(), dec!(800000));
    assert!(engine.session().sectors.secondary.records.is_empty());
}

#[test]
fn scenario_b_score_clamps_at_200() {
    let mut engine = locked(dec!(1000));
    let scores: Vec<i32> = (0..12)
        .map(|_| market_decision(&mut engine, Sector::Primary, Outcome::Favorable))
        .collect();
    // +10 per favorable decision: 110, 120, ... 200, then pinned.
    assert_eq!(scores[7], 180);
    assert_eq!(scores[9], 200);
    assert_eq!(&scores[10..], &[200, 200]);
    assert_eq!(engine.session().sectors.primary.records.len(), 12);
}

#[test]
fn scenario_c_score_clamps_at_0() {
    let mut engine = locked(dec!(1000));
    let mut score = i32::MAX;
    for _ in 0..25 {
        score = market_decision(&mut engine, Sector::Secondary, Outcome::Unfavorable);
    }
    assert_eq!(score, 0);
    // Other sectors are untouched.
    assert_eq!(engine.session().sectors.primary.profit_score, 100);
}

#[test]
fn scenario_d_restore_reverts_spend() {
    let mut engine = locked(dec!(50000));
    engine.allocate_spend(Sector::College, dec!(12500.50), "Lab benches").unwrap();
    let blob = engine.export_snapshot().to_json().unwrap();
    let before = engine.session().clone();

    engine.allocate_spend(Sector::College, dec!(7000), "Fume hoods").unwrap();
    assert_eq!(engine.session().sectors.college.spent, dec!(19500.50));

    engine.restore_snapshot(&blob).unwrap();
    assert_eq!(engine.session().sectors.college.spent, dec!(12500.50));
    assert_eq!(engine.session(), &before);
}

#[test]
fn dashboard_summary_is_idempotent() {
    let mut engine = locked(dec!(9000));
    engine.allocate_spend(Sector::Primary, dec!(3000), "Books").unwrap();
    market_decision(&mut engine, Sector::College, Outcome::Unfavorable);

    let first = engine.compute_dashboard_summary();
    let second = engine.compute_dashboard_summary();
    assert_eq!(first, second);
    assert_eq!(first.weakest_sector, Sector::College);
    assert_eq!(first.remaining_capital, dec!(6000));
}

#[test]
fn mixed_session_walkthrough() {
    let mut engine = LedgerEngine::new("Northbridge Education Trust", ScoringPolicy::default());

    // Nothing is accepted before capital is locked.
    assert_eq!(
        engine.allocate_spend(Sector::Primary, dec!(1), "Chalk").unwrap_err(),
        LedgerError::NotLocked
    );

    engine.lock_capital(dec!(100000)).unwrap();
    engine.allocate_spend(Sector::Primary, dec!(25000), "Furniture").unwrap();
    engine
        .apply_scored_decision(
            Sector::Secondary,
            DecisionCategory::BuildVsBuy,
            dec!(8000),
            Outcome::Favorable,
            "Science kits",
            "built in-house by staff",
        )
        .unwrap();
    engine
        .apply_scored_decision(
            Sector::College,
            DecisionCategory::InventoryRisk,
            Decimal::ZERO,
            Outcome::Unfavorable,
            "Paper reserve",
            "supplier warns of shortage",
        )
        .unwrap();

    let view = engine.compute_dashboard_summary();
    assert_eq!(view.total_spent, dec!(33000));
    assert_eq!(view.remaining_capital, dec!(67000));
    assert_eq!(view.sectors[1].profit_score, 110);
    assert_eq!(view.sectors[2].profit_score, 100);
    assert_eq!(view.weakest_sector, Sector::Primary);
}
