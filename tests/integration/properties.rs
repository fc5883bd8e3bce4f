//! Ledger invariants under random operation sequences.

use proptest::prelude::*;
use rust_decimal::Decimal;

use edusupply::engine::{LedgerEngine, ScoringPolicy};
use edusupply::types::{DecisionCategory, Outcome, Sector, MAX_PROFIT_SCORE, MIN_PROFIT_SCORE};

#[derive(Debug, Clone)]
enum Op {
    Spend(Sector, i64),
    Decide(Sector, DecisionCategory, i64, bool),
    Snapshot,
    Restore,
}

fn sector() -> impl Strategy<Value = Sector> {
    prop_oneof![Just(Sector::Primary), Just(Sector::Secondary), Just(Sector::College)]
}

fn category() -> impl Strategy<Value = DecisionCategory> {
    prop_oneof![
        Just(DecisionCategory::CapitalAllocation),
        Just(DecisionCategory::MarketSelection),
        Just(DecisionCategory::BuildVsBuy),
        Just(DecisionCategory::InventoryRisk),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (sector(), -50i64..5_000).prop_map(|(s, a)| Op::Spend(s, a)),
        4 => (sector(), category(), 0i64..2_000, any::<bool>())
            .prop_map(|(s, c, a, f)| Op::Decide(s, c, a, f)),
        1 => Just(Op::Snapshot),
        1 => Just(Op::Restore),
    ]
}

fn check_invariants(engine: &LedgerEngine) -> Result<(), TestCaseError> {
    let session = engine.session();
    prop_assert!(session.sectors.total_spent() <= session.total_capital);
    prop_assert!(engine.remaining_capital() >= Decimal::ZERO);
    for (_, ledger) in session.sectors.iter() {
        prop_assert!(ledger.spent >= Decimal::ZERO);
        prop_assert!(ledger.profit_score >= MIN_PROFIT_SCORE);
        prop_assert!(ledger.profit_score <= MAX_PROFIT_SCORE);
        let recorded: Decimal = ledger.records.iter().map(|r| r.amount).sum();
        prop_assert_eq!(recorded, ledger.spent);
    }
    Ok(())
}

proptest! {
    #[test]
    fn ledger_invariants_hold(capital in 1i64..20_000, ops in prop::collection::vec(op(), 0..60)) {
        let mut engine = LedgerEngine::new("Property Academy", ScoringPolicy::default());
        engine.lock_capital(Decimal::from(capital)).unwrap();
        let mut saved: Option<String> = None;

        for op in ops {
            let before = engine.session().clone();
            match op {
                Op::Spend(sector, amount) => {
                    if engine.allocate_spend(sector, Decimal::from(amount), "item").is_err() {
                        prop_assert_eq!(engine.session(), &before);
                    }
                }
                Op::Decide(sector, category, amount, favorable) => {
                    let outcome = Outcome::from_favorable(favorable);
                    let result = engine.apply_scored_decision(
                        sector, category, Decimal::from(amount), outcome, "decision", "",
                    );
                    if result.is_err() {
                        prop_assert_eq!(engine.session(), &before);
                    }
                }
                Op::Snapshot => {
                    saved = Some(engine.export_snapshot().to_json().unwrap());
                }
                Op::Restore => {
                    if let Some(blob) = &saved {
                        engine.restore_snapshot(blob).unwrap();
                    }
                }
            }
            check_invariants(&engine)?;
        }
    }

    #[test]
    fn rejected_spend_never_mutates(capital in 1i64..1_000, overshoot in 1i64..1_000) {
        let mut engine = LedgerEngine::new("Property Academy", ScoringPolicy::default());
        engine.lock_capital(Decimal::from(capital)).unwrap();
        let before = engine.session().clone();

        let result = engine.allocate_spend(Sector::College, Decimal::from(capital + overshoot), "too much");
        prop_assert!(result.is_err());
        prop_assert_eq!(engine.session(), &before);
    }
}
