//! Tests for SimulationResult structure and methods
//!
//! These tests verify:
//! - The JSON document has the documented shape
//! - Ledger entries account for every balance change
//! - Helper methods work as expected

use rust_decimal_macros::dec;

use crate::config::{CashflowBuilder, CorpusBuilder, ExpenseBuilder, SimulationBuilder};
use crate::model::{CorpusId, Currency, Money, StateEvent};
use crate::simulation::simulate;

fn household() -> SimulationBuilder {
    SimulationBuilder::new()
        .years(2025, 2027)
        .base_inflation(dec!(0.10))
        .fallback("bank")
        .corpus(CorpusBuilder::new("bank").balance(dec!(1000)).growth(dec!(0.10)))
        .corpus(CorpusBuilder::new("fund").balance(dec!(500)).ends(2026, "bank"))
        .cashflow(
            CashflowBuilder::new("salary")
                .amount(dec!(200))
                .split(&[("bank", dec!(0.5)), ("fund", dec!(0.5))]),
        )
        .expense(ExpenseBuilder::new("rent").recurring(dec!(2000)).funded_by("bank"))
}

#[test]
fn test_json_shape() {
    let result = simulate(&household().build().unwrap()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    let first = &json["simulation"][0];
    assert_eq!(first["year"], 2025);
    assert_eq!(first["corpora"][0]["id"], "bank");
    // 1000 * 1.1 + 100 - 2000
    assert_eq!(first["corpora"][0]["value"]["amount"], -800.0);
    assert_eq!(first["corpora"][0]["value"]["inflationAdjusted"], -800.0);
    assert_eq!(first["cashflowAllocations"][0]["id"], "salary");
    assert_eq!(first["cashflowAllocations"][0]["corpora"][1]["id"], "fund");
    assert_eq!(first["cashflowAllocations"][0]["corpora"][1]["value"], 100.0);

    assert_eq!(json["simulation"].as_array().unwrap().len(), 3);
    assert!(json["warnings"][0].as_str().unwrap().starts_with("Corpus bank has overshot in year 2025"));
    assert!(json["ledger"].is_array());
    // Not part of the document
    assert!(json.get("currency").is_none());
}

#[test]
fn test_ledger_omitted_when_disabled() {
    let result = simulate(&household().without_ledger().build().unwrap()).unwrap();
    assert!(result.ledger.is_empty());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("ledger").is_none());
    // Years and warnings are unaffected
    assert_eq!(json["simulation"].as_array().unwrap().len(), 3);
    assert!(!result.warnings.is_empty());
}

#[test]
fn test_ledger_replays_balances() {
    let plan = household().build().unwrap();
    let result = simulate(&plan).unwrap();

    for corpus in &plan.corpora {
        let mut balance = corpus.balance();
        for year in &result.simulation {
            for entry in result.entries_for_corpus(&corpus.id) {
                if entry.year != year.year {
                    continue;
                }
                // Successions happen after the snapshot
                if matches!(entry.event, StateEvent::Succession { .. }) {
                    continue;
                }
                balance += entry.event.net_change_for(&corpus.id).unwrap();
            }
            assert_eq!(
                balance.amount,
                year.corpus(&corpus.id).unwrap().value.amount,
                "{} in {}",
                corpus.id,
                year.year
            );
            for entry in result.successions().filter(|e| e.year == year.year) {
                if let Some(change) = entry.event.net_change_for(&corpus.id) {
                    balance += change;
                }
            }
        }
    }
}

#[test]
fn test_ledger_entry_kinds() {
    let result = simulate(&household().build().unwrap()).unwrap();

    // bank grows in 2025 only; it is negative afterwards and shrinks with "growth"
    assert!(result.appreciations().count() >= 1);
    // Two deposits per year
    assert_eq!(result.deposits().count(), 6);
    assert_eq!(result.withdrawals().count(), 3);
    assert_eq!(result.successions().count(), 1);

    let first = result.deposits().next().unwrap();
    assert_eq!(first.year, 2025);
    assert_eq!(
        first.source,
        Some(crate::model::EntityRef::Cashflow("salary".into()))
    );
}

#[test]
fn test_final_helpers() {
    let result = simulate(&household().build().unwrap()).unwrap();

    assert_eq!(result.final_year().unwrap().year, 2027);
    assert_eq!(result.year(2026).unwrap().year, 2026);
    assert!(result.year(2031).is_none());

    let bank = result.final_balance(&CorpusId::from("bank")).unwrap();
    assert_eq!(bank.currency, Currency::INR);
    let fund = result.final_balance(&CorpusId::from("fund")).unwrap();
    assert_eq!(fund, Money::new(dec!(100), Currency::INR));
    assert!(result.final_balance(&CorpusId::from("ghost")).is_none());

    let remaining = result.remaining();
    assert_eq!(remaining.amount, bank.amount + fund.amount);
    assert_eq!(remaining, result.final_year().unwrap().net_worth());
    assert_eq!(result.first_shortfall_year(), Some(2025));
}
