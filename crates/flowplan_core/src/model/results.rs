//! Simulation results
//!
//! One `YearResult` per simulated year with every corpus balance (nominal and
//! inflation-adjusted to the first simulated year) and the cashflow deposits
//! made that year, plus the shortfall warnings and the ledger of balance
//! changes accumulated over the whole run.
//!
//! Amounts serialize as JSON numbers; warnings serialize as readable strings.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::ids::{CashflowId, CorpusId, ExpenseId, Year};
use super::money::{Currency, Money};
use super::state_event::{LedgerEntry, StateEvent};

/// A balance in nominal terms and in start-year terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub inflation_adjusted: Decimal,
}

impl std::ops::Add for Valuation {
    type Output = Valuation;

    fn add(self, rhs: Valuation) -> Valuation {
        Valuation {
            amount: self.amount + rhs.amount,
            inflation_adjusted: self.inflation_adjusted + rhs.inflation_adjusted,
        }
    }
}

/// End-of-year balance of one corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
    pub id: CorpusId,
    pub value: Valuation,
}

/// Amount a cashflow deposited into one corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationShare {
    pub id: CorpusId,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// Where one cashflow's proceeds went in a year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashflowAllocationResult {
    pub id: CashflowId,
    pub corpora: Vec<AllocationShare>,
}

impl CashflowAllocationResult {
    pub fn total(&self) -> Decimal {
        self.corpora.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearResult {
    pub year: Year,
    pub corpora: Vec<CorpusSummary>,
    pub cashflow_allocations: Vec<CashflowAllocationResult>,
}

impl YearResult {
    pub fn corpus(&self, id: &CorpusId) -> Option<&CorpusSummary> {
        self.corpora.iter().find(|c| &c.id == id)
    }

    /// Sum of all corpus balances
    pub fn net_worth(&self) -> Valuation {
        self.corpora
            .iter()
            .fold(Valuation::default(), |acc, c| acc + c.value)
    }

    pub fn allocation(&self, id: &CashflowId) -> Option<&CashflowAllocationResult> {
        self.cashflow_allocations.iter().find(|a| &a.id == id)
    }
}

/// Non-fatal findings surfaced to the user after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationWarning {
    /// The last funding corpus of an expense could not cover its share and
    /// went negative by `amount`
    Shortfall {
        expense_id: ExpenseId,
        corpus_id: CorpusId,
        year: Year,
        amount: Money,
    },
    /// An active cashflow had no allocation for the year, so `amount` was
    /// not deposited anywhere
    Unallocated {
        cashflow_id: CashflowId,
        year: Year,
        amount: Money,
    },
}

impl fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationWarning::Shortfall {
                expense_id,
                corpus_id,
                year,
                amount,
            } => write!(
                f,
                "Corpus {corpus_id} has overshot in year {year} due to expense {expense_id} by {amount}"
            ),
            SimulationWarning::Unallocated {
                cashflow_id,
                year,
                amount,
            } => write!(
                f,
                "Cashflow {cashflow_id} has no allocation in year {year}, {amount} went nowhere"
            ),
        }
    }
}

impl Serialize for SimulationWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Complete results from a single simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// One entry per simulated year, in order
    pub simulation: Vec<YearResult>,
    pub warnings: Vec<SimulationWarning>,

    /// Ledger of all balance changes in chronological order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ledger: Vec<LedgerEntry>,

    #[serde(skip)]
    pub currency: Currency,
}

impl SimulationResult {
    pub fn year(&self, year: Year) -> Option<&YearResult> {
        self.simulation.iter().find(|y| y.year == year)
    }

    pub fn final_year(&self) -> Option<&YearResult> {
        self.simulation.last()
    }

    /// Nominal balance of a corpus at the end of the run
    pub fn final_balance(&self, id: &CorpusId) -> Option<Money> {
        self.final_year()?
            .corpus(id)
            .map(|c| Money::new(c.value.amount, self.currency))
    }

    /// Net worth left at the end of the run
    pub fn remaining(&self) -> Valuation {
        self.final_year()
            .map(YearResult::net_worth)
            .unwrap_or_default()
    }

    /// First year in which any expense went unfunded
    pub fn first_shortfall_year(&self) -> Option<Year> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                SimulationWarning::Shortfall { year, .. } => Some(*year),
                SimulationWarning::Unallocated { .. } => None,
            })
            .min()
    }

    // === Helper methods to filter ledger entries by type ===

    /// Get all entries touching a specific corpus
    pub fn entries_for_corpus<'a>(
        &'a self,
        id: &'a CorpusId,
    ) -> impl Iterator<Item = &'a LedgerEntry> {
        self.ledger.iter().filter(move |e| e.event.affects(id))
    }

    pub fn appreciations(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.ledger
            .iter()
            .filter(|e| matches!(e.event, StateEvent::Appreciation { .. }))
    }

    pub fn deposits(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.ledger
            .iter()
            .filter(|e| matches!(e.event, StateEvent::Deposit { .. }))
    }

    pub fn withdrawals(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.ledger
            .iter()
            .filter(|e| matches!(e.event, StateEvent::Withdrawal { .. }))
    }

    pub fn successions(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.ledger
            .iter()
            .filter(|e| matches!(e.event, StateEvent::Succession { .. }))
    }
}
