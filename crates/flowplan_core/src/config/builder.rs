//! Simulation Builder
//!
//! The SimulationBuilder provides a fluent API for assembling a
//! `SimulationConfig` from entity builders. Entities added without explicit
//! years inherit the simulation window.
//!
//! # Example
//!
//! ```ignore
//! use flowplan_core::config::{SimulationBuilder, CorpusBuilder, ExpenseBuilder};
//! use rust_decimal_macros::dec;
//!
//! let plan = SimulationBuilder::new()
//!     .years(2025, 2030)
//!     .fallback("bank")
//!     .corpus(CorpusBuilder::new("bank").balance(dec!(100)))
//!     .expense(ExpenseBuilder::new("rent").recurring(dec!(10)).funded_by("bank"))
//!     .build()?;
//! ```

use rust_decimal::Decimal;

use super::entity_builder::{CashflowBuilder, CorpusBuilder, ExpenseBuilder};
use super::{SimulationConfig, SimulationPlan, current_year};
use crate::error::ConfigError;
use crate::model::{CorpusId, Currency, DecimalContext, Year};

/// Builder for creating simulations
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    start_year: Option<Year>,
    end_year: Option<Year>,
    currency: Currency,
    fallback: Option<CorpusId>,
    base_inflation: Decimal,
    precision: DecimalContext,
    collect_ledger: bool,

    // Pending builders (resolved during build)
    corpora: Vec<CorpusBuilder>,
    cashflows: Vec<CashflowBuilder>,
    expenses: Vec<ExpenseBuilder>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Create a new simulation builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_year: None,
            end_year: None,
            currency: Currency::default(),
            fallback: None,
            base_inflation: Decimal::ZERO,
            precision: DecimalContext::default(),
            collect_ledger: true,
            corpora: Vec::new(),
            cashflows: Vec::new(),
            expenses: Vec::new(),
        }
    }

    // =========================================================================
    // Basic Configuration
    // =========================================================================

    /// Simulate `start_year..=end_year`
    #[must_use]
    pub fn years(mut self, start_year: Year, end_year: Year) -> Self {
        self.start_year = Some(start_year);
        self.end_year = Some(end_year);
        self
    }

    /// Simulate `count` years starting now
    #[must_use]
    pub fn duration_years(mut self, count: u16) -> Self {
        let start = self.start_year.unwrap_or_else(current_year);
        self.start_year = Some(start);
        self.end_year = Some(start.saturating_add_unsigned(count.saturating_sub(1)));
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Corpus that receives balances of ending corpora without a successor.
    /// Defaults to the first corpus added.
    #[must_use]
    pub fn fallback(mut self, corpus: impl Into<CorpusId>) -> Self {
        self.fallback = Some(corpus.into());
        self
    }

    #[must_use]
    pub fn base_inflation(mut self, rate: Decimal) -> Self {
        self.base_inflation = rate;
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: DecimalContext) -> Self {
        self.precision = precision;
        self
    }

    /// Skip recording ledger entries
    #[must_use]
    pub fn without_ledger(mut self) -> Self {
        self.collect_ledger = false;
        self
    }

    // =========================================================================
    // Entities
    // =========================================================================

    #[must_use]
    pub fn corpus(mut self, corpus: CorpusBuilder) -> Self {
        self.corpora.push(corpus);
        self
    }

    #[must_use]
    pub fn cashflow(mut self, cashflow: CashflowBuilder) -> Self {
        self.cashflows.push(cashflow);
        self
    }

    #[must_use]
    pub fn expense(mut self, expense: ExpenseBuilder) -> Self {
        self.expenses.push(expense);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Assemble the configuration without validating it
    pub fn config(self) -> SimulationConfig {
        let start = self.start_year.unwrap_or_else(current_year);
        let end = self.end_year.unwrap_or(start);

        let corpora: Vec<_> = self
            .corpora
            .into_iter()
            .map(|c| c.into_config(start))
            .collect();
        let fallback = self
            .fallback
            .or_else(|| corpora.first().map(|c| c.id.clone()))
            .unwrap_or_else(|| CorpusId::from(""));

        let mut config = SimulationConfig::new(fallback, end);
        config.simulation.start_year = Some(start);
        config.currency = self.currency;
        config.base_inflation = self.base_inflation;
        config.precision = self.precision;
        config.collect_ledger = self.collect_ledger;
        config.corpora = corpora;
        config.cashflows = self
            .cashflows
            .into_iter()
            .map(|c| c.into_config(start, end))
            .collect();
        config.expenses = self
            .expenses
            .into_iter()
            .map(|e| e.into_config(start, end))
            .collect();
        config
    }

    /// Assemble and validate
    pub fn build(self) -> Result<SimulationPlan, ConfigError> {
        self.config().build()
    }
}
