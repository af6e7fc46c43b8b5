//! Simulation configuration
//!
//! `SimulationConfig` is the input bundle as it appears in a configuration
//! file: plain data with camelCase keys and defaults for everything optional.
//! `SimulationConfig::build` validates it and produces a `SimulationPlan`, the
//! domain entities the engine runs on.
//!
//! # Builder DSL
//!
//! For tests and programmatic use, the builder DSL produces the same config:
//!
//! ```ignore
//! use flowplan_core::config::{SimulationBuilder, CorpusBuilder, CashflowBuilder, ExpenseBuilder};
//! use rust_decimal_macros::dec;
//!
//! let plan = SimulationBuilder::new()
//!     .years(2025, 2060)
//!     .base_inflation(dec!(0.06))
//!     .fallback("savings-bank")
//!     .corpus(CorpusBuilder::new("savings-bank").balance(dec!(500000)).growth(dec!(0.03)))
//!     .corpus(CorpusBuilder::new("equity-fund").growth(dec!(0.12)))
//!     .cashflow(CashflowBuilder::new("salary")
//!         .amount(dec!(1800000))
//!         .growth(dec!(0.08))
//!         .active(2025, 2045)
//!         .split(&[("savings-bank", dec!(0.3)), ("equity-fund", dec!(0.7))]))
//!     .expense(ExpenseBuilder::new("living")
//!         .recurring(dec!(900000))
//!         .growth(dec!(0.06))
//!         .funded_by("savings-bank")
//!         .funded_by("equity-fund"))
//!     .build()?;
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{CashflowId, CorpusId, Currency, DecimalContext, ExpenseId, Year};

pub mod builder;
pub mod entity_builder;
pub mod plan;

pub use builder::SimulationBuilder;
pub use entity_builder::{CashflowBuilder, CorpusBuilder, ExpenseBuilder};
pub use plan::SimulationPlan;

fn default_true() -> bool {
    true
}

/// The current calendar year, used when no start year is configured
pub fn current_year() -> Year {
    jiff::Zoned::now().year()
}

/// Complete simulation configuration
///
/// **Your money**: `corpora` with their balances and growth rates.
///
/// **Your plan**: `cashflows` coming in and `expenses` going out.
///
/// **World assumptions**: `base_inflation` for start-year reporting,
/// `currency` and `precision` for money arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default)]
    pub corpora: Vec<CorpusConfig>,

    #[serde(default)]
    pub cashflows: Vec<CashflowConfig>,

    #[serde(default)]
    pub expenses: Vec<ExpenseConfig>,

    pub simulation: SimulationWindow,

    /// Single currency for every amount in the run
    #[serde(default)]
    pub currency: Currency,

    /// Receives the balance of an ending corpus that has no usable successor
    pub fallback_corpus_id: CorpusId,

    /// Used only to express balances in start-year terms
    #[serde(default)]
    pub base_inflation: Decimal,

    #[serde(default)]
    pub precision: DecimalContext,

    /// Whether to record every balance change (default: true)
    #[serde(default = "default_true")]
    pub collect_ledger: bool,
}

impl SimulationConfig {
    pub fn new(fallback_corpus_id: impl Into<CorpusId>, end_year: Year) -> Self {
        Self {
            corpora: Vec::new(),
            cashflows: Vec::new(),
            expenses: Vec::new(),
            simulation: SimulationWindow {
                start_year: None,
                end_year,
            },
            currency: Currency::default(),
            fallback_corpus_id: fallback_corpus_id.into(),
            base_inflation: Decimal::ZERO,
            precision: DecimalContext::default(),
            collect_ledger: true,
        }
    }

    /// Configured start year, or the current year
    pub fn start_year(&self) -> Year {
        self.simulation.start_year.unwrap_or_else(current_year)
    }

    /// Create a variant simulating a different range of years
    #[must_use]
    pub fn with_years(mut self, start_year: Option<Year>, end_year: Option<Year>) -> Self {
        if start_year.is_some() {
            self.simulation.start_year = start_year;
        }
        if let Some(end_year) = end_year {
            self.simulation.end_year = end_year;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationWindow {
    #[serde(default)]
    pub start_year: Option<Year>,
    pub end_year: Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusConfig {
    pub id: CorpusId,
    #[serde(default)]
    pub growth_rate: Decimal,
    pub start_year: Year,
    /// Open-ended when absent: the corpus never ends
    #[serde(default)]
    pub end_year: Option<Year>,
    #[serde(default)]
    pub initial_amount: Decimal,
    #[serde(default)]
    pub successor_corpus_id: Option<CorpusId>,
}

/// An amount at a reference year, compounding at `growth_rate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringValueConfig {
    pub amount: Decimal,
    #[serde(alias = "referenceTime")]
    pub reference_year: Year,
    #[serde(default)]
    pub growth_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitConfig {
    pub corpus_id: CorpusId,
    pub ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationConfig {
    pub start_year: Year,
    pub end_year: Year,
    pub split: Vec<SplitConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowConfig {
    pub id: CashflowId,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub start_year: Year,
    pub end_year: Year,
    pub recurring_value: RecurringValueConfig,
    #[serde(default)]
    pub allocations: Vec<AllocationConfig>,
    #[serde(default, alias = "expandedDescription")]
    pub description: String,
}

/// An expense amount at a reference year; the rate comes from the expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseValueConfig {
    pub amount: Decimal,
    #[serde(alias = "referenceTime")]
    pub reference_year: Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingCorpusConfig {
    pub id: CorpusId,
    #[serde(default, alias = "startYear")]
    pub activation_year: Option<Year>,
    #[serde(default)]
    pub for_initial_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseConfig {
    pub id: ExpenseId,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub start_year: Year,
    pub end_year: Year,
    /// Shared by the initial and recurring values
    #[serde(default)]
    pub growth_rate: Decimal,
    /// Charged once in `start_year`; zero when absent
    #[serde(default)]
    pub initial_value: Option<ExpenseValueConfig>,
    /// Charged every active year; zero when absent
    #[serde(default)]
    pub recurring_value: Option<ExpenseValueConfig>,
    /// Priority order, last entry is the fallback. Every corpus in
    /// configuration order when absent.
    #[serde(default)]
    pub funding_corpora: Option<Vec<FundingCorpusConfig>>,
}
