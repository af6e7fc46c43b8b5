//! Corpus, cashflow and expense builders
//!
//! Each builder fills in one configuration record. Anything left unset is
//! resolved by `SimulationBuilder` when the config is assembled: start years
//! default to the simulation start, reference years to the entity's start.

use rust_decimal::Decimal;

use super::{
    AllocationConfig, CashflowConfig, CorpusConfig, ExpenseConfig, ExpenseValueConfig,
    FundingCorpusConfig, RecurringValueConfig, SplitConfig,
};
use crate::model::{CashflowId, CorpusId, ExpenseId, Year};

/// Builder for a corpus
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    id: CorpusId,
    growth_rate: Decimal,
    balance: Decimal,
    start_year: Option<Year>,
    end_year: Option<Year>,
    successor: Option<CorpusId>,
}

impl CorpusBuilder {
    #[must_use]
    pub fn new(id: impl Into<CorpusId>) -> Self {
        Self {
            id: id.into(),
            growth_rate: Decimal::ZERO,
            balance: Decimal::ZERO,
            start_year: None,
            end_year: None,
            successor: None,
        }
    }

    /// Initial balance
    #[must_use]
    pub fn balance(mut self, amount: Decimal) -> Self {
        self.balance = amount;
        self
    }

    /// Annual growth rate (0.08 = 8%)
    #[must_use]
    pub fn growth(mut self, rate: Decimal) -> Self {
        self.growth_rate = rate;
        self
    }

    #[must_use]
    pub fn active(mut self, start_year: Year, end_year: Year) -> Self {
        self.start_year = Some(start_year);
        self.end_year = Some(end_year);
        self
    }

    /// Close the corpus in `year`, handing its balance to `successor`
    #[must_use]
    pub fn ends(mut self, year: Year, successor: impl Into<CorpusId>) -> Self {
        self.end_year = Some(year);
        self.successor = Some(successor.into());
        self
    }

    /// Close the corpus in `year`; its balance goes to the fallback corpus
    #[must_use]
    pub fn ends_to_fallback(mut self, year: Year) -> Self {
        self.end_year = Some(year);
        self.successor = None;
        self
    }

    pub(crate) fn into_config(self, default_start: Year) -> CorpusConfig {
        CorpusConfig {
            id: self.id,
            growth_rate: self.growth_rate,
            start_year: self.start_year.unwrap_or(default_start),
            end_year: self.end_year,
            initial_amount: self.balance,
            successor_corpus_id: self.successor,
        }
    }
}

/// Builder for a recurring inflow
#[derive(Debug, Clone)]
pub struct CashflowBuilder {
    id: CashflowId,
    enabled: bool,
    amount: Decimal,
    growth_rate: Decimal,
    reference_year: Option<Year>,
    start_year: Option<Year>,
    end_year: Option<Year>,
    allocations: Vec<AllocationConfig>,
    /// Split for the whole active window, once that is known
    window_split: Option<Vec<SplitConfig>>,
    description: String,
}

fn split_configs(split: &[(&str, Decimal)]) -> Vec<SplitConfig> {
    split
        .iter()
        .map(|(corpus, ratio)| SplitConfig {
            corpus_id: CorpusId::from(*corpus),
            ratio: *ratio,
        })
        .collect()
}

impl CashflowBuilder {
    #[must_use]
    pub fn new(id: impl Into<CashflowId>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            amount: Decimal::ZERO,
            growth_rate: Decimal::ZERO,
            reference_year: None,
            start_year: None,
            end_year: None,
            allocations: Vec::new(),
            window_split: None,
            description: String::new(),
        }
    }

    /// Yearly amount in the reference year
    #[must_use]
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Yearly raise (0.08 = 8%)
    #[must_use]
    pub fn growth(mut self, rate: Decimal) -> Self {
        self.growth_rate = rate;
        self
    }

    #[must_use]
    pub fn reference_year(mut self, year: Year) -> Self {
        self.reference_year = Some(year);
        self
    }

    #[must_use]
    pub fn active(mut self, start_year: Year, end_year: Year) -> Self {
        self.start_year = Some(start_year);
        self.end_year = Some(end_year);
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Split the proceeds of `start_year..=end_year` among corpora
    #[must_use]
    pub fn allocate(mut self, start_year: Year, end_year: Year, split: &[(&str, Decimal)]) -> Self {
        self.allocations.push(AllocationConfig {
            start_year,
            end_year,
            split: split_configs(split),
        });
        self
    }

    /// One split for the whole active window
    #[must_use]
    pub fn split(mut self, split: &[(&str, Decimal)]) -> Self {
        self.window_split = Some(split_configs(split));
        self
    }

    pub(crate) fn into_config(self, default_start: Year, default_end: Year) -> CashflowConfig {
        let start_year = self.start_year.unwrap_or(default_start);
        let end_year = self.end_year.unwrap_or(default_end);
        let mut allocations = self.allocations;
        if let Some(split) = self.window_split {
            allocations.push(AllocationConfig {
                start_year,
                end_year,
                split,
            });
        }

        CashflowConfig {
            id: self.id,
            enabled: self.enabled,
            start_year,
            end_year,
            recurring_value: RecurringValueConfig {
                amount: self.amount,
                reference_year: self.reference_year.unwrap_or(start_year),
                growth_rate: self.growth_rate,
            },
            allocations,
            description: self.description,
        }
    }
}

/// Builder for an outflow
#[derive(Debug, Clone)]
pub struct ExpenseBuilder {
    id: ExpenseId,
    enabled: bool,
    initial: Decimal,
    recurring: Decimal,
    growth_rate: Decimal,
    reference_year: Option<Year>,
    start_year: Option<Year>,
    end_year: Option<Year>,
    funding: Vec<FundingCorpusConfig>,
}

impl ExpenseBuilder {
    #[must_use]
    pub fn new(id: impl Into<ExpenseId>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            initial: Decimal::ZERO,
            recurring: Decimal::ZERO,
            growth_rate: Decimal::ZERO,
            reference_year: None,
            start_year: None,
            end_year: None,
            funding: Vec::new(),
        }
    }

    /// One-time amount charged in the start year
    #[must_use]
    pub fn initial(mut self, amount: Decimal) -> Self {
        self.initial = amount;
        self
    }

    /// Amount charged every active year
    #[must_use]
    pub fn recurring(mut self, amount: Decimal) -> Self {
        self.recurring = amount;
        self
    }

    /// Yearly inflation of both amounts
    #[must_use]
    pub fn growth(mut self, rate: Decimal) -> Self {
        self.growth_rate = rate;
        self
    }

    #[must_use]
    pub fn reference_year(mut self, year: Year) -> Self {
        self.reference_year = Some(year);
        self
    }

    #[must_use]
    pub fn active(mut self, start_year: Year, end_year: Year) -> Self {
        self.start_year = Some(start_year);
        self.end_year = Some(end_year);
        self
    }

    /// A lump sum in a single year
    #[must_use]
    pub fn once_in(self, year: Year) -> Self {
        self.active(year, year)
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Append a funding corpus; the last one added is the fallback
    #[must_use]
    pub fn funded_by(mut self, corpus: impl Into<CorpusId>) -> Self {
        self.funding.push(FundingCorpusConfig {
            id: corpus.into(),
            activation_year: None,
            for_initial_only: false,
        });
        self
    }

    /// Append a funding corpus usable from `year` on
    #[must_use]
    pub fn funded_by_from(mut self, corpus: impl Into<CorpusId>, year: Year) -> Self {
        self.funding.push(FundingCorpusConfig {
            id: corpus.into(),
            activation_year: Some(year),
            for_initial_only: false,
        });
        self
    }

    /// Append a funding corpus that only pays the initial amount
    #[must_use]
    pub fn initial_funded_by(mut self, corpus: impl Into<CorpusId>) -> Self {
        self.funding.push(FundingCorpusConfig {
            id: corpus.into(),
            activation_year: None,
            for_initial_only: true,
        });
        self
    }

    pub(crate) fn into_config(self, default_start: Year, default_end: Year) -> ExpenseConfig {
        let start_year = self.start_year.unwrap_or(default_start);
        let reference_year = self.reference_year.unwrap_or(start_year);
        let value = |amount: Decimal| {
            (!amount.is_zero()).then_some(ExpenseValueConfig {
                amount,
                reference_year,
            })
        };

        ExpenseConfig {
            id: self.id,
            enabled: self.enabled,
            start_year,
            end_year: self.end_year.unwrap_or(default_end),
            growth_rate: self.growth_rate,
            initial_value: value(self.initial),
            recurring_value: value(self.recurring),
            // No explicit list means every corpus, in order
            funding_corpora: (!self.funding.is_empty()).then_some(self.funding),
        }
    }
}
