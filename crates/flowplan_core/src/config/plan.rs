//! Validated simulation plan
//!
//! Turning a `SimulationConfig` into a `SimulationPlan` is where every
//! configuration error is raised: nothing is checked per simulated year that
//! could have been checked here.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use super::{CashflowConfig, CorpusConfig, ExpenseConfig, SimulationConfig};
use crate::error::ConfigError;
use crate::model::{
    Allocation, AllocationSplit, Cashflow, Corpus, CorpusId, Currency, DecimalContext, EntityRef,
    Expense, FundingCorpus, InflationAdjustableValue, Money, Year, YearRange,
};

/// Domain entities ready to simulate
///
/// Built by `SimulationConfig::build`. The engine never mutates a plan, so one
/// plan can be simulated any number of times.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub corpora: Vec<Corpus>,
    pub cashflows: Vec<Cashflow>,
    pub expenses: Vec<Expense>,
    pub window: YearRange,
    pub currency: Currency,
    pub fallback_corpus_id: CorpusId,
    pub base_inflation: Decimal,
    pub precision: DecimalContext,
    pub collect_ledger: bool,
}

impl SimulationPlan {
    pub fn corpus(&self, id: &CorpusId) -> Option<&Corpus> {
        self.corpora.iter().find(|c| &c.id == id)
    }

    /// Check cross-entity invariants: unique corpus ids, known corpus
    /// references, one currency, sane windows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.is_inverted() {
            return Err(ConfigError::InvertedSimulationWindow(self.window));
        }

        let mut known: FxHashSet<&CorpusId> = FxHashSet::default();
        for corpus in &self.corpora {
            if !known.insert(&corpus.id) {
                return Err(ConfigError::DuplicateCorpus(corpus.id.clone()));
            }
            self.check_currency(corpus.id.clone(), corpus.balance())?;
        }

        let check_ref = |corpus: &CorpusId, referrer: EntityRef| {
            if known.contains(corpus) {
                Ok(())
            } else {
                Err(ConfigError::UnknownCorpus {
                    corpus: corpus.clone(),
                    referrer,
                })
            }
        };

        for cashflow in &self.cashflows {
            self.check_currency(cashflow.id.clone(), cashflow.recurring.base_amount())?;
            for split in cashflow.allocations().iter().flat_map(Allocation::split) {
                check_ref(&split.corpus_id, cashflow.id.clone().into())?;
            }
        }

        for expense in &self.expenses {
            self.check_currency(expense.id.clone(), expense.initial.base_amount())?;
            self.check_currency(expense.id.clone(), expense.recurring.base_amount())?;
            for funding in expense.funding() {
                check_ref(&funding.corpus_id, expense.id.clone().into())?;
            }
        }

        Ok(())
    }

    fn check_currency(&self, entity: impl Into<EntityRef>, money: Money) -> Result<(), ConfigError> {
        if money.currency == self.currency {
            Ok(())
        } else {
            Err(ConfigError::CurrencyMismatch {
                entity: entity.into(),
                expected: self.currency.to_string(),
                found: money.currency.to_string(),
            })
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration and build the domain entities
    pub fn build(&self) -> Result<SimulationPlan, ConfigError> {
        let window = YearRange::new(self.start_year(), self.simulation.end_year);
        let currency = self.currency;
        let ctx = self.precision;

        let corpora = self
            .corpora
            .iter()
            .map(|c| build_corpus(c, currency, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let cashflows = self
            .cashflows
            .iter()
            .map(|c| build_cashflow(c, currency, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let expenses = self
            .expenses
            .iter()
            .map(|e| build_expense(e, &self.corpora, currency, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let plan = SimulationPlan {
            corpora,
            cashflows,
            expenses,
            window,
            currency,
            fallback_corpus_id: self.fallback_corpus_id.clone(),
            base_inflation: self.base_inflation,
            precision: ctx,
            collect_ledger: self.collect_ledger,
        };
        plan.validate()?;

        tracing::debug!(
            corpora = plan.corpora.len(),
            cashflows = plan.cashflows.len(),
            expenses = plan.expenses.len(),
            window = %plan.window,
            "built simulation plan"
        );
        Ok(plan)
    }
}

fn build_corpus(
    config: &CorpusConfig,
    currency: Currency,
    ctx: DecimalContext,
) -> Result<Corpus, ConfigError> {
    let window = YearRange::new(config.start_year, config.end_year.unwrap_or(Year::MAX));
    if window.is_inverted() {
        return Err(ConfigError::InvertedWindow {
            entity: config.id.clone().into(),
            window,
        });
    }
    Ok(Corpus::new(
        config.id.clone(),
        config.growth_rate,
        Money::new(config.initial_amount, currency),
        window,
        config.successor_corpus_id.clone(),
        ctx,
    ))
}

fn build_cashflow(
    config: &CashflowConfig,
    currency: Currency,
    ctx: DecimalContext,
) -> Result<Cashflow, ConfigError> {
    let allocations = config
        .allocations
        .iter()
        .map(|a| {
            let split = a
                .split
                .iter()
                .map(|s| AllocationSplit {
                    corpus_id: s.corpus_id.clone(),
                    ratio: s.ratio,
                })
                .collect();
            Allocation::new(YearRange::new(a.start_year, a.end_year), split, &ctx)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let value = &config.recurring_value;
    Cashflow::new(
        config.id.clone(),
        config.enabled,
        YearRange::new(config.start_year, config.end_year),
        InflationAdjustableValue::new(
            Money::new(value.amount, currency),
            value.reference_year,
            value.growth_rate,
        ),
        allocations,
        config.description.clone(),
    )
}

fn build_expense(
    config: &ExpenseConfig,
    corpora: &[CorpusConfig],
    currency: Currency,
    ctx: DecimalContext,
) -> Result<Expense, ConfigError> {
    let value = |v: &Option<super::ExpenseValueConfig>| match v {
        Some(v) => InflationAdjustableValue::new(
            Money::new(v.amount, currency),
            v.reference_year,
            config.growth_rate,
        ),
        None => InflationAdjustableValue::zero(Money::zero(currency), config.start_year),
    };

    let funding = match &config.funding_corpora {
        Some(list) => list
            .iter()
            .map(|f| FundingCorpus {
                corpus_id: f.id.clone(),
                activation_year: f.activation_year,
                for_initial_only: f.for_initial_only,
            })
            .collect(),
        None => corpora
            .iter()
            .map(|c| FundingCorpus::new(c.id.clone()))
            .collect(),
    };

    Expense::new(
        config.id.clone(),
        config.enabled,
        YearRange::new(config.start_year, config.end_year),
        value(&config.initial_value),
        value(&config.recurring_value),
        funding,
        ctx,
    )
}
