use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::config::SimulationPlan;
use crate::error::{Result, SimulationError};
use crate::model::{
    AllocationShare, Cashflow, CashflowAllocationResult, Corpus, CorpusBalances, CorpusId,
    CorpusSummary, Currency, EntityRef, Expense, LedgerEntry, Money, SimulationResult,
    SimulationWarning, StateEvent, Valuation, Year, YearResult,
};

/// Runtime state for one simulation run
///
/// Owns its own copy of every corpus; the plan it was built from is never
/// touched.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub timeline: SimTimeline,
    pub portfolio: SimPortfolio,
    pub history: SimHistory,
}

#[derive(Debug, Clone)]
pub struct SimTimeline {
    pub start_year: Year,
    pub end_year: Year,
    pub current_year: Year,
    /// Deflator for start-year reporting
    pub base_inflation: Decimal,
}

#[derive(Debug, Clone)]
pub struct SimPortfolio {
    /// Corpora in configuration order
    pub corpora: Vec<Corpus>,
    /// Position of each corpus in `corpora`
    index: FxHashMap<CorpusId, usize>,
    pub fallback_corpus_id: CorpusId,
    pub currency: Currency,
}

#[derive(Debug, Clone)]
pub struct SimHistory {
    pub years: Vec<YearResult>,
    pub warnings: Vec<SimulationWarning>,
    /// Ledger of all balance changes, empty unless `collect_ledger`
    pub ledger: Vec<LedgerEntry>,
    pub collect_ledger: bool,
}

impl SimHistory {
    fn record(&mut self, entry: impl FnOnce() -> LedgerEntry) {
        if self.collect_ledger {
            self.ledger.push(entry());
        }
    }
}

impl SimPortfolio {
    pub fn position(&self, id: &CorpusId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &CorpusId) -> Option<&Corpus> {
        self.position(id).map(|i| &self.corpora[i])
    }

    fn position_for(&self, id: &CorpusId, referrer: EntityRef, year: Year) -> Result<usize> {
        self.position(id).ok_or_else(|| SimulationError::MissingCorpus {
            corpus: id.clone(),
            referrer,
            year,
        })
    }
}

impl CorpusBalances for SimPortfolio {
    fn balance_of(&self, id: &CorpusId) -> Option<Money> {
        self.get(id).map(Corpus::balance)
    }
}

/// Mutable references to two distinct elements
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

impl SimulationState {
    pub fn from_plan(plan: &SimulationPlan) -> Self {
        let corpora = plan.corpora.clone();
        let index = corpora
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        Self {
            timeline: SimTimeline {
                start_year: plan.window.start_year,
                end_year: plan.window.end_year,
                current_year: plan.window.start_year,
                base_inflation: plan.base_inflation,
            },
            portfolio: SimPortfolio {
                corpora,
                index,
                fallback_corpus_id: plan.fallback_corpus_id.clone(),
                currency: plan.currency,
            },
            history: SimHistory {
                years: Vec::with_capacity(plan.window.len()),
                warnings: Vec::new(),
                ledger: Vec::new(),
                collect_ledger: plan.collect_ledger,
            },
        }
    }

    /// Phase 1: every corpus applies a year of growth
    pub fn appreciate_corpora(&mut self, year: Year) -> Result<()> {
        for corpus in &mut self.portfolio.corpora {
            let previous_balance = corpus.balance();
            let gain = corpus
                .appreciate(year)
                .map_err(|e| SimulationError::value(corpus.id.clone(), year, e))?;
            if let Some(gain) = gain {
                tracing::debug!(corpus = %corpus.id, year, gain = %gain, "appreciated");
                self.history.record(|| {
                    LedgerEntry::new(
                        year,
                        StateEvent::Appreciation {
                            corpus_id: corpus.id.clone(),
                            previous_balance,
                            gain,
                            growth_rate: corpus.growth_rate,
                        },
                    )
                });
            }
        }
        Ok(())
    }

    /// Phase 2: every active cashflow deposits its amount by its current split
    pub fn allocate_cashflows(
        &mut self,
        cashflows: &[Cashflow],
        year: Year,
    ) -> Result<Vec<CashflowAllocationResult>> {
        let mut results = Vec::new();

        for cashflow in cashflows {
            let allocation = cashflow.allocation_for(year);
            if allocation.is_none() && !cashflow.is_active(year) {
                continue;
            }
            let amount = cashflow
                .amount_for(year)
                .map_err(|e| SimulationError::value(cashflow.id.clone(), year, e))?;
            let Some(allocation) = allocation else {
                tracing::warn!(
                    cashflow = %cashflow.id,
                    year,
                    amount = %amount,
                    "no allocation covers year, income dropped"
                );
                self.history.warnings.push(SimulationWarning::Unallocated {
                    cashflow_id: cashflow.id.clone(),
                    year,
                    amount,
                });
                continue;
            };

            let shares_due = allocation
                .distribute(amount)
                .map_err(|e| SimulationError::value(cashflow.id.clone(), year, e))?;

            let mut shares = Vec::with_capacity(shares_due.len());
            for (corpus_id, share) in shares_due {
                let i = self.portfolio.position_for(
                    corpus_id,
                    cashflow.id.clone().into(),
                    year,
                )?;
                let corpus = &mut self.portfolio.corpora[i];
                corpus
                    .deposit(share, year)
                    .map_err(|e| SimulationError::value(corpus.id.clone(), year, e))?;
                tracing::debug!(
                    cashflow = %cashflow.id,
                    corpus = %corpus_id,
                    year,
                    amount = %share,
                    "allocated"
                );
                self.history.record(|| {
                    LedgerEntry::with_source(
                        year,
                        cashflow.id.clone(),
                        StateEvent::Deposit {
                            corpus_id: corpus_id.clone(),
                            amount: share,
                        },
                    )
                });
                shares.push(AllocationShare {
                    id: corpus_id.clone(),
                    value: share.amount,
                });
            }

            results.push(CashflowAllocationResult {
                id: cashflow.id.clone(),
                corpora: shares,
            });
        }

        Ok(results)
    }

    /// Phase 3: every expense runs its waterfall; shortfalls become warnings
    pub fn deduct_expenses(&mut self, expenses: &[Expense], year: Year) -> Result<()> {
        for expense in expenses {
            let plan = expense.plan_deductions(year, &self.portfolio)?;

            if let Some(shortfall) = &plan.shortfall {
                tracing::warn!(
                    expense = %expense.id,
                    corpus = %shortfall.corpus_id,
                    year,
                    amount = %shortfall.amount,
                    "funding shortfall"
                );
                self.history.warnings.push(SimulationWarning::Shortfall {
                    expense_id: expense.id.clone(),
                    corpus_id: shortfall.corpus_id.clone(),
                    year,
                    amount: shortfall.amount,
                });
            }

            for deduction in &plan.deductions {
                if deduction.amount.amount.is_zero() {
                    continue;
                }
                let i = self.portfolio.position_for(
                    &deduction.corpus_id,
                    expense.id.clone().into(),
                    year,
                )?;
                let corpus = &mut self.portfolio.corpora[i];
                corpus
                    .withdraw(deduction.amount, year)
                    .map_err(|e| SimulationError::value(corpus.id.clone(), year, e))?;
                self.history.record(|| {
                    LedgerEntry::with_source(
                        year,
                        expense.id.clone(),
                        StateEvent::Withdrawal {
                            corpus_id: deduction.corpus_id.clone(),
                            amount: deduction.amount,
                        },
                    )
                });
            }
        }
        Ok(())
    }

    /// Phase 4: end-of-year balances, nominal and in start-year terms
    pub fn snapshot(&self, year: Year) -> Result<Vec<CorpusSummary>> {
        self.portfolio
            .corpora
            .iter()
            .map(|corpus| {
                let adjusted = corpus
                    .inflation_adjusted_balance(
                        year,
                        self.timeline.start_year,
                        self.timeline.base_inflation,
                    )
                    .map_err(|e| SimulationError::value(corpus.id.clone(), year, e))?;
                Ok(CorpusSummary {
                    id: corpus.id.clone(),
                    value: Valuation {
                        amount: corpus.balance().amount,
                        inflation_adjusted: adjusted.amount,
                    },
                })
            })
            .collect()
    }

    /// Phase 5: ending corpora hand their balance to a successor or the fallback
    pub fn succeed_corpora(&mut self, year: Year) -> Result<()> {
        for source in 0..self.portfolio.corpora.len() {
            if !self.portfolio.corpora[source].is_ending(year) {
                continue;
            }
            let (target, via_fallback) = self.resolve_successor(source, year)?;
            if target == source {
                tracing::debug!(
                    corpus = %self.portfolio.corpora[source].id,
                    year,
                    "ending corpus is its own successor, balance stays"
                );
                continue;
            }

            let (from, to) = pair_mut(&mut self.portfolio.corpora, source, target);
            let amount = from
                .transfer_all_to(to, year)
                .map_err(|e| SimulationError::value(from.id.clone(), year, e))?;
            self.history.record(|| {
                LedgerEntry::with_source(
                    year,
                    from.id.clone(),
                    StateEvent::Succession {
                        from: from.id.clone(),
                        to: to.id.clone(),
                        amount,
                        via_fallback,
                    },
                )
            });
        }
        Ok(())
    }

    /// Index of the corpus that inherits `source`, and whether it is the fallback
    fn resolve_successor(&self, source: usize, year: Year) -> Result<(usize, bool)> {
        let corpus = &self.portfolio.corpora[source];
        if let Some(successor) = &corpus.successor {
            if let Some(target) = self.portfolio.position(successor) {
                return Ok((target, false));
            }
            tracing::warn!(
                corpus = %corpus.id,
                successor = %successor,
                fallback = %self.portfolio.fallback_corpus_id,
                year,
                "successor not found, using fallback corpus"
            );
        }

        let fallback = &self.portfolio.fallback_corpus_id;
        match self.portfolio.position(fallback) {
            Some(target) => Ok((target, true)),
            None => Err(SimulationError::UnresolvedSuccessor {
                corpus: corpus.id.clone(),
                successor: corpus.successor.clone(),
                fallback: fallback.clone(),
                year,
            }),
        }
    }

    pub fn into_result(self) -> SimulationResult {
        SimulationResult {
            simulation: self.history.years,
            warnings: self.history.warnings,
            ledger: self.history.ledger,
            currency: self.portfolio.currency,
        }
    }
}
