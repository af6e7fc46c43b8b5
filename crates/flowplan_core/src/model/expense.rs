//! Expense definitions and the waterfall deduction
//!
//! An expense is charged as a one-time initial amount in its first year plus a
//! recurring amount every active year. It is funded from an ordered list of
//! corpora: earlier entries are drained first, each only for the portion it is
//! eligible for, and the last entry absorbs whatever is left even if that
//! drives it negative.

use rustc_hash::FxHashMap;

use super::decimal::DecimalContext;
use super::ids::{CorpusId, EntityRef, ExpenseId, Year, YearRange};
use super::inflation::InflationAdjustableValue;
use super::money::Money;
use crate::error::{ConfigError, SimulationError, ValueError};

/// Which part of an expense a funding corpus is asked to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingPortion {
    /// The lump sum charged in the expense's start year
    Initial,
    /// The amount charged every active year
    Recurring,
}

/// One entry of an expense's priority-ordered funding list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingCorpus {
    pub corpus_id: CorpusId,
    /// The corpus only funds this expense from this year on
    pub activation_year: Option<Year>,
    /// Excluded from the recurring portion
    pub for_initial_only: bool,
}

impl FundingCorpus {
    pub fn new(corpus_id: impl Into<CorpusId>) -> Self {
        Self {
            corpus_id: corpus_id.into(),
            activation_year: None,
            for_initial_only: false,
        }
    }

    #[must_use]
    pub fn activated_in(mut self, year: Year) -> Self {
        self.activation_year = Some(year);
        self
    }

    #[must_use]
    pub fn initial_only(mut self) -> Self {
        self.for_initial_only = true;
        self
    }

    pub fn is_allowed_to_fund(&self, year: Year, portion: FundingPortion) -> bool {
        if self.activation_year.is_some_and(|activation| year < activation) {
            return false;
        }
        match portion {
            FundingPortion::Initial => true,
            FundingPortion::Recurring => !self.for_initial_only,
        }
    }
}

/// Read access to corpus balances while planning deductions
pub trait CorpusBalances {
    fn balance_of(&self, id: &CorpusId) -> Option<Money>;
}

/// Amount taken from one corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    pub corpus_id: CorpusId,
    pub amount: Money,
}

/// The deductions an expense makes in one year
///
/// `deductions` always sums to `demanded` exactly. `shortfall` is set when the
/// fallback corpus did not hold enough to cover its share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionPlan {
    pub expense_id: ExpenseId,
    pub year: Year,
    pub demanded: Money,
    pub deductions: Vec<Deduction>,
    pub shortfall: Option<Shortfall>,
}

/// The fallback corpus could not cover its share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub corpus_id: CorpusId,
    pub amount: Money,
}

impl DeductionPlan {
    fn empty(expense_id: ExpenseId, year: Year, demanded: Money) -> Self {
        Self {
            expense_id,
            year,
            demanded,
            deductions: Vec::new(),
            shortfall: None,
        }
    }

    pub fn total(&self) -> Money {
        Money::sum(
            self.deductions.iter().map(|d| d.amount),
            self.demanded.currency,
        )
    }

    /// Merge into an existing record for the same corpus, keeping first-seen order
    fn record(&mut self, corpus_id: &CorpusId, amount: Money) {
        match self.deductions.iter_mut().find(|d| &d.corpus_id == corpus_id) {
            Some(existing) => existing.amount += amount,
            None => self.deductions.push(Deduction {
                corpus_id: corpus_id.clone(),
                amount,
            }),
        }
    }
}

/// An outflow funded from corpora
#[derive(Debug, Clone)]
pub struct Expense {
    pub id: ExpenseId,
    pub enabled: bool,
    pub window: YearRange,
    pub initial: InflationAdjustableValue,
    pub recurring: InflationAdjustableValue,
    funding: Vec<FundingCorpus>,
    ctx: DecimalContext,
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        enabled: bool,
        window: YearRange,
        initial: InflationAdjustableValue,
        recurring: InflationAdjustableValue,
        funding: Vec<FundingCorpus>,
        ctx: DecimalContext,
    ) -> Result<Self, ConfigError> {
        if funding.is_empty() {
            return Err(ConfigError::NoFundingCorpora(id));
        }
        if window.is_inverted() {
            return Err(ConfigError::InvertedWindow {
                entity: EntityRef::Expense(id),
                window,
            });
        }
        Ok(Self {
            id,
            enabled,
            window,
            initial,
            recurring,
            funding,
            ctx,
        })
    }

    pub fn funding(&self) -> &[FundingCorpus] {
        &self.funding
    }

    pub fn is_active(&self, year: Year) -> bool {
        self.enabled && self.window.contains(year)
    }

    fn zero(&self) -> Money {
        Money::zero(self.recurring.base_amount().currency)
    }

    /// The one-time amount, due only in the start year
    pub fn initial_needed(&self, year: Year) -> Result<Money, ValueError> {
        if self.is_active(year) && year == self.window.start_year {
            self.initial.amount_at(year)
        } else {
            Ok(self.zero())
        }
    }

    pub fn recurring_needed(&self, year: Year) -> Result<Money, ValueError> {
        if self.is_active(year) {
            self.recurring.amount_at(year)
        } else {
            Ok(self.zero())
        }
    }

    pub fn amount_needed(&self, year: Year) -> Result<Money, ValueError> {
        self.initial_needed(year)?
            .checked_add(self.recurring_needed(year)?)
            .ok_or(ValueError::AmountOverflow)
    }

    /// Work out which corpora pay for this expense in `year`.
    ///
    /// Balances are read, never written: the caller applies the plan. Negative
    /// balances count as empty. A corpus that appears more than once in the
    /// funding list sees what earlier entries already took.
    pub fn plan_deductions(
        &self,
        year: Year,
        balances: &impl CorpusBalances,
    ) -> Result<DeductionPlan, SimulationError> {
        if !self.is_active(year) {
            return Ok(DeductionPlan::empty(self.id.clone(), year, self.zero()));
        }

        let value_err = |e: ValueError| SimulationError::value(self.id.clone(), year, e);
        let mut initial = self.initial_needed(year).map_err(value_err)?;
        let mut recurring = self.recurring_needed(year).map_err(value_err)?;
        let demanded = initial
            .checked_add(recurring)
            .ok_or(ValueError::AmountOverflow)
            .map_err(value_err)?;
        let mut plan = DeductionPlan::empty(self.id.clone(), year, demanded);

        let Some((fallback, ordered)) = self.funding.split_last() else {
            return Err(ConfigError::NoFundingCorpora(self.id.clone()).into());
        };

        let mut available: FxHashMap<&CorpusId, Money> = FxHashMap::default();
        for (portion, needed) in [
            (FundingPortion::Initial, &mut initial),
            (FundingPortion::Recurring, &mut recurring),
        ] {
            for source in ordered {
                if needed.is_negligible(&self.ctx) {
                    break;
                }
                if !source.is_allowed_to_fund(year, portion) {
                    continue;
                }
                let balance = self.lookup(&mut available, &source.corpus_id, balances, year)?;
                let take = balance.min(*needed);
                if take.is_negligible(&self.ctx) {
                    continue;
                }
                tracing::debug!(
                    expense = %self.id,
                    corpus = %source.corpus_id,
                    year,
                    ?portion,
                    amount = %take,
                    "funding from corpus"
                );
                available.insert(&source.corpus_id, balance - take);
                *needed -= take;
                plan.record(&source.corpus_id, take);
            }
        }

        // The fallback takes everything left, whatever its balance. Both
        // portions only shrank, so this cannot overflow.
        let remainder = initial + recurring;
        let balance = self.lookup(&mut available, &fallback.corpus_id, balances, year)?;
        let uncovered = remainder - balance;
        if uncovered.amount.is_sign_positive() && !uncovered.is_negligible(&self.ctx) {
            plan.shortfall = Some(Shortfall {
                corpus_id: fallback.corpus_id.clone(),
                amount: uncovered,
            });
        }
        plan.record(&fallback.corpus_id, remainder);

        Ok(plan)
    }

    /// Balance still available in `id`, clamped at zero
    fn lookup<'a>(
        &self,
        available: &mut FxHashMap<&'a CorpusId, Money>,
        id: &'a CorpusId,
        balances: &impl CorpusBalances,
        year: Year,
    ) -> Result<Money, SimulationError> {
        if let Some(balance) = available.get(id) {
            return Ok(*balance);
        }
        let balance = balances
            .balance_of(id)
            .ok_or_else(|| SimulationError::MissingCorpus {
                corpus: id.clone(),
                referrer: EntityRef::Expense(self.id.clone()),
                year,
            })?
            .positive_part();
        available.insert(id, balance);
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct Balances(Vec<(CorpusId, Money)>);

    impl Balances {
        fn of(items: &[(&str, Decimal)]) -> Self {
            Self(
                items
                    .iter()
                    .map(|(id, amount)| (CorpusId::from(*id), inr(*amount)))
                    .collect(),
            )
        }
    }

    impl CorpusBalances for Balances {
        fn balance_of(&self, id: &CorpusId) -> Option<Money> {
            self.0.iter().find(|(c, _)| c == id).map(|(_, m)| *m)
        }
    }

    fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    fn expense(initial: Decimal, recurring: Decimal, funding: Vec<FundingCorpus>) -> Expense {
        Expense::new(
            ExpenseId::from("kid-1"),
            true,
            YearRange::new(2025, 2030),
            InflationAdjustableValue::new(inr(initial), 2025, dec!(0)),
            InflationAdjustableValue::new(inr(recurring), 2025, dec!(0)),
            funding,
            DecimalContext::default(),
        )
        .unwrap()
    }

    fn deductions(plan: &DeductionPlan) -> Vec<(&str, Decimal)> {
        plan.deductions
            .iter()
            .map(|d| (d.corpus_id.as_str(), d.amount.amount))
            .collect()
    }

    #[test]
    fn test_no_funding_corpora_rejected() {
        let err = Expense::new(
            ExpenseId::from("kid-1"),
            true,
            YearRange::new(2025, 2030),
            InflationAdjustableValue::zero(inr(dec!(0)), 2025),
            InflationAdjustableValue::zero(inr(dec!(0)), 2025),
            vec![],
            DecimalContext::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::NoFundingCorpora(ExpenseId::from("kid-1")));
    }

    #[test]
    fn test_initial_amount_only_in_start_year() {
        let e = expense(dec!(20), dec!(30), vec![FundingCorpus::new("c1")]);
        assert_eq!(e.amount_needed(2025).unwrap().amount, dec!(50));
        assert_eq!(e.amount_needed(2026).unwrap().amount, dec!(30));
        assert_eq!(e.amount_needed(2031).unwrap().amount, dec!(0));
    }

    #[test]
    fn test_waterfall_drains_in_order() {
        let e = expense(
            dec!(20),
            dec!(30),
            vec![FundingCorpus::new("c1"), FundingCorpus::new("c2")],
        );
        let plan = e
            .plan_deductions(2025, &Balances::of(&[("c1", dec!(30)), ("c2", dec!(40))]))
            .unwrap();
        assert_eq!(deductions(&plan), vec![("c1", dec!(30)), ("c2", dec!(20))]);
        assert_eq!(plan.shortfall, None);
        assert_eq!(plan.total(), plan.demanded);
    }

    #[test]
    fn test_fallback_shortfall_is_reported_not_refused() {
        let e = expense(
            dec!(20),
            dec!(30),
            vec![FundingCorpus::new("c1"), FundingCorpus::new("c2")],
        );
        let plan = e
            .plan_deductions(2025, &Balances::of(&[("c1", dec!(30)), ("c2", dec!(10))]))
            .unwrap();
        assert_eq!(deductions(&plan), vec![("c1", dec!(30)), ("c2", dec!(20))]);
        assert_eq!(
            plan.shortfall,
            Some(Shortfall {
                corpus_id: CorpusId::from("c2"),
                amount: inr(dec!(10)),
            })
        );
        assert_eq!(plan.total().amount, dec!(50));
    }

    #[test]
    fn test_inactive_funding_corpus_is_skipped() {
        let e = expense(
            dec!(20),
            dec!(30),
            vec![
                FundingCorpus::new("c1").activated_in(2030),
                FundingCorpus::new("c2"),
            ],
        );
        let plan = e
            .plan_deductions(2025, &Balances::of(&[("c1", dec!(1000)), ("c2", dec!(100))]))
            .unwrap();
        assert_eq!(deductions(&plan), vec![("c2", dec!(50))]);
    }

    #[test]
    fn test_initial_only_corpus_skips_recurring_portion() {
        let e = expense(
            dec!(20),
            dec!(30),
            vec![
                FundingCorpus::new("lump").initial_only(),
                FundingCorpus::new("bank"),
            ],
        );
        let balances = Balances::of(&[("lump", dec!(100)), ("bank", dec!(100))]);

        let first = e.plan_deductions(2025, &balances).unwrap();
        assert_eq!(deductions(&first), vec![("lump", dec!(20)), ("bank", dec!(30))]);

        let later = e.plan_deductions(2026, &balances).unwrap();
        assert_eq!(deductions(&later), vec![("bank", dec!(30))]);
    }

    #[test]
    fn test_fallback_ignores_its_own_gates() {
        let e = expense(
            dec!(20),
            dec!(30),
            vec![
                FundingCorpus::new("bank"),
                FundingCorpus::new("epf").activated_in(2030).initial_only(),
            ],
        );
        let balances = Balances::of(&[("bank", dec!(5)), ("epf", dec!(100))]);

        let first = e.plan_deductions(2025, &balances).unwrap();
        assert_eq!(deductions(&first), vec![("bank", dec!(5)), ("epf", dec!(45))]);
        assert_eq!(first.shortfall, None);

        let later = e.plan_deductions(2026, &balances).unwrap();
        assert_eq!(deductions(&later), vec![("bank", dec!(5)), ("epf", dec!(25))]);
    }

    #[test]
    fn test_unrepresentable_total_is_an_error() {
        let e = expense(Decimal::MAX, dec!(1), vec![FundingCorpus::new("bank")]);
        assert_eq!(e.amount_needed(2025), Err(ValueError::AmountOverflow));

        let err = e
            .plan_deductions(2025, &Balances::of(&[("bank", dec!(0))]))
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Value {
                source: ValueError::AmountOverflow,
                year: 2025,
                ..
            }
        ));
        assert_eq!(e.amount_needed(2026).unwrap().amount, dec!(1));
    }

    #[test]
    fn test_negative_balance_counts_as_empty() {
        let e = expense(
            dec!(0),
            dec!(30),
            vec![FundingCorpus::new("c1"), FundingCorpus::new("c2")],
        );
        let plan = e
            .plan_deductions(2026, &Balances::of(&[("c1", dec!(-50)), ("c2", dec!(-5))]))
            .unwrap();
        assert_eq!(deductions(&plan), vec![("c2", dec!(30))]);
        assert_eq!(plan.shortfall.map(|s| s.amount.amount), Some(dec!(30)));
    }

    #[test]
    fn test_conservation_with_many_sources() {
        let e = expense(
            dec!(1234.567),
            dec!(89.123),
            vec![
                FundingCorpus::new("a"),
                FundingCorpus::new("b").initial_only(),
                FundingCorpus::new("c").activated_in(2026),
                FundingCorpus::new("d"),
            ],
        );
        let balances = Balances::of(&[
            ("a", dec!(100.01)),
            ("b", dec!(700)),
            ("c", dec!(5000)),
            ("d", dec!(1)),
        ]);
        for year in 2025..=2030 {
            let plan = e.plan_deductions(year, &balances).unwrap();
            assert_eq!(plan.total(), e.amount_needed(year).unwrap(), "year {year}");
        }
    }

    #[test]
    fn test_inactive_expense_plans_nothing() {
        let mut e = expense(dec!(20), dec!(30), vec![FundingCorpus::new("c1")]);
        let balances = Balances::of(&[("c1", dec!(100))]);
        assert!(e.plan_deductions(2031, &balances).unwrap().deductions.is_empty());

        e.enabled = false;
        let plan = e.plan_deductions(2025, &balances).unwrap();
        assert!(plan.deductions.is_empty());
        assert_eq!(plan.shortfall, None);
    }

    #[test]
    fn test_zero_due_is_not_an_error() {
        let e = expense(
            dec!(0),
            dec!(0),
            vec![FundingCorpus::new("c1"), FundingCorpus::new("c2")],
        );
        let plan = e
            .plan_deductions(2026, &Balances::of(&[("c1", dec!(10)), ("c2", dec!(0))]))
            .unwrap();
        assert_eq!(deductions(&plan), vec![("c2", dec!(0))]);
        assert_eq!(plan.shortfall, None);
    }

    #[test]
    fn test_missing_corpus_is_fatal() {
        let e = expense(dec!(0), dec!(10), vec![FundingCorpus::new("ghost")]);
        let err = e.plan_deductions(2025, &Balances::of(&[])).unwrap_err();
        assert_eq!(
            err,
            SimulationError::MissingCorpus {
                corpus: CorpusId::from("ghost"),
                referrer: EntityRef::Expense(ExpenseId::from("kid-1")),
                year: 2025,
            }
        );
    }

    #[test]
    fn test_is_allowed_to_fund() {
        let fc = FundingCorpus::new("epf").activated_in(2030).initial_only();
        assert!(!fc.is_allowed_to_fund(2029, FundingPortion::Initial));
        assert!(fc.is_allowed_to_fund(2030, FundingPortion::Initial));
        assert!(!fc.is_allowed_to_fund(2030, FundingPortion::Recurring));
        assert!(FundingCorpus::new("bank").is_allowed_to_fund(1900, FundingPortion::Recurring));
    }
}
