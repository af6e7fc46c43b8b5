//! Corpus definitions
//!
//! A corpus is a named pool of money (bank account, mutual fund, provident
//! fund) with its own annual growth rate and an active window. When the window
//! closes, the remaining balance moves to a successor corpus.

use rust_decimal::Decimal;

use super::decimal::DecimalContext;
use super::ids::{CorpusId, Year, YearRange};
use super::inflation::growth_factor;
use super::money::Money;
use crate::error::ValueError;

#[derive(Debug, Clone)]
pub struct Corpus {
    pub id: CorpusId,
    pub growth_rate: Decimal,
    balance: Money,
    pub window: YearRange,
    pub successor: Option<CorpusId>,
    ctx: DecimalContext,
}

impl Corpus {
    pub fn new(
        id: CorpusId,
        growth_rate: Decimal,
        initial_balance: Money,
        window: YearRange,
        successor: Option<CorpusId>,
        ctx: DecimalContext,
    ) -> Self {
        Self {
            id,
            growth_rate,
            balance: initial_balance,
            window,
            successor,
            ctx,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Growth only applies inside the active window
    pub fn is_growing(&self, year: Year) -> bool {
        self.window.contains(year)
    }

    pub fn is_ending(&self, year: Year) -> bool {
        year == self.window.end_year
    }

    /// Apply one year of growth. Returns the amount added, or `None` when the
    /// corpus is outside its window or the gain rounds to zero.
    pub fn appreciate(&mut self, year: Year) -> Result<Option<Money>, ValueError> {
        if !self.is_growing(year) {
            return Ok(None);
        }
        let gain = self
            .balance
            .checked_mul(self.growth_rate)
            .ok_or(ValueError::AmountOverflow)?;
        if gain.is_negligible(&self.ctx) {
            return Ok(None);
        }
        tracing::trace!(
            corpus = %self.id,
            year,
            gain = %gain,
            "appreciating corpus"
        );
        self.balance = self
            .balance
            .checked_add(gain)
            .ok_or(ValueError::AmountOverflow)?;
        Ok(Some(gain))
    }

    /// Deposits are accepted in any year; only growth is gated by the window
    pub fn deposit(&mut self, amount: Money, year: Year) -> Result<(), ValueError> {
        tracing::trace!(corpus = %self.id, year, amount = %amount, "deposit");
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(ValueError::AmountOverflow)?;
        Ok(())
    }

    /// Withdrawals may drive the balance negative; callers flag shortfalls
    pub fn withdraw(&mut self, amount: Money, year: Year) -> Result<(), ValueError> {
        tracing::trace!(corpus = %self.id, year, amount = %amount, "withdrawal");
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(ValueError::AmountOverflow)?;
        Ok(())
    }

    /// Move the whole balance into `target`, returning the amount moved.
    /// Neither corpus changes if the target cannot hold the sum.
    pub fn transfer_all_to(
        &mut self,
        target: &mut Corpus,
        year: Year,
    ) -> Result<Money, ValueError> {
        let amount = self.balance;
        tracing::debug!(
            from = %self.id,
            to = %target.id,
            year,
            amount = %amount,
            "transferring entire corpus"
        );
        target.deposit(amount, year)?;
        self.withdraw(amount, year)?;
        Ok(amount)
    }

    /// Balance expressed in `base_year` money: `balance / (1 + inflation)^(current - base)`
    pub fn inflation_adjusted_balance(
        &self,
        current_year: Year,
        base_year: Year,
        base_inflation: Decimal,
    ) -> Result<Money, ValueError> {
        if current_year < base_year {
            return Err(ValueError::YearBeforeReference {
                year: current_year,
                reference_year: base_year,
            });
        }
        let years = i64::from(current_year) - i64::from(base_year);
        let factor = growth_factor(base_inflation, years)?;
        self.balance
            .checked_div(factor)
            .ok_or(ValueError::DivisionByZero)
    }
}
