use rust_decimal::{Decimal, MathematicalOps};

use super::ids::Year;
use super::money::Money;
use crate::error::ValueError;

/// `(1 + rate)^years`, failing on overflow
pub(crate) fn growth_factor(rate: Decimal, years: i64) -> Result<Decimal, ValueError> {
    (Decimal::ONE + rate)
        .checked_powi(years)
        .ok_or(ValueError::Overflow { years })
}

/// An amount expressed in a reference year that compounds at a fixed rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflationAdjustableValue {
    amount: Money,
    reference_year: Year,
    growth_rate: Decimal,
}

impl InflationAdjustableValue {
    pub fn new(amount: Money, reference_year: Year, growth_rate: Decimal) -> Self {
        Self {
            amount,
            reference_year,
            growth_rate,
        }
    }

    /// A value that is zero in every year
    pub fn zero(template: Money, reference_year: Year) -> Self {
        Self::new(Money::zero(template.currency), reference_year, Decimal::ZERO)
    }

    pub fn base_amount(&self) -> Money {
        self.amount
    }

    pub fn reference_year(&self) -> Year {
        self.reference_year
    }

    pub fn growth_rate(&self) -> Decimal {
        self.growth_rate
    }

    /// `amount * (1 + growth_rate)^(year - reference_year)`
    pub fn amount_at(&self, year: Year) -> Result<Money, ValueError> {
        if year < self.reference_year {
            return Err(ValueError::YearBeforeReference {
                year,
                reference_year: self.reference_year,
            });
        }
        // Placeholder values are often written with an arbitrary reference year
        if self.amount.amount.is_zero() {
            return Ok(self.amount);
        }
        let years = i64::from(year) - i64::from(self.reference_year);
        let factor = growth_factor(self.growth_rate, years)?;
        self.amount
            .amount
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.amount.currency))
            .ok_or(ValueError::Overflow { years })
    }
}
