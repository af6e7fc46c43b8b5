//! Money value type
//!
//! `Money` is an exact decimal amount tagged with a currency. Arithmetic never
//! changes the currency; a simulation runs in a single currency, validated when
//! the plan is built.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::decimal::DecimalContext;
use crate::error::ConfigError;

/// Three-letter currency code ("INR", "USD", ...)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const INR: Currency = Currency(*b"INR");
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const GBP: Currency = Currency(*b"GBP");
    pub const JPY: Currency = Currency(*b"JPY");

    pub fn as_str(&self) -> &str {
        // Only ever built from ASCII letters
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    pub fn symbol(&self) -> Option<&'static str> {
        match &self.0 {
            b"INR" => Some("₹"),
            b"USD" => Some("$"),
            b"EUR" => Some("€"),
            b"GBP" => Some("£"),
            b"JPY" => Some("¥"),
            _ => None,
        }
    }

    /// Indian numbering groups the last three digits, then pairs (12,34,567)
    pub fn uses_indian_grouping(&self) -> bool {
        self == &Currency::INR
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::INR
    }
}

impl FromStr for Currency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        match bytes {
            [a, b, c] if bytes.iter().all(u8::is_ascii_alphabetic) => Ok(Currency([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(ConfigError::InvalidCurrency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.as_str())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decimal amount of a single currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Sum of `items`, zero when empty
    pub fn sum<I: IntoIterator<Item = Money>>(items: I, currency: Currency) -> Self {
        items.into_iter().fold(Money::zero(currency), |acc, m| acc + m)
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// The smaller of two amounts of the same currency
    pub fn min(self, other: Money) -> Money {
        debug_assert_eq!(self.currency, other.currency);
        if other.amount < self.amount { other } else { self }
    }

    /// The larger of two amounts of the same currency
    pub fn max(self, other: Money) -> Money {
        debug_assert_eq!(self.currency, other.currency);
        if other.amount > self.amount { other } else { self }
    }

    /// Clamp negative amounts to zero
    pub fn positive_part(self) -> Money {
        self.max(Money::zero(self.currency))
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        debug_assert_eq!(self.currency, rhs.currency);
        self.amount
            .checked_add(rhs.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        debug_assert_eq!(self.currency, rhs.currency);
        self.amount
            .checked_sub(rhs.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    pub fn checked_mul(self, factor: Decimal) -> Option<Money> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    pub fn checked_div(self, divisor: Decimal) -> Option<Money> {
        self.amount
            .checked_div(divisor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Equality after rounding both amounts with `ctx`
    pub fn quantized_eq(&self, other: &Money, ctx: &DecimalContext) -> bool {
        self.currency == other.currency && ctx.quantized_eq(self.amount, other.amount)
    }

    /// True if the amount rounds to zero under `ctx`
    pub fn is_negligible(&self, ctx: &DecimalContext) -> bool {
        ctx.is_zero(self.amount)
    }

    /// Locale-aware display: `₹12,34,567.89`, `$1,234,567.89`, `CHF 1,234.50`
    pub fn format(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        let grouped = group_digits(whole, self.currency.uses_indian_grouping());

        match self.currency.symbol() {
            Some(symbol) => format!("{sign}{symbol}{grouped}.{cents}"),
            None => format!("{sign}{} {grouped}.{cents}", self.currency),
        }
    }
}

fn group_digits(whole: &str, indian: bool) -> String {
    let len = whole.len();
    if len <= 3 {
        return whole.to_string();
    }

    let (head, tail) = whole.split_at(len - 3);
    let group = if indian { 2 } else { 3 };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency);
        Money::new(self.amount + rhs.amount, self.currency)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency);
        Money::new(self.amount - rhs.amount, self.currency)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Money {
        Money::new(self.amount * rhs, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" INR ".parse::<Currency>().unwrap(), Currency::INR);
        assert!("US".parse::<Currency>().is_err());
        assert!("US1".parse::<Currency>().is_err());
        assert_eq!("CHF".parse::<Currency>().unwrap().to_string(), "CHF");
    }

    #[test]
    fn test_arithmetic_keeps_currency() {
        let a = Money::new(dec!(10.50), Currency::USD);
        let b = Money::new(dec!(2.25), Currency::USD);
        assert_eq!(a + b, Money::new(dec!(12.75), Currency::USD));
        assert_eq!(a - b, Money::new(dec!(8.25), Currency::USD));
        assert_eq!((a * dec!(2)).currency, Currency::USD);
        assert_eq!(-a, Money::new(dec!(-10.50), Currency::USD));
    }

    #[test]
    fn test_ordering_requires_same_currency() {
        let a = Money::new(dec!(1), Currency::USD);
        let b = Money::new(dec!(2), Currency::EUR);
        assert_eq!(a.partial_cmp(&b), None);
        assert!(inr(dec!(1)) < inr(dec!(2)));
        assert_eq!(inr(dec!(5)).min(inr(dec!(3))), inr(dec!(3)));
        assert_eq!(inr(dec!(-5)).positive_part(), inr(dec!(0)));
    }

    #[test]
    fn test_quantized_comparisons() {
        let ctx = DecimalContext::default();
        assert!(inr(dec!(0.001)).is_negligible(&ctx));
        assert!(inr(dec!(100.001)).quantized_eq(&inr(dec!(100)), &ctx));
        assert!(!inr(dec!(100)).quantized_eq(&Money::new(dec!(100), Currency::USD), &ctx));
    }

    #[test]
    fn test_format_indian_grouping() {
        assert_eq!(inr(dec!(1234567.891)).format(), "₹12,34,567.89");
        assert_eq!(inr(dec!(150000)).format(), "₹1,50,000.00");
        assert_eq!(inr(dec!(999)).format(), "₹999.00");
        assert_eq!(inr(dec!(-3000000)).format(), "-₹30,00,000.00");
    }

    #[test]
    fn test_format_western_grouping() {
        assert_eq!(
            Money::new(dec!(1234567.005), Currency::USD).to_string(),
            "$1,234,567.01"
        );
        assert_eq!(
            Money::new(dec!(1234.5), "CHF".parse().unwrap()).to_string(),
            "CHF 1,234.50"
        );
        assert_eq!(Money::new(dec!(-0.001), Currency::GBP).to_string(), "£0.00");
    }

    #[test]
    fn test_sum() {
        let total = Money::sum([inr(dec!(1)), inr(dec!(2.5))], Currency::INR);
        assert_eq!(total, inr(dec!(3.5)));
        assert_eq!(Money::sum([], Currency::INR), inr(dec!(0)));
    }
}
