//! Cashflow and Allocation definitions
//!
//! A cashflow is a recurring inflow (salary, rent) whose yearly proceeds are
//! split among corpora. The split can change over time: each `Allocation`
//! covers a window of years and a cashflow holds non-overlapping allocations.
//!
//! ```text
//! 2025..=2030 => 60% savings-bank, 40% large-cap-fund
//! 2031..=2060 => 20% savings-bank, 80% large-cap-fund
//! ```

use rust_decimal::Decimal;

use super::decimal::DecimalContext;
use super::ids::{CashflowId, CorpusId, EntityRef, Year, YearRange};
use super::inflation::InflationAdjustableValue;
use super::money::Money;
use crate::error::{ConfigError, ValueError};

/// One corpus's share of an allocation
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSplit {
    pub corpus_id: CorpusId,
    pub ratio: Decimal,
}

/// How a cashflow's proceeds are split during a window of years
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    window: YearRange,
    split: Vec<AllocationSplit>,
}

impl Allocation {
    /// Ratios must sum to exactly one after quantization
    pub fn new(
        window: YearRange,
        split: Vec<AllocationSplit>,
        ctx: &DecimalContext,
    ) -> Result<Self, ConfigError> {
        if window.is_inverted() {
            return Err(ConfigError::InvertedAllocation(window));
        }
        if split.is_empty() {
            return Err(ConfigError::EmptySplit(window));
        }
        let sum: Decimal = split.iter().map(|s| s.ratio).sum();
        if !ctx.quantized_eq(sum, Decimal::ONE) {
            return Err(ConfigError::SplitRatioSum { window, sum });
        }
        Ok(Self { window, split })
    }

    pub fn window(&self) -> YearRange {
        self.window
    }

    pub fn split(&self) -> &[AllocationSplit] {
        &self.split
    }

    pub fn contains(&self, year: Year) -> bool {
        self.window.contains(year)
    }

    pub fn overlaps(&self, other: &Allocation) -> bool {
        self.window.overlaps(&other.window)
    }

    /// Split `amount` by ratio, in split order
    pub fn distribute(&self, amount: Money) -> Result<Vec<(&CorpusId, Money)>, ValueError> {
        self.split
            .iter()
            .map(|s| {
                amount
                    .checked_mul(s.ratio)
                    .map(|share| (&s.corpus_id, share))
                    .ok_or(ValueError::AmountOverflow)
            })
            .collect()
    }
}

/// A recurring inflow
#[derive(Debug, Clone)]
pub struct Cashflow {
    pub id: CashflowId,
    pub enabled: bool,
    pub window: YearRange,
    pub recurring: InflationAdjustableValue,
    allocations: Vec<Allocation>,
    pub description: String,
}

impl Cashflow {
    /// Rejects inverted windows and any pair of overlapping allocations
    pub fn new(
        id: CashflowId,
        enabled: bool,
        window: YearRange,
        recurring: InflationAdjustableValue,
        allocations: Vec<Allocation>,
        description: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if window.is_inverted() {
            return Err(ConfigError::InvertedWindow {
                entity: EntityRef::Cashflow(id),
                window,
            });
        }
        for (i, first) in allocations.iter().enumerate() {
            if let Some(second) = allocations[i + 1..].iter().find(|a| first.overlaps(a)) {
                return Err(ConfigError::OverlappingAllocations {
                    cashflow: id,
                    first: first.window,
                    second: second.window,
                });
            }
        }

        Ok(Self {
            id,
            enabled,
            window,
            recurring,
            allocations,
            description: description.into(),
        })
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn is_active(&self, year: Year) -> bool {
        self.enabled && self.window.contains(year)
    }

    /// The allocation covering `year`, if the cashflow is active and one exists
    pub fn allocation_for(&self, year: Year) -> Option<&Allocation> {
        if !self.is_active(year) {
            return None;
        }
        self.allocations.iter().find(|a| a.contains(year))
    }

    pub fn amount_for(&self, year: Year) -> Result<Money, ValueError> {
        self.recurring.amount_at(year)
    }
}
