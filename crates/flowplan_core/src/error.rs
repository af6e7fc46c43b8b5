use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::{CashflowId, CorpusId, EntityRef, ExpenseId, Year, YearRange};

/// Errors from evaluating a value at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("year {year} is before the reference year {reference_year}")]
    YearBeforeReference { year: Year, reference_year: Year },
    #[error("compounding over {years} years overflows")]
    Overflow { years: i64 },
    #[error("division by zero")]
    DivisionByZero,
    #[error("amount exceeds the representable decimal range")]
    AmountOverflow,
}

/// Invalid configuration, detected eagerly before any year is simulated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("allocation {window} split ratios sum to {sum}, expected 1")]
    SplitRatioSum { window: YearRange, sum: Decimal },
    #[error("allocation {0} has an empty split")]
    EmptySplit(YearRange),
    #[error("allocation {0} is inverted")]
    InvertedAllocation(YearRange),
    #[error("{entity} has an inverted window {window}")]
    InvertedWindow { entity: EntityRef, window: YearRange },
    #[error("simulation window {0} is inverted")]
    InvertedSimulationWindow(YearRange),
    #[error("cashflow {cashflow} has overlapping allocations {first} and {second}")]
    OverlappingAllocations {
        cashflow: CashflowId,
        first: YearRange,
        second: YearRange,
    },
    #[error("expense {0} has no funding corpora")]
    NoFundingCorpora(ExpenseId),
    #[error("corpus {0} is defined more than once")]
    DuplicateCorpus(CorpusId),
    #[error("corpus {corpus} referenced by {referrer} not found")]
    UnknownCorpus { corpus: CorpusId, referrer: EntityRef },
    #[error("invalid currency code {0:?}")]
    InvalidCurrency(String),
    #[error("{entity} uses {found} but the simulation currency is {expected}")]
    CurrencyMismatch {
        entity: EntityRef,
        expected: String,
        found: String,
    },
}

/// Fatal errors that abort a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{entity} in year {year}: {source}")]
    Value {
        entity: EntityRef,
        year: Year,
        #[source]
        source: ValueError,
    },
    #[error("{referrer} references missing corpus {corpus} in year {year}")]
    MissingCorpus {
        corpus: CorpusId,
        referrer: EntityRef,
        year: Year,
    },
    #[error(
        "corpus {corpus} ends in {year} but neither its successor {} nor the fallback corpus {fallback} exists",
        .successor.as_ref().map(CorpusId::as_str).unwrap_or("(none)")
    )]
    UnresolvedSuccessor {
        corpus: CorpusId,
        successor: Option<CorpusId>,
        fallback: CorpusId,
        year: Year,
    },
}

impl SimulationError {
    pub(crate) fn value(entity: impl Into<EntityRef>, year: Year, source: ValueError) -> Self {
        SimulationError::Value {
            entity: entity.into(),
            year,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
