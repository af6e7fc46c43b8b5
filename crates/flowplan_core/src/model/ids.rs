//! Unique identifiers for simulation entities
//!
//! Each entity type has its own ID type to provide type safety and prevent
//! mixing up different kinds of identifiers. IDs are the human-readable names
//! used in configuration files ("savings-bank", "my-salary", ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A simulation year (same width as `jiff::civil::Date::year`)
pub type Year = i16;

/// An inclusive range of years, the active window of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRange {
    pub start_year: Year,
    pub end_year: Year,
}

impl YearRange {
    pub const fn new(start_year: Year, end_year: Year) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    pub fn contains(&self, year: Year) -> bool {
        self.start_year <= year && year <= self.end_year
    }

    /// Two ranges overlap if they share at least one year
    pub fn overlaps(&self, other: &YearRange) -> bool {
        self.start_year <= other.end_year && other.start_year <= self.end_year
    }

    pub fn is_inverted(&self) -> bool {
        self.start_year > self.end_year
    }

    /// Number of years in the range (0 when inverted)
    pub fn len(&self) -> usize {
        if self.is_inverted() {
            0
        } else {
            (self.end_year as i32 - self.start_year as i32 + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn years(&self) -> std::ops::RangeInclusive<Year> {
        self.start_year..=self.end_year
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start_year, self.end_year)
    }
}

/// Unique identifier for a Corpus within a simulation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusId(pub String);

/// Unique identifier for a Cashflow within a simulation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashflowId(pub String);

/// Unique identifier for an Expense within a simulation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(CorpusId);
string_id!(CashflowId);
string_id!(ExpenseId);

/// Reference to any entity, used to attribute errors and ledger entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum EntityRef {
    Corpus(CorpusId),
    Cashflow(CashflowId),
    Expense(ExpenseId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Corpus(id) => write!(f, "corpus {id}"),
            EntityRef::Cashflow(id) => write!(f, "cashflow {id}"),
            EntityRef::Expense(id) => write!(f, "expense {id}"),
        }
    }
}

impl From<CorpusId> for EntityRef {
    fn from(id: CorpusId) -> Self {
        EntityRef::Corpus(id)
    }
}

impl From<CashflowId> for EntityRef {
    fn from(id: CashflowId) -> Self {
        EntityRef::Cashflow(id)
    }
}

impl From<ExpenseId> for EntityRef {
    fn from(id: ExpenseId) -> Self {
        EntityRef::Expense(id)
    }
}
