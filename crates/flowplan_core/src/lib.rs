//! Household cashflow simulation library
//!
//! This crate projects net worth year by year. It supports:
//! - Named pools of money (corpora) with their own growth rates and windows
//! - Recurring inflows split among corpora by time-partitioned allocations
//! - One-time and recurring expenses funded by a priority waterfall
//! - Corpus succession when a corpus reaches its end year
//! - Exact decimal money with explicit rounding for comparisons
//!
//! # Builder DSL
//!
//! ```ignore
//! use flowplan_core::config::{SimulationBuilder, CorpusBuilder, CashflowBuilder, ExpenseBuilder};
//! use flowplan_core::simulate;
//! use rust_decimal_macros::dec;
//!
//! let plan = SimulationBuilder::new()
//!     .years(2025, 2060)
//!     .corpus(CorpusBuilder::new("bank").balance(dec!(500000)).growth(dec!(0.03)))
//!     .cashflow(CashflowBuilder::new("salary").amount(dec!(1200000)).split(&[("bank", dec!(1))]))
//!     .expense(ExpenseBuilder::new("living").recurring(dec!(600000)).growth(dec!(0.06)))
//!     .build()?;
//! let result = simulate(&plan)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod simulation;
pub mod simulation_state;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{
    CashflowBuilder, CorpusBuilder, ExpenseBuilder, SimulationBuilder, SimulationConfig,
    SimulationPlan,
};
pub use error::{ConfigError, SimulationError, ValueError};
pub use simulation::simulate;
