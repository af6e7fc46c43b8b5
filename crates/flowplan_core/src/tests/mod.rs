//! Integration tests for the flowplan simulation engine
//!
//! Tests are organized by topic:
//! - `basic` - Year loop and phase ordering
//! - `waterfall` - Expense funding, shortfalls and warnings
//! - `succession` - Corpora handing over their balance when they end
//! - `simulation_result` - Result structure, JSON shape and helper methods
//! - `builder_dsl` - Builder DSL for fluent simulation setup

mod simulation_result;
