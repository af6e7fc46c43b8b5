mod cashflow;
mod corpus;
mod decimal;
mod expense;
mod ids;
mod inflation;
mod money;
mod results;
mod state_event;

pub use cashflow::{Allocation, AllocationSplit, Cashflow};
pub use corpus::Corpus;
pub use decimal::{DecimalContext, Rounding};
pub use expense::{
    CorpusBalances, Deduction, DeductionPlan, Expense, FundingCorpus, FundingPortion, Shortfall,
};
pub use ids::{CashflowId, CorpusId, EntityRef, ExpenseId, Year, YearRange};
pub use inflation::InflationAdjustableValue;
pub use money::{Currency, Money};
pub use results::{
    AllocationShare, CashflowAllocationResult, CorpusSummary, SimulationResult,
    SimulationWarning, Valuation, YearResult,
};
pub use state_event::{LedgerEntry, StateEvent};
