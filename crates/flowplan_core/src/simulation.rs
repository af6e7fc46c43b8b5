use crate::config::SimulationPlan;
use crate::error::Result;
use crate::model::{SimulationResult, YearResult};
use crate::simulation_state::SimulationState;

/// Run a plan year by year and collect the results.
///
/// Each year runs five phases in a fixed order: appreciate, allocate, deduct,
/// snapshot, succeed. Shortfalls are collected as warnings; configuration
/// problems abort the run with no partial result.
pub fn simulate(plan: &SimulationPlan) -> Result<SimulationResult> {
    plan.validate()?;
    let mut state = SimulationState::from_plan(plan);

    tracing::info!(
        start_year = state.timeline.start_year,
        end_year = state.timeline.end_year,
        corpora = plan.corpora.len(),
        cashflows = plan.cashflows.len(),
        expenses = plan.expenses.len(),
        "starting simulation"
    );

    for year in plan.window.years() {
        state.timeline.current_year = year;
        advance_year(&mut state, plan, year)?;
    }

    tracing::info!(
        years = state.history.years.len(),
        warnings = state.history.warnings.len(),
        ledger_entries = state.history.ledger.len(),
        "simulation finished"
    );

    Ok(state.into_result())
}

fn advance_year(state: &mut SimulationState, plan: &SimulationPlan, year: i16) -> Result<()> {
    state.appreciate_corpora(year)?;
    let cashflow_allocations = state.allocate_cashflows(&plan.cashflows, year)?;
    state.deduct_expenses(&plan.expenses, year)?;

    let corpora = state.snapshot(year)?;
    state.history.years.push(YearResult {
        year,
        corpora,
        cashflow_allocations,
    });

    state.succeed_corpora(year)
}
