//! Reports of a finished simulation run
//!
//! `table` is meant for people: one row per year, the first few warnings and
//! a closing summary. `json` is the full result document.

use std::fmt::{self, Write};

use flowplan_core::SimulationPlan;
use flowplan_core::model::{Currency, Money, SimulationResult, Year};

use crate::util::format::{format_compact_currency, format_percentage};

/// Warnings shown when not asked for all of them
pub const WARNING_PREVIEW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub all_warnings: bool,
    /// Also break down how cashflows were split in this year
    pub allocations_year: Option<Year>,
}

pub fn render(
    result: &SimulationResult,
    plan: &SimulationPlan,
    format: OutputFormat,
    options: ReportOptions,
) -> color_eyre::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(result, plan, options)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}

pub fn render_table(
    result: &SimulationResult,
    plan: &SimulationPlan,
    options: ReportOptions,
) -> Result<String, fmt::Error> {
    let currency = plan.currency;
    let start = plan.window.start_year;
    let mut out = String::new();

    writeln!(
        out,
        "Simulation {}-{} ({}, base inflation {})",
        start,
        plan.window.end_year,
        currency,
        format_percentage(plan.base_inflation)
    )?;
    writeln!(out)?;
    write_balances(&mut out, result, plan)?;
    write_warnings(&mut out, result, options.all_warnings)?;
    write_expenses(&mut out, plan)?;
    if let Some(year) = options.allocations_year {
        write_allocations(&mut out, result, currency, year)?;
    }

    let remaining = result.remaining();
    writeln!(out)?;
    writeln!(
        out,
        "You finished with {} extra ({} in {} terms)",
        Money::new(remaining.amount, currency),
        Money::new(remaining.inflation_adjusted, currency),
        start
    )?;
    Ok(out)
}

fn write_balances(
    out: &mut String,
    result: &SimulationResult,
    plan: &SimulationPlan,
) -> fmt::Result {
    let compact = |amount| format_compact_currency(Money::new(amount, plan.currency));

    let mut headers = vec!["Year".to_string()];
    headers.extend(plan.corpora.iter().map(|c| c.id.to_string()));
    headers.push("Net worth".to_string());
    headers.push(format!("In {} terms", plan.window.start_year));

    let rows: Vec<Vec<String>> = result
        .simulation
        .iter()
        .map(|year| {
            let mut row = vec![year.year.to_string()];
            row.extend(plan.corpora.iter().map(|c| {
                year.corpus(&c.id)
                    .map(|s| compact(s.value.amount))
                    .unwrap_or_else(|| "-".to_string())
            }));
            let net_worth = year.net_worth();
            row.push(compact(net_worth.amount));
            row.push(compact(net_worth.inflation_adjusted));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(headers[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_row(out, &headers, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

/// Year left-aligned, amounts right-aligned
fn write_row(out: &mut String, cells: &[String], widths: &[usize]) -> fmt::Result {
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        // `{:>w$}` pads by char count, which keeps ₹ columns aligned
        if i == 0 {
            write!(out, "{cell:<width$}")?;
        } else {
            write!(out, "  {cell:>width$}")?;
        }
    }
    writeln!(out)
}

fn write_warnings(out: &mut String, result: &SimulationResult, all: bool) -> fmt::Result {
    if result.warnings.is_empty() {
        return Ok(());
    }

    let total = result.warnings.len();
    let shown = if all { total } else { total.min(WARNING_PREVIEW) };

    writeln!(out)?;
    writeln!(out, "Warnings ({total}):")?;
    for warning in result.warnings.iter().take(shown) {
        writeln!(out, "  ! {warning}")?;
    }
    if shown < total {
        writeln!(out, "  ... {} more (use --all-warnings)", total - shown)?;
    }
    Ok(())
}

fn write_expenses(out: &mut String, plan: &SimulationPlan) -> fmt::Result {
    if plan.expenses.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Expenses:")?;
    for expense in &plan.expenses {
        let state = if expense.enabled { "enabled" } else { "disabled" };
        writeln!(out, "  {} ({state})", expense.id)?;
    }
    Ok(())
}

fn write_allocations(
    out: &mut String,
    result: &SimulationResult,
    currency: Currency,
    year: Year,
) -> fmt::Result {
    writeln!(out)?;
    let Some(year_result) = result.year(year) else {
        return writeln!(out, "No allocations: {year} is outside the simulation");
    };

    writeln!(out, "Allocations in {year}:")?;
    if year_result.cashflow_allocations.is_empty() {
        writeln!(out, "  none")?;
    }
    for allocation in &year_result.cashflow_allocations {
        for share in &allocation.corpora {
            writeln!(
                out,
                "  {} -> {}: {}",
                allocation.id,
                share.id,
                Money::new(share.value, currency)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_core::config::{CashflowBuilder, CorpusBuilder, ExpenseBuilder, SimulationBuilder};
    use rust_decimal_macros::dec;

    fn rent_plan(rent: rust_decimal::Decimal) -> SimulationPlan {
        SimulationBuilder::new()
            .years(2025, 2027)
            .currency(Currency::USD)
            .corpus(CorpusBuilder::new("bank").balance(dec!(1000)))
            .cashflow(
                CashflowBuilder::new("salary")
                    .amount(dec!(100))
                    .split(&[("bank", dec!(1))]),
            )
            .expense(ExpenseBuilder::new("rent").recurring(rent).funded_by("bank"))
            .expense(ExpenseBuilder::new("boat").recurring(dec!(1)).disabled())
            .build()
            .unwrap()
    }

    fn table(plan: &SimulationPlan, options: ReportOptions) -> String {
        let result = flowplan_core::simulate(plan).unwrap();
        render_table(&result, plan, options).unwrap()
    }

    #[test]
    fn test_table_rows_and_summary() {
        let out = table(&rent_plan(dec!(400)), ReportOptions::default());

        assert!(out.starts_with("Simulation 2025-2027 (USD, base inflation 0.00%)"));
        assert!(out.contains("In 2025 terms"));
        // 1000 + 100 - 400 each year: 700, 400, 100
        let rows: Vec<&str> = out.lines().filter(|l| l.starts_with("202")).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("$700"));
        assert!(rows[2].contains("$100"));

        assert!(!out.contains("Warnings"));
        assert!(out.contains("  rent (enabled)"));
        assert!(out.contains("  boat (disabled)"));
        assert!(out.ends_with("You finished with $100.00 extra ($100.00 in 2025 terms)\n"));
    }

    #[test]
    fn test_warning_preview() {
        // 500, then 0, then overshooting from 2027 on
        let plan = SimulationBuilder::new()
            .years(2025, 2030)
            .currency(Currency::USD)
            .corpus(CorpusBuilder::new("bank").balance(dec!(1000)))
            .expense(ExpenseBuilder::new("rent").recurring(dec!(500)))
            .build()
            .unwrap();

        let out = table(&plan, ReportOptions::default());
        assert!(out.contains("Warnings (4):"));
        let shown = out.lines().filter(|l| l.starts_with("  ! ")).count();
        assert_eq!(shown, WARNING_PREVIEW);
        assert!(out.contains("more (use --all-warnings)"));

        let out = table(
            &plan,
            ReportOptions {
                all_warnings: true,
                ..ReportOptions::default()
            },
        );
        let shown = out.lines().filter(|l| l.starts_with("  ! ")).count();
        let result = flowplan_core::simulate(&plan).unwrap();
        assert_eq!(shown, result.warnings.len());
        assert!(!out.contains("more (use --all-warnings)"));
    }

    #[test]
    fn test_allocation_breakdown() {
        let plan = rent_plan(dec!(0));
        let out = table(
            &plan,
            ReportOptions {
                allocations_year: Some(2026),
                ..ReportOptions::default()
            },
        );
        assert!(out.contains("Allocations in 2026:\n  salary -> bank: $100.00\n"));

        let out = table(
            &plan,
            ReportOptions {
                allocations_year: Some(2040),
                ..ReportOptions::default()
            },
        );
        assert!(out.contains("No allocations: 2040 is outside the simulation"));
    }

    #[test]
    fn test_json_report_is_result_document() {
        let plan = rent_plan(dec!(400));
        let result = flowplan_core::simulate(&plan).unwrap();
        let json = render(&result, &plan, OutputFormat::Json, ReportOptions::default()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["simulation"].as_array().unwrap().len(), 3);
        assert_eq!(value["simulation"][2]["corpora"][0]["value"]["amount"], 100.0);
        assert!(value["warnings"].as_array().unwrap().is_empty());
    }
}
