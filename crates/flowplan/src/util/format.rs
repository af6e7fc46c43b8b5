use flowplan_core::model::Money;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Format a money value in compact form (e.g., ₹1.2Cr, ₹45.0L, $2.1M, $450K, $50)
///
/// Rupees use lakh and crore; every other currency uses thousands, millions
/// and billions.
pub fn format_compact_currency(value: Money) -> String {
    let amount = value.amount.to_f64().unwrap_or(0.0);
    let abs_value = amount.abs();
    let sign = if amount < 0.0 { "-" } else { "" };
    let symbol = match value.currency.symbol() {
        Some(symbol) => symbol.to_string(),
        None => format!("{} ", value.currency),
    };

    if value.currency.uses_indian_grouping() {
        if abs_value >= 10_000_000.0 {
            format!("{sign}{symbol}{:.1}Cr", abs_value / 10_000_000.0)
        } else if abs_value >= 100_000.0 {
            format!("{sign}{symbol}{:.1}L", abs_value / 100_000.0)
        } else if abs_value >= 1_000.0 {
            format!("{sign}{symbol}{:.0}K", abs_value / 1_000.0)
        } else {
            format!("{sign}{symbol}{:.0}", abs_value)
        }
    } else if abs_value >= 1_000_000_000.0 {
        format!("{sign}{symbol}{:.1}B", abs_value / 1_000_000_000.0)
    } else if abs_value >= 1_000_000.0 {
        format!("{sign}{symbol}{:.1}M", abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{sign}{symbol}{:.0}K", abs_value / 1_000.0)
    } else {
        format!("{sign}{symbol}{:.0}", abs_value)
    }
}

/// Format a rate as a percentage (0.06 -> 6.00%)
pub fn format_percentage(rate: Decimal) -> String {
    format!("{:.2}%", rate * Decimal::ONE_HUNDRED)
}
