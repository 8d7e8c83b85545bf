use std::fmt::Write as _;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{CostBreakdown, ScenarioComparison};

const REPORT_WIDTH: usize = 80;
const SECTION_WIDTH: usize = 60;
const TOTAL_RULE_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 23;

/// Renders an amount as `$X,XXX.XX`, rounding half-cents away from zero.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn render_breakdown(title: &str, services: &str, costs: &CostBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title.to_uppercase());
    let _ = writeln!(out, "{}", "-".repeat(SECTION_WIDTH));
    let _ = writeln!(out, "Services: {services}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Cost Breakdown:");
    for (label, amount) in [
        ("Annual Premium:", costs.premium),
        ("Copays:", costs.copays_total),
        ("Deductible:", costs.deductible_paid),
        ("Coinsurance:", costs.coinsurance_total),
        ("Total Out-of-Pocket:", costs.total_out_of_pocket),
    ] {
        let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{}", format_currency(amount));
    }
    let _ = writeln!(out, "  {}", "=".repeat(TOTAL_RULE_WIDTH));
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{}",
        "TOTAL ANNUAL COST:",
        format_currency(costs.total_annual_cost)
    );
    if costs.oop_max_reached {
        let _ = writeln!(out, "  * Out-of-pocket maximum reached");
    }
    out
}

pub fn render_comparison(comparison: &ScenarioComparison) -> String {
    let rule = "=".repeat(REPORT_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "HEALTH INSURANCE COST SCENARIOS - ANNUAL COMPARISON");
    let _ = writeln!(out, "{rule}");
    for scenario in &comparison.scenarios {
        let _ = writeln!(out);
        out.push_str(&render_breakdown(
            &scenario.title,
            &scenario.services,
            &scenario.costs,
        ));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    out
}

/// Compact one-row-per-breakdown view: title, premium, out-of-pocket, annual cost.
pub fn render_summary_table<'a>(
    rows: impl IntoIterator<Item = (&'a str, &'a CostBreakdown)>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<30} {:>14} {:>14} {:>14} {:>8}",
        "Scenario", "Premium", "Out-of-Pocket", "Annual Cost", "OOP Max"
    );
    let _ = writeln!(out, "{}", "-".repeat(30 + 14 * 3 + 8 + 4));
    for (title, costs) in rows {
        let _ = writeln!(
            out,
            "{:<30} {:>14} {:>14} {:>14} {:>8}",
            title,
            format_currency(costs.premium),
            format_currency(costs.total_out_of_pocket),
            format_currency(costs.total_annual_cost),
            if costs.oop_max_reached { "yes" } else { "no" }
        );
    }
    out
}
