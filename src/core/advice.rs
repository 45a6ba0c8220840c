use std::fmt::Write;

use super::types::{AllocationAmounts, AllocationSplit, AssetClass, RiskBracket};

pub const CURRENCY_SYMBOL: &str = "₹";

/// What the profile block reports as the basis of the split.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Basis<'a> {
    Goal(&'a str),
    Risk(RiskBracket),
}

pub(crate) struct AdviceInput<'a> {
    pub age: u32,
    pub monthly_income: f64,
    pub profession: &'a str,
    pub region: &'a str,
    pub basis: Basis<'a>,
}

/// Whole amounts print without decimals, anything else with two.
pub fn format_money(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{CURRENCY_SYMBOL}{value:.0}")
    } else {
        format!("{CURRENCY_SYMBOL}{value:.2}")
    }
}

pub fn allocation_line(pct: u32, amount: i64) -> String {
    format!("{pct}% (~{CURRENCY_SYMBOL}{amount})")
}

pub(crate) fn render_advice(
    input: &AdviceInput<'_>,
    split: AllocationSplit,
    amounts: AllocationAmounts,
) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "## Investment Advice");
    let _ = writeln!(out, "Based on your profile:");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Age: {}", input.age);
    let _ = writeln!(out, "- Income: {}", format_money(input.monthly_income));
    let _ = writeln!(out, "- Profession: {}", input.profession);
    let _ = writeln!(out, "- Region: {}", input.region);
    match input.basis {
        Basis::Goal(goal) => {
            let _ = writeln!(out, "- Goal: {goal}");
        }
        Basis::Risk(bracket) => {
            let _ = writeln!(out, "- Risk profile: {bracket}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "**Suggested allocation:**");
    for class in AssetClass::ALL {
        let _ = writeln!(
            out,
            "- {}% in {} (~{CURRENCY_SYMBOL}{})",
            split.pct(class),
            class.label(),
            amounts.amount(class)
        );
    }
    out
}
