use super::advice::{AdviceInput, Basis, render_advice};
use super::types::{
    AllocationAmounts, AllocationResult, AllocationSplit, Goal, RiskBracket, UserProfile,
};

const WEALTH_ACCUMULATION_SPLIT: AllocationSplit = AllocationSplit::new(70, 20, 10);
const RETIREMENT_PLANNING_SPLIT: AllocationSplit = AllocationSplit::new(50, 40, 10);
const SHORT_TERM_SAVINGS_SPLIT: AllocationSplit = AllocationSplit::new(20, 70, 10);
const TAX_SAVING_SPLIT: AllocationSplit = AllocationSplit::new(80, 10, 10);

const AGGRESSIVE_SPLIT: AllocationSplit = AllocationSplit::new(60, 20, 20);
const BALANCED_SPLIT: AllocationSplit = AllocationSplit::new(50, 30, 20);
const CONSERVATIVE_SPLIT: AllocationSplit = AllocationSplit::new(30, 50, 20);

pub fn split_for_goal(goal: Goal) -> AllocationSplit {
    match goal {
        Goal::WealthAccumulation => WEALTH_ACCUMULATION_SPLIT,
        Goal::RetirementPlanning => RETIREMENT_PLANNING_SPLIT,
        Goal::ShortTermSavings => SHORT_TERM_SAVINGS_SPLIT,
        Goal::TaxSaving => TAX_SAVING_SPLIT,
    }
}

pub fn split_for_bracket(bracket: RiskBracket) -> AllocationSplit {
    match bracket {
        RiskBracket::Aggressive => AGGRESSIVE_SPLIT,
        RiskBracket::Balanced => BALANCED_SPLIT,
        RiskBracket::Conservative => CONSERVATIVE_SPLIT,
    }
}

/// `monthly_income * pct / 100`, rounded half-to-even.
///
/// Non-finite income collapses to zero through the saturating float cast.
pub fn allocate_amount(monthly_income: f64, pct: u32) -> i64 {
    (monthly_income * f64::from(pct) / 100.0).round_ties_even() as i64
}

pub fn allocate(monthly_income: f64, split: AllocationSplit) -> AllocationAmounts {
    AllocationAmounts {
        equity: allocate_amount(monthly_income, split.equity_pct),
        debt: allocate_amount(monthly_income, split.debt_pct),
        gold: allocate_amount(monthly_income, split.gold_pct),
    }
}

/// Goal-driven recommendation. Unrecognized goal labels use the tax-saving
/// (80/10/10) table; the label is still echoed verbatim in the advice text.
pub fn recommend_by_goal(
    age: u32,
    monthly_income: f64,
    profession: &str,
    region: &str,
    goal: &str,
) -> AllocationResult {
    let classified = Goal::classify(goal);
    let split = split_for_goal(classified);
    let amounts = allocate(monthly_income, split);
    let advice_text = render_advice(
        &AdviceInput {
            age,
            monthly_income,
            profession,
            region,
            basis: Basis::Goal(goal),
        },
        split,
        amounts,
    );

    AllocationResult {
        split,
        amounts,
        goal: Some(classified),
        risk_label: None,
        advice_text,
    }
}

/// Age-bracket recommendation, ignoring any goal.
pub fn recommend_by_age(
    age: u32,
    monthly_income: f64,
    profession: &str,
    region: &str,
) -> AllocationResult {
    let bracket = RiskBracket::for_age(age);
    let split = split_for_bracket(bracket);
    let amounts = allocate(monthly_income, split);
    let advice_text = render_advice(
        &AdviceInput {
            age,
            monthly_income,
            profession,
            region,
            basis: Basis::Risk(bracket),
        },
        split,
        amounts,
    );

    AllocationResult {
        split,
        amounts,
        goal: None,
        risk_label: Some(bracket),
        advice_text,
    }
}

/// Uses the goal table when the profile carries a goal, the age brackets otherwise.
pub fn recommend(profile: &UserProfile) -> AllocationResult {
    match profile.goal.as_deref() {
        Some(goal) => recommend_by_goal(
            profile.age,
            profile.monthly_income,
            &profile.profession,
            &profile.region,
            goal,
        ),
        None => recommend_by_age(
            profile.age,
            profile.monthly_income,
            &profile.profession,
            &profile.region,
        ),
    }
}
