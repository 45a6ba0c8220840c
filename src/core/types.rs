use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Investment objective selecting one of the fixed allocation tables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Goal {
    #[serde(rename = "Wealth Accumulation")]
    WealthAccumulation,
    #[serde(rename = "Retirement Planning")]
    RetirementPlanning,
    #[serde(rename = "Short-term Savings")]
    ShortTermSavings,
    #[serde(rename = "Tax Saving (ELSS)")]
    TaxSaving,
}

impl Goal {
    pub const ALL: [Goal; 4] = [
        Goal::WealthAccumulation,
        Goal::RetirementPlanning,
        Goal::ShortTermSavings,
        Goal::TaxSaving,
    ];

    /// Strict label lookup. Accepts the canonical labels plus the aliases the
    /// dashboard historically offered ("Short-term", "ELSS Tax Saving").
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Wealth Accumulation" => Some(Goal::WealthAccumulation),
            "Retirement Planning" => Some(Goal::RetirementPlanning),
            "Short-term Savings" | "Short-term" => Some(Goal::ShortTermSavings),
            "Tax Saving (ELSS)" | "ELSS Tax Saving" => Some(Goal::TaxSaving),
            _ => None,
        }
    }

    /// Lenient lookup used by the engine: anything unrecognized lands in the
    /// highest-equity table.
    pub fn classify(label: &str) -> Self {
        Self::from_label(label).unwrap_or(Goal::TaxSaving)
    }

    pub fn label(self) -> &'static str {
        match self {
            Goal::WealthAccumulation => "Wealth Accumulation",
            Goal::RetirementPlanning => "Retirement Planning",
            Goal::ShortTermSavings => "Short-term Savings",
            Goal::TaxSaving => "Tax Saving (ELSS)",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Age-derived risk label used when no explicit goal is given.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RiskBracket {
    Aggressive,
    Balanced,
    Conservative,
}

impl RiskBracket {
    pub fn for_age(age: u32) -> Self {
        match age {
            0..=29 => RiskBracket::Aggressive,
            30..=45 => RiskBracket::Balanced,
            _ => RiskBracket::Conservative,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBracket::Aggressive => "Aggressive",
            RiskBracket::Balanced => "Balanced",
            RiskBracket::Conservative => "Conservative",
        }
    }
}

impl fmt::Display for RiskBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AssetClass {
    Equity,
    Debt,
    Gold,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [AssetClass::Equity, AssetClass::Debt, AssetClass::Gold];

    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Debt => "Debt",
            AssetClass::Gold => "Gold",
        }
    }
}

/// Caller-supplied profile. Nothing here is validated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub monthly_income: f64,
    pub profession: String,
    pub region: String,
    #[serde(default)]
    pub goal: Option<String>,
}

/// Percentage split across the three asset classes. Every table row sums to 100.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSplit {
    pub equity_pct: u32,
    pub debt_pct: u32,
    pub gold_pct: u32,
}

impl AllocationSplit {
    pub const fn new(equity_pct: u32, debt_pct: u32, gold_pct: u32) -> Self {
        Self {
            equity_pct,
            debt_pct,
            gold_pct,
        }
    }

    pub fn total(self) -> u32 {
        self.equity_pct + self.debt_pct + self.gold_pct
    }

    pub fn pct(self, class: AssetClass) -> u32 {
        match class {
            AssetClass::Equity => self.equity_pct,
            AssetClass::Debt => self.debt_pct,
            AssetClass::Gold => self.gold_pct,
        }
    }
}

/// Currency amounts per asset class. Each is rounded independently, so the
/// total can differ from the income it was derived from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationAmounts {
    pub equity: i64,
    pub debt: i64,
    pub gold: i64,
}

impl AllocationAmounts {
    pub fn total(self) -> i64 {
        self.equity + self.debt + self.gold
    }

    pub fn amount(self, class: AssetClass) -> i64 {
        match class {
            AssetClass::Equity => self.equity,
            AssetClass::Debt => self.debt,
            AssetClass::Gold => self.gold,
        }
    }
}

/// One display row of an allocation, e.g. `Equity` / `70% (~₹70000)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationLine {
    pub asset_class: &'static str,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    pub split: AllocationSplit,
    pub amounts: AllocationAmounts,
    pub goal: Option<Goal>,
    pub risk_label: Option<RiskBracket>,
    pub advice_text: String,
}

impl AllocationResult {
    /// Display lines in asset-class order.
    pub fn allocation_lines(&self) -> Vec<AllocationLine> {
        AssetClass::ALL
            .iter()
            .map(|&class| AllocationLine {
                asset_class: class.label(),
                display: super::advice::allocation_line(
                    self.split.pct(class),
                    self.amounts.amount(class),
                ),
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationResultJson<'a> {
    split: AllocationSplit,
    amounts: AllocationAmounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal: Option<Goal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_label: Option<RiskBracket>,
    allocation: Vec<AllocationLine>,
    advice_text: &'a str,
}

impl Serialize for AllocationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AllocationResultJson {
            split: self.split,
            amounts: self.amounts,
            goal: self.goal,
            risk_label: self.risk_label,
            allocation: self.allocation_lines(),
            advice_text: &self.advice_text,
        }
        .serialize(serializer)
    }
}
