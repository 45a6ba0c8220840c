use super::types::{Goal, UserProfile};
use crate::error::{Error, Result};

pub const MIN_AGE: u32 = 18;

/// Profile as it arrives from an outer surface, before any checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRequest {
    pub age: Option<u32>,
    pub monthly_income: Option<f64>,
    pub profession: Option<String>,
    pub region: Option<String>,
    pub goal: Option<String>,
}

impl ProfileRequest {
    /// Checks the fields the engine deliberately accepts unchecked. Goals must
    /// be a known label (aliases are canonicalized); a blank goal selects the
    /// age-bracket tables.
    pub fn validate(self) -> Result<UserProfile> {
        let age = self
            .age
            .ok_or_else(|| Error::Validation("age is required".to_string()))?;
        if age < MIN_AGE {
            return Err(Error::Validation(format!("age must be >= {MIN_AGE}")));
        }

        let monthly_income = self
            .monthly_income
            .ok_or_else(|| Error::Validation("monthlyIncome is required".to_string()))?;
        if !monthly_income.is_finite() || monthly_income < 0.0 {
            return Err(Error::Validation(
                "monthlyIncome must be a non-negative number".to_string(),
            ));
        }

        let profession = required_text(self.profession, "profession")?;
        let region = required_text(self.region, "region")?;

        let goal = match self.goal.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => match Goal::from_label(label) {
                Some(goal) => Some(goal.label().to_string()),
                None => {
                    let known: Vec<&str> = Goal::ALL.iter().map(|g| g.label()).collect();
                    return Err(Error::Validation(format!(
                        "unrecognized goal {label:?}; expected one of: {}",
                        known.join(", ")
                    )));
                }
            },
        };

        Ok(UserProfile {
            age,
            monthly_income,
            profession,
            region,
            goal,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("{field} is required"))),
    }
}
