use async_trait::async_trait;

use super::{Phase, Stage, StageReport};
use crate::error::ScreenError;
use crate::state::SessionState;

/// Inline validation failure of the DTI calculation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtiError {
    #[error("Error: Monthly income must be greater than zero.")]
    NonPositiveIncome,
}

/// Debt-to-income ratio as a percentage. `None` unless income is positive.
pub fn dti_ratio(monthly_income: f64, monthly_debt: f64) -> Option<f64> {
    if monthly_income <= 0.0 || !monthly_income.is_finite() {
        return None;
    }
    Some(monthly_debt / monthly_income * 100.0)
}

/// Compute the DTI ratio and record it, with its inputs, in `state`.
///
/// On a non-positive income the state is left untouched.
pub fn calculate_debt_to_income(
    state: &mut SessionState,
    monthly_income: f64,
    monthly_debt: f64,
) -> Result<String, DtiError> {
    let dti = dti_ratio(monthly_income, monthly_debt).ok_or(DtiError::NonPositiveIncome)?;
    state.dti_ratio = Some(dti);
    state.income = Some(monthly_income);
    state.debt = Some(monthly_debt);
    Ok(format!("DTI ratio calculated as {dti:.2}%."))
}

/// First stage: turns the collected income and debt into a DTI ratio.
pub struct DtiCalculator;

#[async_trait]
impl Stage for DtiCalculator {
    fn name(&self) -> &str {
        "dti_calculator"
    }

    fn phase(&self) -> Phase {
        Phase::Calculating
    }

    async fn run(&self, state: &mut SessionState) -> Result<StageReport, ScreenError> {
        let income = state.require_income()?;
        let debt = state.require_debt()?;
        match calculate_debt_to_income(state, income, debt) {
            Ok(message) => Ok(StageReport::Continue(message)),
            Err(e) => Ok(StageReport::Halt(e.to_string())),
        }
    }
}
