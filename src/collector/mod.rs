//! Gathering income and debt from the caller.

pub mod prompt;
pub mod scripted;
pub mod text;
pub mod values;

use async_trait::async_trait;

use crate::error::ScreenError;
use crate::state::LoanInputs;

/// Something that can produce the two numbers a screening run needs.
/// Could be a command line, a terminal prompt, or a test script.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn collect(&self) -> Result<LoanInputs, ScreenError>;
}

/// Check that collected numbers are well-formed.
///
/// Income is only required to be a finite number here: a zero or negative
/// income is reported by the DTI stage, not rejected at collection.
pub fn validate(income: f64, debt: f64) -> Result<LoanInputs, ScreenError> {
    if !income.is_finite() {
        return Err(ScreenError::InvalidInput(format!(
            "income must be a finite number, got {income}"
        )));
    }
    if !debt.is_finite() {
        return Err(ScreenError::InvalidInput(format!(
            "debt must be a finite number, got {debt}"
        )));
    }
    if debt < 0.0 {
        return Err(ScreenError::InvalidInput(format!(
            "debt cannot be negative, got {debt}"
        )));
    }
    Ok(LoanInputs { income, debt })
}
