use async_trait::async_trait;

use super::{Phase, Stage, StageReport};
use crate::consts::{DTI_THRESHOLD, format_money};
use crate::error::ScreenError;
use crate::state::{Decision, LoanRate, SessionState, Status};

/// `Approved` strictly below the threshold, `Conditional Approval` at or above it.
pub fn decide(dti_ratio: f64, threshold: f64) -> Status {
    if dti_ratio < threshold {
        Status::Approved
    } else {
        Status::ConditionalApproval
    }
}

/// Human-readable summary of a screening run.
pub fn summarize(
    income: f64,
    debt: f64,
    dti_ratio: f64,
    rate: &LoanRate,
    status: Status,
) -> String {
    format!(
        "Loan prescreening summary\n\
         \x20 Monthly income:  ${}\n\
         \x20 Monthly debt:    ${}\n\
         \x20 DTI ratio:       {dti_ratio:.2}%\n\
         \x20 Current rate:    {rate}\n\
         \x20 Status:          {status}",
        format_money(income),
        format_money(debt),
    )
}

/// Last stage: applies the DTI threshold and writes the final decision.
pub struct DecisionMaker {
    threshold: f64,
}

impl DecisionMaker {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for DecisionMaker {
    fn default() -> Self {
        Self::new(DTI_THRESHOLD)
    }
}

#[async_trait]
impl Stage for DecisionMaker {
    fn name(&self) -> &str {
        "decision_maker"
    }

    fn phase(&self) -> Phase {
        Phase::Deciding
    }

    async fn run(&self, state: &mut SessionState) -> Result<StageReport, ScreenError> {
        let dti = state.require_dti()?;
        let rate = state.require_rate()?;
        let income = state.require_income()?;
        let debt = state.require_debt()?;

        let status = decide(dti, self.threshold);
        let summary = summarize(income, debt, dti, rate, status);
        state.final_decision = Some(Decision {
            status,
            summary: summary.clone(),
        });
        Ok(StageReport::Continue(summary))
    }
}
