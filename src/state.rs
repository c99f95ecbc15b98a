//! Typed session state shared by the pipeline stages for one run.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

/// Validated inputs handed over by a collector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    pub income: f64,
    pub debt: f64,
}

/// The current mortgage rate as reported by an external source.
///
/// The raw text is kept as-is; `percent` is a best-effort extraction and may
/// be absent when the source did not mention a recognizable percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRate {
    pub raw: String,
    pub percent: Option<f64>,
}

impl LoanRate {
    pub fn from_text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let percent = extract_percent(&raw);
        Self { raw, percent }
    }
}

impl fmt::Display for LoanRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent {
            Some(p) => write!(f, "{p:.2}%"),
            None => write!(f, "{}", self.raw.trim()),
        }
    }
}

/// A figure followed by `%`, `percent` or `pct`. The leading group keeps
/// `6,875%` from matching as `875%`; a comma inside the figure is read as a
/// decimal separator.
static PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\d.,])(\d+(?:[.,]\d+)?)\s*(?:%|percent\b|pct\b)")
        .expect("percent pattern is valid")
});

/// Percentages outside this range are changes or fees, not a mortgage rate.
const PLAUSIBLE_RATE: std::ops::RangeInclusive<f64> = 1.0..=20.0;

/// First percentage in the text that could be a mortgage rate, if any.
///
/// Snippets like `Rates fell 0.25% to 6.87%` mention the move before the
/// level, so figures outside [`PLAUSIBLE_RATE`] are skipped rather than
/// taken as the rate.
fn extract_percent(text: &str) -> Option<f64> {
    PERCENT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().replace(',', ".").parse::<f64>().ok())
        .find(|v| PLAUSIBLE_RATE.contains(v))
}

/// Outcome label of the decision stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Conditional Approval")]
    ConditionalApproval,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "Approved"),
            Self::ConditionalApproval => write!(f, "Conditional Approval"),
        }
    }
}

/// The final summary plus its status label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub status: Status,
    pub summary: String,
}

/// Everything the stages know about the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub income: Option<f64>,
    pub debt: Option<f64>,
    pub dti_ratio: Option<f64>,
    pub current_loan_rate: Option<LoanRate>,
    pub final_decision: Option<Decision>,
}

impl SessionState {
    /// Fresh state seeded with collected inputs.
    pub fn with_inputs(inputs: LoanInputs) -> Self {
        Self {
            income: Some(inputs.income),
            debt: Some(inputs.debt),
            ..Self::default()
        }
    }

    pub fn require_income(&self) -> Result<f64, ScreenError> {
        self.income.ok_or(ScreenError::MissingState("income"))
    }

    pub fn require_debt(&self) -> Result<f64, ScreenError> {
        self.debt.ok_or(ScreenError::MissingState("debt"))
    }

    pub fn require_dti(&self) -> Result<f64, ScreenError> {
        self.dti_ratio.ok_or(ScreenError::MissingState("dti_ratio"))
    }

    pub fn require_rate(&self) -> Result<&LoanRate, ScreenError> {
        self.current_loan_rate
            .as_ref()
            .ok_or(ScreenError::MissingState("current_loan_rate"))
    }
}
