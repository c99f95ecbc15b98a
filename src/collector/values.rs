use async_trait::async_trait;

use super::{Collector, validate};
use crate::error::ScreenError;
use crate::state::LoanInputs;

/// Income and debt already known as numbers, e.g. from `--income`/`--debt`.
pub struct ValueCollector {
    income: f64,
    debt: f64,
}

impl ValueCollector {
    pub fn new(income: f64, debt: f64) -> Self {
        Self { income, debt }
    }
}

#[async_trait]
impl Collector for ValueCollector {
    async fn collect(&self) -> Result<LoanInputs, ScreenError> {
        validate(self.income, self.debt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_values_through() {
        let inputs = ValueCollector::new(1234.56, 0.0).collect().await.unwrap();
        assert_eq!(inputs, LoanInputs { income: 1234.56, debt: 0.0 });
    }

    #[tokio::test]
    async fn keeps_full_precision() {
        let inputs = ValueCollector::new(1e-7, 1e12).collect().await.unwrap();
        assert_eq!(inputs.income, 1e-7);
        assert_eq!(inputs.debt, 1e12);
    }

    #[tokio::test]
    async fn negative_income_reaches_the_pipeline() {
        let inputs = ValueCollector::new(-100.0, 50.0).collect().await.unwrap();
        assert_eq!(inputs.income, -100.0);
    }

    #[tokio::test]
    async fn rejects_negative_debt() {
        let err = ValueCollector::new(5000.0, -1.0).collect().await.unwrap_err();
        assert!(err.to_string().contains("debt cannot be negative"));
    }
}
