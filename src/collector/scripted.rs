use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Collector, validate};
use crate::error::ScreenError;
use crate::state::LoanInputs;

/// A scripted collector for tests. Returns pre-defined inputs in order.
pub struct ScriptedCollector {
    inputs: Vec<(f64, f64)>,
    index: AtomicUsize,
}

impl ScriptedCollector {
    pub fn new(inputs: Vec<(f64, f64)>) -> Self {
        Self {
            inputs,
            index: AtomicUsize::new(0),
        }
    }

    pub fn single(income: f64, debt: f64) -> Self {
        Self::new(vec![(income, debt)])
    }
}

#[async_trait]
impl Collector for ScriptedCollector {
    async fn collect(&self) -> Result<LoanInputs, ScreenError> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let &(income, debt) = self.inputs.get(i).ok_or_else(|| {
            ScreenError::InvalidInput(format!(
                "ScriptedCollector: no more inputs (called {} times)",
                i + 1
            ))
        })?;
        validate(income, debt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yields_inputs_in_order_then_fails() {
        let collector = ScriptedCollector::new(vec![(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(collector.collect().await.unwrap().income, 1.0);
        assert_eq!(collector.collect().await.unwrap().debt, 4.0);
        assert!(collector.collect().await.is_err());
    }
}
