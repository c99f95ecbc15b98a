use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::Engine;
use crate::collector::Collector;
use crate::consts::{DEFAULT_RATE_QUERY, DTI_THRESHOLD};
use crate::error::ScreenError;
use crate::events::EventBus;
use crate::pipeline::{Pipeline, Screening};
use crate::rates::RateSource;
use crate::state::SessionState;

pub struct ScreenerConfig {
    pub rate_query: String,
    pub threshold: f64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            rate_query: DEFAULT_RATE_QUERY.to_string(),
            threshold: DTI_THRESHOLD,
        }
    }
}

/// Collects the two inputs, then runs calculate → fetch → decide once each.
pub struct LoanScreener {
    pipeline: Pipeline,
}

impl LoanScreener {
    pub fn new(source: Arc<dyn RateSource>, config: ScreenerConfig) -> Self {
        Self {
            pipeline: Pipeline::loan_screening(source, &config.rate_query, config.threshold),
        }
    }

    /// Report phase changes and stage messages on `events`.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.pipeline = self.pipeline.with_events(events);
        self
    }
}

#[async_trait]
impl Engine for LoanScreener {
    async fn run(&self, collector: &dyn Collector) -> Result<Screening, ScreenError> {
        let inputs = collector.collect().await?;
        info!(income = inputs.income, debt = inputs.debt, "inputs collected");

        let screening = self.pipeline.run(SessionState::with_inputs(inputs)).await?;
        info!(phase = %screening.phase, "screening finished");
        Ok(screening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::scripted::ScriptedCollector;
    use crate::rates::fixed::FixedRate;
    use crate::stages::Phase;

    #[tokio::test]
    async fn collection_failure_skips_pipeline() {
        let screener = LoanScreener::new(
            Arc::new(FixedRate::new("6%")),
            ScreenerConfig::default(),
        );
        let collector = ScriptedCollector::single(5000.0, -5.0);
        let err = screener.run(&collector).await.unwrap_err();
        assert!(matches!(err, ScreenError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn runs_to_done() {
        let screener = LoanScreener::new(
            Arc::new(FixedRate::new("6%")),
            ScreenerConfig::default(),
        );
        let screening = screener
            .run(&ScriptedCollector::single(5000.0, 1000.0))
            .await
            .unwrap();
        assert_eq!(screening.phase, Phase::Done);
    }
}
