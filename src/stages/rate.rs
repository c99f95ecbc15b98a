use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{Phase, Stage, StageReport};
use crate::consts::DEFAULT_RATE_QUERY;
use crate::error::ScreenError;
use crate::rates::RateSource;
use crate::state::{LoanRate, SessionState};

/// Second stage: asks an external source for today's mortgage rate.
///
/// Whatever comes back is stored unvalidated. Lookup failures are not
/// handled here and propagate to the caller.
pub struct RateFetcher {
    source: Arc<dyn RateSource>,
    query: String,
}

impl RateFetcher {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            query: DEFAULT_RATE_QUERY.to_string(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }
}

#[async_trait]
impl Stage for RateFetcher {
    fn name(&self) -> &str {
        "rate_fetcher"
    }

    fn phase(&self) -> Phase {
        Phase::FetchingRate
    }

    async fn run(&self, state: &mut SessionState) -> Result<StageReport, ScreenError> {
        let text = self.source.lookup(&self.query).await?;
        debug!(source = self.source.name(), raw = %text, "rate lookup returned");

        let rate = LoanRate::from_text(text);
        let message = format!("Current loan rate: {rate}.");
        state.current_loan_rate = Some(rate);
        Ok(StageReport::Continue(message))
    }
}
