//! Ordered composition of screening stages.
//!
//! Stages run one after another over a single `&mut SessionState`. The only
//! deviation from the straight line is the halt: when a stage rejects its
//! inputs the remaining stages are skipped and the run ends in
//! [`Phase::Halted`]. Errors from a stage propagate unchanged.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ScreenError;
use crate::events::{Event, EventBus};
use crate::rates::RateSource;
use crate::stages::decision::DecisionMaker;
use crate::stages::dti::DtiCalculator;
use crate::stages::rate::RateFetcher;
use crate::stages::{Phase, Stage, StageReport};
use crate::state::{Decision, SessionState};

/// A message a stage reported on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMessage {
    pub stage: String,
    pub message: String,
}

/// The result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Screening {
    pub state: SessionState,
    pub phase: Phase,
    pub messages: Vec<StageMessage>,
    /// Set when a stage halted the run; carries its message.
    pub halted: Option<String>,
}

impl Screening {
    pub fn decision(&self) -> Option<&Decision> {
        self.state.final_decision.as_ref()
    }
}

/// A fixed sequence of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    events: Option<Arc<EventBus>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: DTI calculator, rate fetcher, decision maker.
    pub fn loan_screening(source: Arc<dyn RateSource>, query: &str, threshold: f64) -> Self {
        Self::new()
            .stage(DtiCalculator)
            .stage(RateFetcher::new(source).with_query(query))
            .stage(DecisionMaker::new(threshold))
    }

    /// Append a stage to the end of the chain.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }

    fn transition(&self, phase: &mut Phase, to: Phase) {
        if *phase != to {
            debug!(from = %phase, to = %to, "phase change");
            self.emit(Event::PhaseChanged { from: *phase, to });
            *phase = to;
        }
    }

    /// Run every stage once, in order, over `state`.
    pub async fn run(&self, mut state: SessionState) -> Result<Screening, ScreenError> {
        let mut phase = Phase::AwaitingInput;
        let mut messages = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            self.transition(&mut phase, stage.phase());
            info!(stage = stage.name(), "running stage");

            match stage.run(&mut state).await? {
                StageReport::Continue(message) => {
                    messages.push(StageMessage {
                        stage: stage.name().to_string(),
                        message,
                    });
                }
                StageReport::Halt(message) => {
                    warn!(stage = stage.name(), %message, "stage halted the run");
                    self.transition(&mut phase, Phase::Halted);
                    return Ok(Screening {
                        state,
                        phase,
                        messages,
                        halted: Some(message),
                    });
                }
            }
        }

        self.transition(&mut phase, Phase::Done);
        Ok(Screening {
            state,
            phase,
            messages,
            halted: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::fixed::FixedRate;
    use crate::state::LoanInputs;

    fn pipeline() -> Pipeline {
        Pipeline::loan_screening(
            Arc::new(FixedRate::new("6.5%")),
            "current mortgage rates",
            43.0,
        )
    }

    #[test]
    fn standard_chain_order() {
        assert_eq!(
            pipeline().stage_names(),
            vec!["dti_calculator", "rate_fetcher", "decision_maker"]
        );
    }

    #[tokio::test]
    async fn empty_pipeline_is_done_immediately() {
        let screening = Pipeline::new().run(SessionState::default()).await.unwrap();
        assert_eq!(screening.phase, Phase::Done);
        assert!(screening.messages.is_empty());
    }

    #[tokio::test]
    async fn full_run_collects_a_message_per_stage() {
        let state = SessionState::with_inputs(LoanInputs {
            income: 5000.0,
            debt: 1000.0,
        });
        let screening = pipeline().run(state).await.unwrap();

        assert_eq!(screening.phase, Phase::Done);
        assert!(screening.halted.is_none());
        assert_eq!(screening.messages.len(), 3);
        assert_eq!(screening.messages[0].message, "DTI ratio calculated as 20.00%.");
        assert!(screening.decision().is_some());
    }

    #[tokio::test]
    async fn phases_are_emitted_in_order() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let state = SessionState::with_inputs(LoanInputs {
            income: 2000.0,
            debt: 900.0,
        });
        pipeline().with_events(bus).run(state).await.unwrap();

        let mut phases = Vec::new();
        while let Ok(event) = rx.try_recv() {
            let Event::PhaseChanged { to, .. } = event;
            phases.push(to);
        }
        assert_eq!(
            phases,
            vec![
                Phase::Calculating,
                Phase::FetchingRate,
                Phase::Deciding,
                Phase::Done
            ]
        );
    }
}
