pub mod decision;
pub mod dti;
pub mod rate;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScreenError;
use crate::state::SessionState;

/// Where a screening run currently is. Linear, no cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingInput,
    Calculating,
    FetchingRate,
    Deciding,
    Done,
    /// A stage rejected its inputs and the run stopped early.
    Halted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AwaitingInput => "awaiting input",
            Self::Calculating => "calculating",
            Self::FetchingRate => "fetching rate",
            Self::Deciding => "deciding",
            Self::Done => "done",
            Self::Halted => "halted",
        };
        f.write_str(label)
    }
}

/// What a stage tells the pipeline after it ran.
#[derive(Debug, Clone, PartialEq)]
pub enum StageReport {
    /// Stage succeeded; carries its confirmation message.
    Continue(String),
    /// Stage rejected its inputs; carries the message shown to the user.
    Halt(String),
}

/// One unit of work in the fixed screening chain.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    /// The phase the run is in while this stage executes.
    fn phase(&self) -> Phase;
    async fn run(&self, state: &mut SessionState) -> Result<StageReport, ScreenError>;
}
