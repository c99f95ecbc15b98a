pub mod screener;

use async_trait::async_trait;

use crate::collector::Collector;
use crate::error::ScreenError;
use crate::pipeline::Screening;

/// The outermost boundary. main.rs only knows this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Collect inputs from `collector` and run one screening over them.
    async fn run(&self, collector: &dyn Collector) -> Result<Screening, ScreenError>;
}
