//! External sources for the current mortgage rate.

pub mod fixed;
pub mod search;

use async_trait::async_trait;

use crate::error::ScreenError;

/// Something that can answer a free-text rate query.
///
/// The returned text is untrusted and unstructured; callers must not assume
/// it contains a number.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;
    async fn lookup(&self, query: &str) -> Result<String, ScreenError>;
}
