use async_trait::async_trait;

use super::RateSource;
use crate::error::ScreenError;

/// Answers every query with the same text. Used for offline runs (`--rate`)
/// and tests.
pub struct FixedRate {
    text: String,
}

impl FixedRate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl RateSource for FixedRate {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn lookup(&self, _query: &str) -> Result<String, ScreenError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ignores_query() {
        let source = FixedRate::new("6.5%");
        assert_eq!(source.lookup("anything").await.unwrap(), "6.5%");
        assert_eq!(source.lookup("").await.unwrap(), "6.5%");
    }
}
