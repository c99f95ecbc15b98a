//! Errors surfaced by the screening pipeline.
//!
//! Validation of the income figure is *not* an error here: the DTI stage
//! reports it inline and the pipeline halts. These variants cover the
//! failures that propagate to the caller.

/// Errors from collecting inputs, running stages, or talking to the rate source.
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing session state: `{0}` has not been set")]
    MissingState(&'static str),

    #[error("rate lookup failed: {0}")]
    RateLookup(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScreenError {
    /// Whether the host retry policy should try this request again.
    pub fn is_retryable(&self, statuses: &[u16]) -> bool {
        match self {
            Self::Api { status, .. } => statuses.contains(status),
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_retryable_only_for_listed_statuses() {
        let err = ScreenError::Api {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(err.is_retryable(&[429, 503]));
        assert!(!err.is_retryable(&[429]));
    }

    #[test]
    fn validation_errors_never_retry() {
        assert!(!ScreenError::InvalidInput("x".to_string()).is_retryable(&[429]));
        assert!(!ScreenError::MissingState("dti_ratio").is_retryable(&[429]));
    }

    #[test]
    fn missing_state_names_the_field() {
        let msg = ScreenError::MissingState("current_loan_rate").to_string();
        assert!(msg.contains("current_loan_rate"));
    }
}
