use thiserror::Error;

/// Errors raised while evaluating a fee.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeeError {
    #[error("Invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: String,
    },

    #[error("Invalid rate schedule: {0}")]
    InvalidSchedule(String),

    #[error("No tier matches value {0}")]
    NoMatchingTier(f64),
}

impl FeeError {
    pub fn invalid_input(field: &'static str, value: f64, reason: impl Into<String>) -> Self {
        FeeError::InvalidInput {
            field,
            value,
            reason: reason.into(),
        }
    }
}

/// Errors raised while fetching the exchange rate. The cache recovers from all of them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Rate request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse rate response: {0}")]
    Parse(String),

    #[error("Rate response contained no entries")]
    Empty,

    #[error("Fetched rate {0} is outside the accepted range")]
    OutOfRange(f64),
}
