use thiserror::Error;

/// Fallback shown to the user when the AI reply could not be parsed or
/// failed its structural checks. The detail goes to the log instead.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to communicate with the AI model or parse its response.";

/// Errors raised along the query pipeline, from input validation through
/// the service call to response normalization.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A required input was missing or out of range; no request was made.
    #[error("{0}")]
    InvalidInput(String),

    /// The AI declared the queried location or country unknown. The message
    /// is user-facing and the condition is not retryable without new input.
    #[error("{0}")]
    InvalidSubject(String),

    /// No JSON object could be extracted from the reply text.
    #[error("parse failure: {0}")]
    Parse(String),

    /// The extracted JSON object was missing required fields or mistyped.
    #[error("schema failure: {0}")]
    Schema(String),

    /// The transport or the AI service itself failed.
    #[error("service failure: {0}")]
    Service(String),
}

impl QueryError {
    /// Message suitable for direct display to the user.
    pub fn display_message(&self) -> String {
        match self {
            QueryError::InvalidInput(msg)
            | QueryError::InvalidSubject(msg)
            | QueryError::Service(msg) => msg.clone(),
            QueryError::Parse(_) | QueryError::Schema(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Service("The AI service did not respond in time.".to_string())
        } else {
            QueryError::Service(err.to_string())
        }
    }
}
