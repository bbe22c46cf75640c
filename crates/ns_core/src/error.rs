use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pipeline run was cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of the news-source query.
///
/// This never aborts a run: the orchestrator records it on the result as a
/// warning and continues with zero articles.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    #[error("news source returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("news source request failed: {0}")]
    Transport(String),

    #[error("news source response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 401,
            message: "apiKeyInvalid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "news source returned status 401: apiKeyInvalid"
        );
    }

    #[test]
    fn test_fetch_error_serializes_with_kind_tag() {
        let err = FetchError::Transport("connection refused".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "transport");
    }
}
