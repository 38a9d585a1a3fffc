use thiserror::Error;

/// Which kind of failure the API reported in its response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The API rejected the request with HTTP 401 (bad or missing key).
    Authentication,
    /// Any other API-reported failure.
    Generic,
}

/// Errors that can occur while fetching articles from the news API.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Connectivity failure (DNS, connection, TLS, body read)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP status outside the ranges the API answers with its own envelope
    #[error("{0}")]
    Transport(String),
    /// The API answered with a non-"ok" status
    #[error("{message}")]
    Api { kind: ApiErrorKind, message: String },
    /// Body could not be decoded even though the status promised an envelope
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Body exceeded the size limit and was not read to the end
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// The task fetching a category panicked before reporting a result
    #[error("Fetch task panicked: {0}")]
    TaskPanicked(String),
}

impl NewsError {
    /// True for API failures caused by invalid credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            NewsError::Api {
                kind: ApiErrorKind::Authentication,
                ..
            }
        )
    }
}
