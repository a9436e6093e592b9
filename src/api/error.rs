//! Error types for the jukebox backend client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`ApiError`] failures.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures that can occur while talking to the jukebox backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build backend client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent, or timed out in flight.
    #[error("failed to reach backend endpoint `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with an unexpected status code.
    #[error("unexpected backend response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// The backend explicitly rejected the request and said why.
    #[error("backend rejected request: {message}")]
    Rejected { message: String },
    /// Response payload could not be decoded.
    #[error("failed to decode backend response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A push payload was not a valid vote tally.
    #[error("failed to parse vote tally payload")]
    DecodeTally {
        #[source]
        source: serde_json::Error,
    },
}
