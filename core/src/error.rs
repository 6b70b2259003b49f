//! Error types for the records API client.
//!
//! # Design
//! Only the numeric status decides whether a response is accepted. Anything
//! outside 200/201 becomes `UnexpectedStatus`, whatever the body says. The
//! remaining variants cover the request never completing and payloads that do
//! not match the expected shape.

use thiserror::Error;

/// Errors returned by `RecordsApi` parse methods and `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status other than 200 or 201.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The request could not be sent or the response body could not be read.
    #[error("transport failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Client configuration text was not valid.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl ApiError {
    /// The rejected status code, if this error came from the status check.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus(status) => Some(*status),
            _ => None,
        }
    }
}
