//! REST API error types

use thiserror::Error;

/// REST call failure
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or body decoding failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-zero code
    #[error("Kook API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Code 0 but the expected `data` field was absent
    #[error("Response is missing {0}")]
    MissingData(&'static str),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    /// Check if the failure happened before the API produced an answer
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// REST result type
pub type ApiResult<T> = Result<T, ApiError>;
