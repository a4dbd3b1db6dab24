//! Commerce API client for the Medusa Store API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the wire types do not pull in `reqwest`.

#[cfg(any(test, feature = "mock"))]
mod mock;
mod store;
mod transport;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use store::{PUBLISHABLE_KEY_HEADER, StoreClient};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};

use crate::objects::ErrorBody;

/// HTTP methods a request can use. The Store API itself only needs
/// `GET`, `POST` and `DELETE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    NetworkFailure,
    ServerError,
    DecodeFailure,
}

/// Errors produced by [`StoreClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be built; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("network failure: {message}")]
    NetworkFailure { message: String, timed_out: bool },

    /// The server answered with a status of 400 or above.
    #[error("server error: status {status}, body: {body}")]
    ServerError { status: u16, body: String },

    /// A successful response did not match the expected shape.
    #[error("failed to decode {target}: {source}")]
    DecodeFailure {
        target: &'static str,
        /// Leading part of the offending payload.
        payload: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApiError::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            ApiError::ServerError { .. } => ErrorKind::ServerError,
            ApiError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
        }
    }

    /// HTTP status, for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` of a Medusa error body, when the server sent one.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::ServerError { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .map(|parsed| parsed.message)
                .filter(|message| !message.trim().is_empty()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::NetworkFailure { timed_out: true, .. })
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidRequest(format!("invalid url: {e}"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::NetworkFailure {
            message: e.to_string(),
            timed_out: e.is_timeout(),
        }
    }
}

const PAYLOAD_EXCERPT_CHARS: usize = 512;

pub(crate) fn payload_excerpt(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(PAYLOAD_EXCERPT_CHARS)
        .collect()
}
