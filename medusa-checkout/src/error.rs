use medusa_sdk::client::{ApiError, ErrorKind};

/// What went wrong, coarsely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutErrorKind {
    /// The request could not be built; nothing was sent.
    InvalidRequest,
    NetworkFailure,
    ServerError,
    DecodeFailure,
    /// The operation needs a cart and none is held.
    NoActiveCart,
    /// Local input checks failed before anything was sent.
    Validation,
    /// The server answered the completion call but did not create an order.
    CompletionRejected,
    /// The operation is not allowed from the current step.
    InvalidTransition,
}

impl From<ErrorKind> for CheckoutErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidRequest => CheckoutErrorKind::InvalidRequest,
            ErrorKind::NetworkFailure => CheckoutErrorKind::NetworkFailure,
            ErrorKind::ServerError => CheckoutErrorKind::ServerError,
            ErrorKind::DecodeFailure => CheckoutErrorKind::DecodeFailure,
        }
    }
}

/// The value held in the checkout session's error slot.
///
/// Unlike [`ApiError`] this is `Clone`, so the slot can be read while the
/// same error is also returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CheckoutError {
    pub kind: CheckoutErrorKind,
    /// Human-readable; the server's own message when it sent one.
    pub message: String,
    /// HTTP status for server errors.
    pub status: Option<u16>,
}

impl CheckoutError {
    pub fn new(kind: CheckoutErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn no_active_cart() -> Self {
        Self::new(CheckoutErrorKind::NoActiveCart, "no active cart")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CheckoutErrorKind::Validation, message)
    }

    pub fn completion_rejected(message: impl Into<String>) -> Self {
        Self::new(CheckoutErrorKind::CompletionRejected, message)
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new(CheckoutErrorKind::InvalidTransition, message)
    }

    /// Worth offering a retry: the network failed or the server had a
    /// transient problem.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            CheckoutErrorKind::NetworkFailure => true,
            CheckoutErrorKind::ServerError => self.status.is_some_and(|status| status >= 500),
            _ => false,
        }
    }
}

impl From<ApiError> for CheckoutError {
    fn from(e: ApiError) -> Self {
        let message = match &e {
            ApiError::ServerError { status, .. } => e
                .server_message()
                .unwrap_or_else(|| format!("the store answered with status {status}")),
            ApiError::NetworkFailure { timed_out: true, .. } => {
                "the store did not answer in time".to_owned()
            }
            _ => e.to_string(),
        };
        Self {
            kind: e.kind().into(),
            message,
            status: e.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_uses_server_message() {
        let err = CheckoutError::from(ApiError::ServerError {
            status: 400,
            body: r#"{"type":"invalid_data","message":"Email is invalid"}"#.into(),
        });
        assert_eq!(err.kind, CheckoutErrorKind::ServerError);
        assert_eq!(err.message, "Email is invalid");
        assert_eq!(err.status, Some(400));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_opaque_server_error() {
        let err = CheckoutError::from(ApiError::ServerError {
            status: 503,
            body: "upstream unavailable".into(),
        });
        assert_eq!(err.message, "the store answered with status 503");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_timeout_is_network_failure() {
        let err = CheckoutError::from(ApiError::NetworkFailure {
            message: "operation timed out".into(),
            timed_out: true,
        });
        assert_eq!(err.kind, CheckoutErrorKind::NetworkFailure);
        assert_eq!(err.status, None);
        assert!(err.is_retryable());
    }
}
