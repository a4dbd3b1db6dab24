//! Scripted [`Transport`] for tests. Enabled by the `mock` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use super::transport::{ApiRequest, RawResponse, Transport};
use super::ApiError;

/// Answers requests from a queue of scripted responses, in order, and
/// records every request it receives.
///
/// An empty queue answers with a network failure.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a JSON body.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_raw(status, body.to_string());
    }

    /// Queue a response with an arbitrary body.
    pub fn push_raw(&self, status: u16, body: impl Into<Bytes>) {
        self.enqueue(Ok(RawResponse {
            status,
            body: body.into(),
        }));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: ApiError) {
        self.enqueue(Err(error));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Responses still waiting to be served.
    pub fn pending(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn enqueue(&self, response: Result<RawResponse, ApiError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let path = request.path_and_query();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::NetworkFailure {
                    message: format!("no scripted response for {path}"),
                    timed_out: false,
                })
            })
    }
}
