// src/core/testing.rs
//! Stub backend shared by the unit tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core::http_client::{ApiClient, TokenSource};
use crate::core::transport::{PreparedRequest, RawResponse, Transport, TransportError};
use crate::environment::ClientConfig;

pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Records every request and answers from a queue of canned responses.
/// An empty queue answers `{success: true, data: []}`.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<PreparedRequest>>,
    hang: bool,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never answer.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse { status, body }));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> PreparedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        if self.hang {
            std::future::pending::<()>().await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(RawResponse {
                status: 200,
                body: json!({"success": true, "data": []}),
            })
        })
    }
}

pub fn client_with(stub: Arc<StubTransport>, token: Option<&str>) -> ApiClient {
    ApiClient::new(
        &ClientConfig::new("http://backend.test/api"),
        stub,
        Arc::new(StaticToken(token.map(str::to_string))),
    )
}
