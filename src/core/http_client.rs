// src/core/http_client.rs
//! Shared HTTP client - every backend call goes through here

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::normalizer;
use crate::core::transport::{
    FilePart, PreparedRequest, RequestBody, Transport, TransportError,
};
use crate::environment::ClientConfig;
use crate::error::ApiError;
use crate::types::response::Pagination;

pub const CACHE_BUSTER_PARAM: &str = "_t";

/// Where the bearer token comes from. Read on every request.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A request as built by the resource modules: verb, relative path, query, body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Attach a JSON body. Serialization failures are reported as validation
    /// errors on the `body` field since no request has been made yet.
    pub fn json<T: Serialize>(mut self, payload: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload).map_err(|e| {
            let mut errors = crate::error::ValidationErrors::new();
            errors.add("body", e.to_string());
            ApiError::Validation(errors)
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn json_value(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn file(mut self, file: FilePart) -> Self {
        self.body = RequestBody::Multipart(file);
        self
    }
}

/// A successful (2xx) response, passed through unchanged.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Deserialize the single record carried by the response.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = normalizer::extract_object(&self.body).ok_or_else(|| {
            ApiError::InvalidResponse("response carries no data object".to_string())
        })?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    pub fn list<T: DeserializeOwned>(&self) -> Vec<T> {
        normalizer::extract_records(&self.body)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        normalizer::extract_pagination(&self.body)
    }

    /// The backend's `message`, if it sent one.
    pub fn message(&self) -> Option<String> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// The capability every resource module depends on.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Strictly increasing cache-buster values based on wall-clock milliseconds.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicU64,
}

impl CacheBuster {
    pub fn next(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenSource>,
    cache_buster: CacheBuster,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            transport,
            tokens,
            cache_buster: CacheBuster::default(),
        }
    }

    /// Override the timeout taken from the configuration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Resolve URL, attach the bearer token and, for reads, the cache-buster.
    pub fn prepare(&self, request: ApiRequest) -> PreparedRequest {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = self.tokens.token().filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let mut query = request.query;
        if request.method == Method::GET {
            query.push((
                CACHE_BUSTER_PARAM.to_string(),
                self.cache_buster.next().to_string(),
            ));
        }

        PreparedRequest {
            url: self.url_for(&request.path),
            method: request.method,
            headers,
            query,
            body: request.body,
        }
    }
}

#[async_trait]
impl HttpClient for ApiClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let prepared = self.prepare(request);
        let method = prepared.method.clone();
        let url = prepared.url.clone();
        debug!("{} {}", method, url);

        let outcome = tokio::time::timeout(self.timeout, self.transport.execute(prepared)).await;

        let raw = match outcome {
            Err(_) => {
                warn!("{} {} timed out after {:?}", method, url, self.timeout);
                return Err(ApiError::TimedOut);
            }
            Ok(Err(TransportError::Timeout)) => {
                warn!("{} {} timed out in transport", method, url);
                return Err(ApiError::TimedOut);
            }
            Ok(Err(TransportError::Aborted)) => {
                debug!("{} {} aborted", method, url);
                return Err(ApiError::Cancelled);
            }
            Ok(Err(TransportError::Connect(reason))) | Ok(Err(TransportError::Other(reason))) => {
                warn!("{} {} unreachable: {}", method, url, reason);
                return Err(ApiError::NetworkUnreachable(reason));
            }
            Ok(Ok(raw)) => raw,
        };

        if (200..300).contains(&raw.status) {
            debug!("{} {} -> {}", method, url, raw.status);
            Ok(ApiResponse {
                status: raw.status,
                body: raw.body,
            })
        } else {
            warn!("{} {} -> {}", method, url, raw.status);
            Err(ApiError::from_server_body(raw.status, raw.body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{client_with, StaticToken, StubTransport};
    use serde_json::json;

    #[test]
    fn test_bearer_header_only_with_token() {
        let stub = Arc::new(StubTransport::new());
        let with = client_with(stub.clone(), Some("abc123"));
        let prepared = with.prepare(ApiRequest::get("/jobs"));
        assert_eq!(prepared.header("Authorization"), Some("Bearer abc123"));

        let without = client_with(stub, None);
        let prepared = without.prepare(ApiRequest::post("/applications"));
        assert_eq!(prepared.header("Authorization"), None);
    }

    #[test]
    fn test_empty_token_is_treated_as_absent() {
        let stub = Arc::new(StubTransport::new());
        let client = ApiClient::new(
            &ClientConfig::new("http://backend/api"),
            stub,
            Arc::new(StaticToken(Some(String::new()))),
        );
        assert_eq!(client.prepare(ApiRequest::get("/jobs")).header("Authorization"), None);
    }

    #[test]
    fn test_cache_buster_only_on_reads_and_changes() {
        let client = client_with(Arc::new(StubTransport::new()), None);

        let first = client.prepare(ApiRequest::get("/jobs"));
        std::thread::sleep(Duration::from_millis(2));
        let second = client.prepare(ApiRequest::get("/jobs"));
        let a: u64 = first.query_value(CACHE_BUSTER_PARAM).unwrap().parse().unwrap();
        let b: u64 = second.query_value(CACHE_BUSTER_PARAM).unwrap().parse().unwrap();
        assert!(b > a);

        let post = client.prepare(ApiRequest::post("/jobs"));
        assert_eq!(post.query_value(CACHE_BUSTER_PARAM), None);
    }

    #[test]
    fn test_cache_buster_strictly_increases_within_same_millisecond() {
        let buster = CacheBuster::default();
        let values: Vec<u64> = (0..50).map(|_| buster.next()).collect();
        assert!(values.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_url_join_does_not_double_slashes() {
        let client = ApiClient::new(
            &ClientConfig::new("http://backend/api/"),
            Arc::new(StubTransport::new()),
            Arc::new(StaticToken(None)),
        );
        assert_eq!(client.url_for("/jobs/1"), "http://backend/api/jobs/1");
        assert_eq!(client.url_for("jobs"), "http://backend/api/jobs");
    }

    #[tokio::test]
    async fn test_never_answering_server_times_out() {
        let stub = Arc::new(StubTransport::new().hanging());
        let client = client_with(stub, None).with_timeout(Duration::from_millis(30));

        let err = client.send(ApiRequest::get("/jobs")).await.unwrap_err();
        assert!(matches!(err, ApiError::TimedOut), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_transport_failures_are_classified() {
        let stub = Arc::new(StubTransport::new());
        stub.push_error(TransportError::Connect("connection refused".into()));
        stub.push_error(TransportError::Aborted);
        stub.push_error(TransportError::Timeout);
        let client = client_with(stub, None);

        let err = client.send(ApiRequest::get("/jobs")).await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkUnreachable(_)));
        let err = client.send(ApiRequest::get("/jobs")).await.unwrap_err();
        assert!(err.is_cancelled());
        let err = client.send(ApiRequest::get("/jobs")).await.unwrap_err();
        assert!(matches!(err, ApiError::TimedOut));
    }

    #[tokio::test]
    async fn test_success_passes_through_and_errors_keep_body() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(200, json!({"success": true, "data": {"_id": "1"}}));
        stub.push_json(404, json!({"success": false, "message": "Offre introuvable"}));
        let client = client_with(stub, None);

        let ok = client.send(ApiRequest::get("/jobs/1")).await.unwrap();
        assert_eq!(ok.status, 200);
        assert_eq!(ok.body["data"]["_id"], "1");

        match client.send(ApiRequest::get("/jobs/2")).await.unwrap_err() {
            ApiError::Server { status, message, body } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Offre introuvable");
                assert_eq!(body["success"], false);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
