// src/core/transport.rs
//! The only code that talks to the network primitive

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// A file sent as a single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FilePart),
}

/// A request after the shared client resolved URL, headers and query.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status plus body as received. Non-JSON bodies arrive as a JSON string,
/// empty bodies as `null`.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport timed out")]
    Timeout,
    #[error("request aborted")]
    Aborted,
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() || err.is_request() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                    .map_err(|e| TransportError::Other(format!("Invalid mime type: {}", e)))?;
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        let response = builder.send().await.map_err(Self::classify)?;
        let status = response.status().as_u16();
        trace!("Response status: {}", status);

        let text = response.text().await.map_err(Self::classify)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(RawResponse { status, body })
    }
}
