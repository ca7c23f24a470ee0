// src/core/mod.rs
//! Shared plumbing: one HTTP client for every endpoint, response
//! normalization, local persistence and view-scoped cancellation.

pub mod http_client;
pub mod normalizer;
pub mod scope;
pub mod storage;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use http_client::{ApiClient, ApiRequest, ApiResponse, HttpClient, TokenSource};
pub use scope::{RequestTracker, ViewScope};
pub use storage::{BookmarkStore, LocalStore, TokenStore};
pub use transport::{ReqwestTransport, Transport};
