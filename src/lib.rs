//! Client library for a restaurant and hospitality job marketplace.
//!
//! Candidates browse offers and apply; establishments publish offers
//! (after paying a subscription), review applications and rate each
//! other. All calls go through [`core::ApiClient`], which attaches the
//! session token, defeats caches on reads and maps every failure to an
//! [`error::ApiError`] carrying a user-facing message.

pub mod api;
pub mod cli;
pub mod core;
pub mod environment;
pub mod error;
pub mod payment;
pub mod types;
pub mod validation;
pub mod views;

pub use api::Marketplace;
pub use environment::ClientConfig;
pub use error::{ApiError, ValidationErrors};
