// src/api/mod.rs
//! Resource API modules - one thin function per backend operation

pub mod applications;
pub mod auth;
pub mod jobs;
pub mod notifications;
pub mod payments;
pub mod ratings;
pub mod users;

pub use applications::ApplicationsApi;
pub use auth::AuthApi;
pub use jobs::JobsApi;
pub use notifications::NotificationsApi;
pub use payments::PaymentsApi;
pub use ratings::RatingsApi;
pub use users::UsersApi;

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::core::http_client::{ApiResponse, HttpClient};
use crate::error::{ApiError, ValidationErrors};

/// Entry point to every resource module. All of them share one client.
#[derive(Clone)]
pub struct Marketplace {
    client: Arc<dyn HttpClient>,
}

impl Marketplace {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &dyn HttpClient {
        self.client.as_ref()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self.client())
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self.client())
    }

    pub fn jobs(&self) -> JobsApi<'_> {
        JobsApi::new(self.client())
    }

    pub fn applications(&self) -> ApplicationsApi<'_> {
        ApplicationsApi::new(self.client())
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self.client())
    }

    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(self.client())
    }

    pub fn ratings(&self) -> RatingsApi<'_> {
        RatingsApi::new(self.client())
    }
}

/// Read a record the backend sends either under `key` or as `data`.
pub(crate) fn keyed_or_data<T: DeserializeOwned>(
    response: &ApiResponse,
    key: &str,
) -> Result<T, ApiError> {
    let keyed = response
        .body
        .get(key)
        .or_else(|| response.body.get("data").and_then(|d| d.get(key)))
        .filter(|v| v.is_object());

    match keyed {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ApiError::InvalidResponse(e.to_string())),
        None => response.data(),
    }
}

/// Path segment guard: ids are interpolated into URLs as-is.
pub(crate) fn path_id<'a>(field: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) {
        let mut errors = ValidationErrors::new();
        errors.add(field, "Identifiant invalide");
        return Err(ApiError::Validation(errors));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyed_or_data_accepts_both_layouts() {
        #[derive(serde::Deserialize)]
        struct Named {
            name: String,
        }

        let keyed = ApiResponse {
            status: 200,
            body: json!({"success": true, "user": {"name": "a"}}),
        };
        let nested = ApiResponse {
            status: 200,
            body: json!({"success": true, "data": {"user": {"name": "b"}}}),
        };
        let data = ApiResponse {
            status: 200,
            body: json!({"success": true, "data": {"name": "c"}}),
        };

        assert_eq!(keyed_or_data::<Named>(&keyed, "user").unwrap().name, "a");
        assert_eq!(keyed_or_data::<Named>(&nested, "user").unwrap().name, "b");
        assert_eq!(keyed_or_data::<Named>(&data, "user").unwrap().name, "c");
    }

    #[test]
    fn test_path_id_rejects_traversal() {
        assert_eq!(path_id("jobId", " 65f1 ").unwrap(), "65f1");
        assert!(path_id("jobId", "").is_err());
        assert!(path_id("jobId", "1/../admin").is_err());
    }
}
