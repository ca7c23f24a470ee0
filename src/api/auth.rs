// src/api/auth.rs
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::keyed_or_data;
use crate::core::http_client::{ApiRequest, ApiResponse, HttpClient};
use crate::error::ApiError;
use crate::types::user::{CandidateProfile, EstablishmentProfile, User, UserType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_profile: Option<CandidateProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_profile: Option<EstablishmentProfile>,
}

/// Token and user returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

pub struct AuthApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        info!("Registering {} account {}", request.user_type.as_str(), request.email);
        let response = self
            .client
            .send(ApiRequest::post("/auth/register").json(request)?)
            .await?;
        parse_session(&response)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let response = self
            .client
            .send(ApiRequest::post("/auth/login").json_value(json!({
                "email": email.trim(),
                "password": password,
            })))
            .await?;
        parse_session(&response)
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let response = self.client.send(ApiRequest::get("/auth/me")).await?;
        keyed_or_data(&response, "user")
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::post("/auth/forgot-password").json_value(json!({ "email": email.trim() })))
            .await?;
        Ok(response.message())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Option<String>, ApiError> {
        let token = super::path_id("token", token)?;
        let response = self
            .client
            .send(
                ApiRequest::put(format!("/auth/reset-password/{}", token))
                    .json_value(json!({ "password": new_password })),
            )
            .await?;
        Ok(response.message())
    }

    pub async fn update_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::put("/auth/update-password").json_value(json!({
                "currentPassword": old_password,
                "newPassword": new_password,
            })))
            .await?;
        Ok(response.message())
    }
}

/// Sessions come back flat (`{token, user}`) or under `data`.
fn parse_session(response: &ApiResponse) -> Result<AuthSession, ApiError> {
    let holder = if response.body.get("token").is_some() {
        &response.body
    } else {
        response.body.get("data").unwrap_or(&Value::Null)
    };

    let token = holder
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::InvalidResponse("missing token".to_string()))?
        .to_string();
    let user = holder
        .get("user")
        .cloned()
        .ok_or_else(|| ApiError::InvalidResponse("missing user".to_string()))?;
    let user: User =
        serde_json::from_value(user).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

    Ok(AuthSession { token, user })
}
