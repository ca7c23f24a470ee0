// src/error.rs
//! Error taxonomy surfaced by the client to whoever presents it

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const NETWORK_MESSAGE: &str =
    "Impossible de joindre le serveur. Vérifiez votre connexion internet.";
pub const TIMEOUT_MESSAGE: &str =
    "Le serveur met trop de temps à répondre. Veuillez réessayer plus tard.";
pub const SERVER_FALLBACK_MESSAGE: &str = "Une erreur est survenue. Veuillez réessayer.";

/// Failures a resource call can end with. The shared client only classifies;
/// presenting the error is up to the caller.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Aborted by navigation or view teardown. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,

    /// No response was obtained at all
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The server did not answer within the configured window
    #[error("request timed out")]
    TimedOut,

    /// A non-2xx response was received
    #[error("server returned {status}: {message}")]
    Server {
        status: u16,
        message: String,
        body: Value,
    },

    /// Rejected on the client before any request was built
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A 2xx response whose payload could not be read as expected
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build a server error, keeping the backend's own message when it sent one.
    pub fn from_server_body(status: u16, body: Value) -> Self {
        let message = server_message(&body).unwrap_or_else(|| SERVER_FALLBACK_MESSAGE.to_string());
        ApiError::Server {
            status,
            message,
            body,
        }
    }

    /// Text to show the user, or `None` when the error must stay silent.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ApiError::Cancelled => None,
            ApiError::NetworkUnreachable(_) => Some(NETWORK_MESSAGE.to_string()),
            ApiError::TimedOut => Some(TIMEOUT_MESSAGE.to_string()),
            ApiError::Server { message, .. } => Some(message.clone()),
            ApiError::Validation(errors) => Some(errors.to_string()),
            ApiError::InvalidResponse(_) => Some(SERVER_FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

fn server_message(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Per-field messages produced by form validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_message_is_kept_verbatim() {
        let err = ApiError::from_server_body(401, json!({"success": false, "message": "Non autorisé"}));
        assert_eq!(err.user_message().as_deref(), Some("Non autorisé"));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_server_message_falls_back_when_missing() {
        let err = ApiError::from_server_body(500, json!({"success": false}));
        assert_eq!(err.user_message().as_deref(), Some(SERVER_FALLBACK_MESSAGE));

        let err = ApiError::from_server_body(400, json!({"error": "Email déjà utilisé"}));
        assert_eq!(err.user_message().as_deref(), Some("Email déjà utilisé"));
    }

    #[test]
    fn test_cancelled_is_silent() {
        assert_eq!(ApiError::Cancelled.user_message(), None);
        assert!(ApiError::Cancelled.is_cancelled());
        assert_eq!(
            ApiError::TimedOut.user_message().as_deref(),
            Some(TIMEOUT_MESSAGE)
        );
    }

    #[test]
    fn test_validation_errors_keep_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Email requis");
        errors.add("email", "Email invalide");
        errors.add("password", "Mot de passe requis");

        assert_eq!(errors.get("email"), Some("Email requis"));
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "email: Email requis; password: Mot de passe requis"
        );
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
