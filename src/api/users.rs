// src/api/users.rs
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::{keyed_or_data, path_id};
use crate::core::http_client::{ApiRequest, HttpClient};
use crate::core::transport::FilePart;
use crate::error::{ApiError, ValidationErrors};
use crate::types::user::{ProfileUpdate, User, UserFilters};

const AVATAR_FIELD: &str = "avatar";
const CV_FIELD: &str = "cv";

/// Where the backend stored an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    #[serde(alias = "avatar", alias = "cvUrl", alias = "fileUrl", alias = "cv")]
    pub url: String,
}

pub struct UsersApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let response = self
            .client
            .send(ApiRequest::put("/users/profile").json(update)?)
            .await?;
        keyed_or_data(&response, "user")
    }

    pub async fn upload_avatar(&self, path: &Path) -> Result<UploadedFile, ApiError> {
        let file = read_upload(path, AVATAR_FIELD, avatar_content_type).await?;
        info!("Uploading avatar {}", file.file_name);
        let response = self
            .client
            .send(ApiRequest::post("/users/avatar").file(file))
            .await?;
        response.data()
    }

    pub async fn upload_cv(&self, path: &Path) -> Result<UploadedFile, ApiError> {
        let file = read_upload(path, CV_FIELD, cv_content_type).await?;
        info!("Uploading CV {}", file.file_name);
        let response = self
            .client
            .send(ApiRequest::post("/users/cv").file(file))
            .await?;
        response.data()
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<User, ApiError> {
        let user_id = path_id("userId", user_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/users/{}", user_id)))
            .await?;
        keyed_or_data(&response, "user")
    }

    pub async fn list_candidates(&self, filters: &UserFilters) -> Result<Vec<User>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::get("/users/candidates").query_pairs(filters.to_query()))
            .await?;
        Ok(response.list())
    }

    pub async fn list_establishments(&self, filters: &UserFilters) -> Result<Vec<User>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::get("/users/establishments").query_pairs(filters.to_query()))
            .await?;
        Ok(response.list())
    }
}

fn file_error(message: impl Into<String>) -> ApiError {
    let mut errors = ValidationErrors::new();
    errors.add("file", message);
    ApiError::Validation(errors)
}

async fn read_upload(
    path: &Path,
    field: &str,
    content_type: fn(&str) -> Option<&'static str>,
) -> Result<FilePart, ApiError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| file_error("Nom de fichier invalide"))?
        .to_string();
    let mime = content_type(&file_name)
        .ok_or_else(|| file_error(format!("Format de fichier non supporté: {}", file_name)))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| file_error(format!("Lecture impossible de {}: {}", path.display(), e)))?;

    Ok(FilePart {
        field: field.to_string(),
        file_name,
        mime: mime.to_string(),
        bytes,
    })
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn avatar_content_type(file_name: &str) -> Option<&'static str> {
    match extension(file_name)?.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn cv_content_type(file_name: &str) -> Option<&'static str> {
    match extension(file_name)?.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}
