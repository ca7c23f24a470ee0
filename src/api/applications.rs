// src/api/applications.rs
use serde_json::json;
use tracing::info;

use super::{keyed_or_data, path_id};
use crate::core::http_client::{ApiRequest, HttpClient};
use crate::error::ApiError;
use crate::types::application::{Application, ApplicationFilters, ApplicationStatus};

pub struct ApplicationsApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> ApplicationsApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    pub async fn apply(&self, job_id: &str, cover_letter: &str) -> Result<Application, ApiError> {
        let job_id = path_id("jobId", job_id)?;
        info!("Applying to job {}", job_id);
        let response = self
            .client
            .send(ApiRequest::post("/applications").json_value(json!({
                "jobId": job_id,
                "coverLetter": cover_letter,
            })))
            .await?;
        keyed_or_data(&response, "application")
    }

    pub async fn list(&self, filters: &ApplicationFilters) -> Result<Vec<Application>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::get("/applications").query_pairs(filters.to_query()))
            .await?;
        Ok(response.list())
    }

    pub async fn get(&self, application_id: &str) -> Result<Application, ApiError> {
        let application_id = path_id("applicationId", application_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/applications/{}", application_id)))
            .await?;
        keyed_or_data(&response, "application")
    }

    pub async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, ApiError> {
        let application_id = path_id("applicationId", application_id)?;
        info!("Application {} -> {}", application_id, status);
        let response = self
            .client
            .send(
                ApiRequest::put(format!("/applications/{}/status", application_id))
                    .json_value(json!({ "status": status })),
            )
            .await?;
        keyed_or_data(&response, "application")
    }

    pub async fn list_for_current_candidate(&self) -> Result<Vec<Application>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::get("/applications/candidate/me"))
            .await?;
        Ok(response.list())
    }

    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<Application>, ApiError> {
        let job_id = path_id("jobId", job_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/applications/job/{}", job_id)))
            .await?;
        Ok(response.list())
    }

    pub async fn list_for_current_employer(&self) -> Result<Vec<Application>, ApiError> {
        let response = self
            .client
            .send(ApiRequest::get("/applications/employer/me"))
            .await?;
        Ok(response.list())
    }
}
