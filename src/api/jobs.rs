// src/api/jobs.rs
use tracing::info;

use super::{keyed_or_data, path_id};
use crate::core::http_client::{ApiRequest, HttpClient};
use crate::error::ApiError;
use crate::types::job::{Job, JobDraft, JobFilters, JobPage, JobPatch, JobStatus};
use crate::types::response::Pagination;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub struct JobsApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> JobsApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    /// One page of the public listing. Missing pagination is treated as a
    /// single page holding what was returned.
    pub async fn list(&self, filters: &JobFilters, page: u32) -> Result<JobPage, ApiError> {
        let page = page.max(1);
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let mut query = filters.to_query();
        if filters.limit.is_none() {
            query.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .client
            .send(ApiRequest::get("/jobs").query("page", page).query_pairs(query))
            .await?;

        let jobs: Vec<Job> = response.list();
        let pagination = response.pagination().unwrap_or_else(|| Pagination {
            current_page: page,
            total_pages: 1,
            total: jobs.len() as u64,
            limit,
        });

        Ok(JobPage { jobs, pagination })
    }

    pub async fn get(&self, job_id: &str) -> Result<Job, ApiError> {
        let job_id = path_id("jobId", job_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/jobs/{}", job_id)))
            .await?;
        keyed_or_data(&response, "job")
    }

    pub async fn create(&self, draft: &JobDraft) -> Result<Job, ApiError> {
        info!("Creating job offer: {}", draft.title);
        let response = self
            .client
            .send(ApiRequest::post("/jobs").json(draft)?)
            .await?;
        keyed_or_data(&response, "job")
    }

    pub async fn update(&self, job_id: &str, patch: &JobPatch) -> Result<Job, ApiError> {
        let job_id = path_id("jobId", job_id)?;
        let response = self
            .client
            .send(ApiRequest::put(format!("/jobs/{}", job_id)).json(patch)?)
            .await?;
        keyed_or_data(&response, "job")
    }

    pub async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<Job, ApiError> {
        self.update(job_id, &JobPatch::status(status)).await
    }

    pub async fn delete(&self, job_id: &str) -> Result<Option<String>, ApiError> {
        let job_id = path_id("jobId", job_id)?;
        info!("Deleting job offer {}", job_id);
        let response = self
            .client
            .send(ApiRequest::delete(format!("/jobs/{}", job_id)))
            .await?;
        Ok(response.message())
    }

    pub async fn list_by_establishment(&self, establishment_id: &str) -> Result<Vec<Job>, ApiError> {
        let establishment_id = path_id("establishmentId", establishment_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/jobs/establishment/{}", establishment_id)))
            .await?;
        Ok(response.list())
    }

    pub async fn list_for_current_employer(&self) -> Result<Vec<Job>, ApiError> {
        let response = self.client.send(ApiRequest::get("/jobs/employer/me")).await?;
        Ok(response.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{client_with, StubTransport};
    use crate::core::transport::RequestBody;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_reads_jobs_and_pagination() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(
            200,
            json!({
                "success": true,
                "data": [{"_id": "1", "title": "Serveur"}],
                "pagination": {"totalPages": 3, "currentPage": 2}
            }),
        );
        let client = client_with(stub.clone(), None);

        let filters = JobFilters {
            sector: Some("Hôtellerie".into()),
            ..Default::default()
        };
        let page = JobsApi::new(&client).list(&filters, 2).await.unwrap();
        assert_eq!(page.jobs.len(), 1);
        assert_eq!(page.jobs[0].title, "Serveur");
        assert_eq!(page.pagination.total_pages, 3);

        let sent = stub.last_request();
        assert_eq!(sent.query_value("page"), Some("2"));
        assert_eq!(sent.query_value("limit"), Some("10"));
        assert_eq!(sent.query_value("sector"), Some("Hôtellerie"));
        assert!(sent.query_value("_t").is_some());
    }

    #[tokio::test]
    async fn test_list_without_pagination_is_single_page() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(200, json!([{"_id": "1", "title": "Plongeur"}, {"_id": "2", "title": "Barman"}]));
        let client = client_with(stub, None);

        let page = JobsApi::new(&client).list(&JobFilters::default(), 0).await.unwrap();
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.total, 2);
    }

    #[tokio::test]
    async fn test_status_toggle_sends_put_with_patch() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(
            200,
            json!({"success": true, "data": {"_id": "j1", "title": "Cuisinier", "status": "inactive"}}),
        );
        let client = client_with(stub.clone(), Some("jwt"));

        let job = JobsApi::new(&client)
            .set_status("j1", JobStatus::Inactive)
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Inactive);

        let sent = stub.last_request();
        assert_eq!(sent.method, Method::PUT);
        assert!(sent.url.ends_with("/jobs/j1"));
        assert_eq!(sent.body, RequestBody::Json(json!({"status": "inactive"})));
        assert!(sent.query_value("_t").is_none());
    }

    #[tokio::test]
    async fn test_owner_listings_and_delete() {
        let stub = Arc::new(StubTransport::new());
        stub.push_json(200, json!({"success": true, "data": [{"_id": "j1", "title": "Commis"}]}));
        stub.push_json(200, json!({"success": true, "data": {"data": [{"_id": "j2", "title": "Chef"}]}}));
        stub.push_json(200, json!({"success": true, "message": "Offre supprimée"}));
        let client = client_with(stub.clone(), Some("jwt"));
        let jobs = JobsApi::new(&client);

        assert_eq!(jobs.list_by_establishment("e1").await.unwrap()[0].id, "j1");
        assert_eq!(jobs.list_for_current_employer().await.unwrap()[0].id, "j2");
        assert_eq!(jobs.delete("j2").await.unwrap().as_deref(), Some("Offre supprimée"));

        let requests = stub.requests();
        assert!(requests[0].url.ends_with("/jobs/establishment/e1"));
        assert!(requests[1].url.ends_with("/jobs/employer/me"));
        assert_eq!(requests[2].method, Method::DELETE);
    }
}
