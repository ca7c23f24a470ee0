// src/views/job_list.rs
use tracing::{debug, warn};

use crate::api::JobsApi;
use crate::core::scope::{RequestTracker, ViewScope};
use crate::core::storage::BookmarkStore;
use crate::error::ApiError;
use crate::types::job::{Job, JobFilters, JobPage};

/// State of the paginated public job list.
pub struct JobListState {
    pub filters: JobFilters,
    pub page: u32,
    pub jobs: Vec<Job>,
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<String>,
    tracker: RequestTracker,
    scope: ViewScope,
}

impl Default for JobListState {
    fn default() -> Self {
        Self::new()
    }
}

impl JobListState {
    pub fn new() -> Self {
        Self {
            filters: JobFilters::default(),
            page: 1,
            jobs: Vec::new(),
            total_pages: 1,
            loading: false,
            error: None,
            tracker: RequestTracker::new(),
            scope: ViewScope::new(),
        }
    }

    /// New filters restart from the first page.
    pub fn set_filters(&mut self, filters: JobFilters) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.page = page.clamp(1, self.total_pages.max(1));
    }

    pub fn begin(&mut self) -> u64 {
        self.loading = true;
        self.error = None;
        self.tracker.begin()
    }

    /// Apply a response. Returns `false` when a newer request superseded it.
    pub fn apply(&mut self, generation: u64, result: Result<JobPage, ApiError>) -> bool {
        if !self.tracker.is_current(generation) {
            debug!("Dropping stale job list response (generation {})", generation);
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.jobs = page.jobs;
                self.total_pages = page.pagination.total_pages.max(1);
                self.page = page.pagination.current_page.clamp(1, self.total_pages);
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Job list fetch failed: {}", e);
                }
                self.error = e.user_message();
            }
        }
        true
    }

    pub async fn refresh(&mut self, jobs: &JobsApi<'_>) -> bool {
        let generation = self.begin();
        let result = self.scope.run(jobs.list(&self.filters, self.page)).await;
        self.apply(generation, result)
    }

    /// Tear the view down: in-flight requests end as cancelled.
    pub fn close(&self) {
        self.scope.cancel();
    }
}

/// Fetch the saved jobs. Bookmarks whose job no longer exists are dropped.
pub async fn load_saved_jobs(
    jobs: &JobsApi<'_>,
    bookmarks: &BookmarkStore,
) -> Result<Vec<Job>, ApiError> {
    let mut saved = Vec::new();
    for id in bookmarks.ids() {
        match jobs.get(&id).await {
            Ok(job) => saved.push(job),
            Err(ApiError::Server { status: 404, .. }) => {
                warn!("Saved job {} no longer exists, removing bookmark", id);
                if let Err(e) = bookmarks.remove(&id) {
                    warn!("Failed to remove bookmark {}: {}", id, e);
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(saved)
}
