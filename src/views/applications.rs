// src/views/applications.rs
use std::collections::BTreeMap;
use std::future::Future;
use tracing::debug;

use crate::core::scope::{RequestTracker, ViewScope};
use crate::error::ApiError;
use crate::types::application::{Application, ApplicationStatus};

/// Applications seen by a candidate or an employer, filtered on the client.
pub struct ApplicationListState {
    pub applications: Vec<Application>,
    pub status_filter: Option<ApplicationStatus>,
    pub loading: bool,
    pub error: Option<String>,
    tracker: RequestTracker,
    scope: ViewScope,
}

impl Default for ApplicationListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationListState {
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
            status_filter: None,
            loading: false,
            error: None,
            tracker: RequestTracker::new(),
            scope: ViewScope::new(),
        }
    }

    /// Run one of the role-specific listing calls and apply its result.
    pub async fn load<F>(&mut self, request: F) -> bool
    where
        F: Future<Output = Result<Vec<Application>, ApiError>>,
    {
        self.loading = true;
        self.error = None;
        let generation = self.tracker.begin();
        let result = self.scope.run(request).await;
        self.apply(generation, result)
    }

    pub fn apply(&mut self, generation: u64, result: Result<Vec<Application>, ApiError>) -> bool {
        if !self.tracker.is_current(generation) {
            debug!("Dropping stale application list (generation {})", generation);
            return false;
        }
        self.loading = false;
        match result {
            Ok(applications) => self.applications = applications,
            Err(e) => self.error = e.user_message(),
        }
        true
    }

    pub fn visible(&self) -> Vec<&Application> {
        self.applications
            .iter()
            .filter(|app| self.status_filter.map_or(true, |status| app.status == status))
            .collect()
    }

    pub fn counts(&self) -> BTreeMap<ApplicationStatus, usize> {
        let mut counts = BTreeMap::new();
        for app in &self.applications {
            *counts.entry(app.status).or_insert(0) += 1;
        }
        counts
    }

    /// Replace one application after a status update.
    pub fn replace(&mut self, updated: Application) {
        if let Some(slot) = self.applications.iter_mut().find(|a| a.id == updated.id) {
            *slot = updated;
        }
    }

    pub fn close(&self) {
        self.scope.cancel();
    }
}
