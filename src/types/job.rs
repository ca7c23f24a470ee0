// src/types/job.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payment::SubscriptionInfo;
use super::response::Pagination;
use super::user::User;
use super::{Identified, Reference};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl JobStatus {
    /// The status the employer list switches to.
    pub fn toggled(self) -> Self {
        match self {
            JobStatus::Active => JobStatus::Inactive,
            JobStatus::Inactive | JobStatus::Draft => JobStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
            JobStatus::Draft => "draft",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// "heure", "jour", "mois" or "an"
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_period() -> String {
    "mois".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment: Option<Reference<User>>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub working_days: Vec<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Job {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for job creation, filled step by step by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub sector: String,
    pub contract_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<String>,
    pub working_days: Vec<String>,
    pub required_skills: Vec<String>,
    pub benefits: Vec<String>,
    pub status: JobStatus,
    /// Set from a checkout receipt only, never read from user input.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionInfo>,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilters {
    pub search: Option<String>,
    pub contract_type: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub status: Option<JobStatus>,
    pub limit: Option<u32>,
}

impl JobFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<&str>| {
            if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
                query.push((key.to_string(), v.to_string()));
            }
        };
        push("search", self.search.as_deref());
        push("contractType", self.contract_type.as_deref());
        push("sector", self.sector.as_deref());
        push("location", self.location.as_deref());
        push("status", self.status.as_ref().map(JobStatus::as_str));
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

/// One page of the public job list.
#[derive(Debug, Clone, Default)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}
