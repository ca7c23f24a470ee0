// src/types/application.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::job::Job;
use super::user::User;
use super::{Identified, Reference};

/// Application status. French values are canonical on the wire; the English
/// aliases seen in older payloads are accepted as synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Interview,
    Accepted,
    Rejected,
}

/// Display category (badge color) of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Warning,
    Info,
    Primary,
    Success,
    Error,
}

impl StatusCategory {
    pub fn color(&self) -> &'static str {
        match self {
            StatusCategory::Warning => "warning",
            StatusCategory::Info => "info",
            StatusCategory::Primary => "primary",
            StatusCategory::Success => "success",
            StatusCategory::Error => "error",
        }
    }
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    /// Wire value sent to the backend.
    pub fn canonical(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "En attente",
            ApplicationStatus::Reviewed => "Examinée",
            ApplicationStatus::Interview => "Entretien",
            ApplicationStatus::Accepted => "Acceptée",
            ApplicationStatus::Rejected => "Refusée",
        }
    }

    pub fn english_alias(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        self.canonical()
    }

    pub fn category(&self) -> StatusCategory {
        match self {
            ApplicationStatus::Pending => StatusCategory::Warning,
            ApplicationStatus::Reviewed => StatusCategory::Info,
            ApplicationStatus::Interview => StatusCategory::Primary,
            ApplicationStatus::Accepted => StatusCategory::Success,
            ApplicationStatus::Rejected => StatusCategory::Error,
        }
    }

    /// No further transition is expected once accepted or rejected.
    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(status) = Self::ALL.iter().find(|st| st.canonical() == trimmed) {
            return Ok(*status);
        }
        let lower = trimmed.to_lowercase();
        Self::ALL
            .iter()
            .find(|st| st.english_alias() == lower || st.canonical().to_lowercase() == lower)
            .copied()
            .ok_or_else(|| format!("Unknown application status: {}", s))
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.canonical())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub job: Reference<Job>,
    pub candidate: Reference<User>,
    #[serde(default)]
    pub cover_letter: String,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identified for Application {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Application {
    pub fn job_title(&self) -> Option<&str> {
        self.job.populated().map(|job| job.title.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilters {
    pub status: Option<ApplicationStatus>,
    pub job_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ApplicationFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.canonical().to_string()));
        }
        if let Some(job_id) = &self.job_id {
            query.push(("jobId".to_string(), job_id.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_share_category() {
        let accepted_fr: ApplicationStatus = "Acceptée".parse().unwrap();
        let accepted_en: ApplicationStatus = "accepted".parse().unwrap();
        assert_eq!(accepted_fr, accepted_en);
        assert_eq!(accepted_fr.category(), accepted_en.category());
        assert_eq!(accepted_fr.category(), StatusCategory::Success);

        let rejected_fr: ApplicationStatus = "Refusée".parse().unwrap();
        let rejected_en: ApplicationStatus = "rejected".parse().unwrap();
        assert_eq!(rejected_fr.category(), rejected_en.category());
        assert_eq!(rejected_en.category().color(), "error");
    }

    #[test]
    fn test_every_status_round_trips_through_both_spellings() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.canonical().parse::<ApplicationStatus>().unwrap(), status);
            assert_eq!(status.english_alias().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert_eq!("PENDING".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Pending);
        assert!("archived".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_serializes_canonical_french() {
        assert_eq!(
            serde_json::to_value(ApplicationStatus::Reviewed).unwrap(),
            json!("Examinée")
        );
        let app: Application = serde_json::from_value(json!({
            "_id": "a1",
            "job": {"_id": "j1", "title": "Serveur"},
            "candidate": "c1",
            "status": "pending"
        }))
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.job_title(), Some("Serveur"));
        assert!(!app.status.is_final());
    }
}
