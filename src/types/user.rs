// src/types/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "candidat")]
    Candidate,
    #[serde(rename = "etablissement")]
    Establishment,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Candidate => "candidat",
            UserType::Establishment => "etablissement",
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "candidat" | "candidate" => Ok(UserType::Candidate),
            "etablissement" | "établissement" | "establishment" => Ok(UserType::Establishment),
            other => Err(format!("Unknown user type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_profile: Option<CandidateProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_profile: Option<EstablishmentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to show for this user, whichever profile it carries.
    pub fn display_name(&self) -> String {
        match (self.user_type, &self.candidate_profile, &self.establishment_profile) {
            (UserType::Candidate, Some(profile), _) => profile.full_name(),
            (UserType::Establishment, _, Some(profile)) => profile.name.clone(),
            _ => self.email.clone(),
        }
    }

    pub fn is_candidate(&self) -> bool {
        self.user_type == UserType::Candidate
    }

    pub fn is_establishment(&self) -> bool {
        self.user_type == UserType::Establishment
    }
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl CandidateProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstablishmentProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Partial profile update; only the present profile is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_profile: Option<CandidateProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_profile: Option<EstablishmentProfile>,
}

/// Query filters for the candidate and establishment directories.
#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    pub search: Option<String>,
    pub city: Option<String>,
    pub sector: Option<String>,
    pub skills: Vec<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl UserFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        if let Some(city) = &self.city {
            query.push(("city".to_string(), city.clone()));
        }
        if let Some(sector) = &self.sector {
            query.push(("sector".to_string(), sector.clone()));
        }
        if !self.skills.is_empty() {
            query.push(("skills".to_string(), self.skills.join(",")));
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
