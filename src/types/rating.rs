// src/types/rating.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Identified;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Type-specific breakdown. Candidates are rated on skills,
/// establishments on criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RatingKind {
    #[serde(rename = "candidat")]
    Candidate {
        #[serde(default)]
        skills: BTreeMap<String, u8>,
    },
    #[serde(rename = "etablissement")]
    Establishment {
        #[serde(default)]
        criteria: BTreeMap<String, u8>,
    },
}

impl RatingKind {
    pub fn breakdown(&self) -> &BTreeMap<String, u8> {
        match self {
            RatingKind::Candidate { skills } => skills,
            RatingKind::Establishment { criteria } => criteria,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub application: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub target: String,
    pub score: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(flatten)]
    pub kind: RatingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Rating {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRating {
    pub application_id: String,
    pub score: u8,
    pub comment: String,
    #[serde(flatten)]
    pub kind: RatingKind,
}

/// Mean score over a set of ratings, `None` when there are none.
pub fn average_score(ratings: &[Rating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: u32 = ratings.iter().map(|r| u32::from(r.score)).sum();
    Some(f64::from(total) / ratings.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_is_tagged_by_type() {
        let rating: Rating = serde_json::from_value(json!({
            "_id": "r1",
            "application": "a1",
            "score": 4,
            "comment": "Très ponctuel",
            "type": "candidat",
            "skills": {"ponctualité": 5, "service": 4}
        }))
        .unwrap();

        assert_eq!(rating.kind.breakdown().get("ponctualité"), Some(&5));

        let new = NewRating {
            application_id: "a1".into(),
            score: 5,
            comment: "Bonne ambiance".into(),
            kind: RatingKind::Establishment {
                criteria: BTreeMap::from([("ambiance".to_string(), 5)]),
            },
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["type"], "etablissement");
        assert_eq!(value["criteria"]["ambiance"], 5);
        assert_eq!(value["applicationId"], "a1");
    }

    #[test]
    fn test_average_score() {
        let make = |score| Rating {
            id: "r".into(),
            application: "a".into(),
            author: String::new(),
            target: String::new(),
            score,
            comment: String::new(),
            kind: RatingKind::Candidate {
                skills: BTreeMap::new(),
            },
            created_at: None,
        };
        assert_eq!(average_score(&[]), None);
        assert_eq!(average_score(&[make(4), make(5), make(3)]), Some(4.0));
    }
}
