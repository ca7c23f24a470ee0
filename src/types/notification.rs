// src/types/notification.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identified;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub recipient: String,
    /// e.g. "application", "status_change", "rating"
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn unread(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}
