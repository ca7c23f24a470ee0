use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    #[serde(alias = "page")]
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(alias = "totalItems", alias = "totalJobs")]
    pub total: u64,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total: 0,
            limit: 10,
        }
    }
}

/// Body of the unread-count endpoint, bare or under `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    #[serde(alias = "unreadCount")]
    pub count: u64,
}
