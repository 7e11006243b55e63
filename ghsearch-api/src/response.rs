//! JSON shapes exchanged with proxy clients.
//!
//! The proxy itself forwards the upstream `search` object untouched; the
//! typed model below is for consumers that want to read it. Every field is
//! lenient because non-user search nodes come back as empty objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub user_count: u64,
    pub page_info: PageInfo,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: Option<String>,
    pub login: String,
    pub avatar_url: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub twitter_username: Option<String>,
    pub url: Option<String>,
    pub website_url: Option<String>,
    pub status: Option<UserStatus>,
    pub followers: Option<Count>,
    pub following: Option<Count>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserStatus {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Count {
    pub total_count: u64,
}

/// Body of every non-200 proxy response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    /// Upstream HTTP status, or 0 when no upstream response exists.
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), status: 0, details: None }
    }

    pub fn with_upstream(mut self, status: u16, details: Option<Value>) -> Self {
        self.status = status;
        self.details = details;
        self
    }
}
