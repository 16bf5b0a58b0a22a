use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directory entry for a program graduate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlumniEntry {
    pub id: Uuid,
    pub full_name: String,
    pub cohort_code: String,
    pub organization: Option<String>,
    pub region: Option<String>,
    pub expertise_tags: Option<Vec<String>>,
    pub headline: Option<String>,
}

impl AlumniEntry {
    pub const TABLE: &'static str = "alumni_directory";
    pub const COLUMNS: &'static [&'static str] =
        &["id", "full_name", "cohort_code", "organization", "region", "expertise_tags", "headline"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Requested,
    Introduced,
    Rejected,
    Completed,
}

/// An introduction request from a member to an alumni entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlumniLink {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub target_alumni_id: Uuid,
    pub reason: Option<String>,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
}

impl AlumniLink {
    pub const TABLE: &'static str = "alumni_links";
    pub const COLUMNS: &'static [&'static str] =
        &["id", "requester_id", "target_alumni_id", "reason", "status", "created_at"];
}
