use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

/// Application-owned record of role and cohort scoping for a user.
/// Provisioned out of band; the session store only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub full_name: Option<String>,
    pub cohort_code: Option<String>,
    /// Present only when listed by the admin console.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Name to show in listings when `full_name` was never set.
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                let id = self.id.to_string();
                format!("{}…", &id[..8])
            }
        }
    }
}
