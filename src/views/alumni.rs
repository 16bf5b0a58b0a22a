//! Alumni view: directory browsing and introduction requests.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::error::PortalError;
use crate::remote::models::{AlumniEntry, AlumniLink, LinkStatus};
use crate::remote::{decode_rows, DataApi, SortDirection, TableQuery};

pub struct AlumniService {
    data: Arc<dyn DataApi>,
}

impl AlumniService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self { data }
    }

    /// Directory entries, newest cohorts first.
    pub async fn directory(&self) -> Result<Vec<AlumniEntry>, PortalError> {
        let rows = self
            .data
            .select(
                TableQuery::from(AlumniEntry::TABLE)
                    .select(AlumniEntry::COLUMNS)
                    .order("cohort_code", SortDirection::Desc)
                    .build(),
            )
            .await?;
        Ok(decode_rows(rows)?)
    }

    /// Case-insensitive substring match across name, organization, region,
    /// headline and expertise tags. An empty query matches everything.
    pub fn search<'a>(entries: &'a [AlumniEntry], query: &str) -> Vec<&'a AlumniEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return entries.iter().collect();
        }
        entries
            .iter()
            .filter(|entry| {
                let tags = entry.expertise_tags.as_deref().unwrap_or(&[]).join(" ").to_lowercase();
                entry.full_name.to_lowercase().contains(&needle)
                    || entry.organization.as_deref().unwrap_or("").to_lowercase().contains(&needle)
                    || entry.region.as_deref().unwrap_or("").to_lowercase().contains(&needle)
                    || entry.headline.as_deref().unwrap_or("").to_lowercase().contains(&needle)
                    || tags.contains(&needle)
            })
            .collect()
    }

    /// The caller's introduction requests, newest first.
    pub async fn link_requests(&self, requester_id: Uuid) -> Result<Vec<AlumniLink>, PortalError> {
        let rows = self
            .data
            .select(
                TableQuery::from(AlumniLink::TABLE)
                    .select(AlumniLink::COLUMNS)
                    .eq("requester_id", requester_id.to_string())
                    .order("created_at", SortDirection::Desc)
                    .build(),
            )
            .await?;
        Ok(decode_rows(rows)?)
    }

    pub async fn request_intro(
        &self,
        requester_id: Uuid,
        target_alumni_id: Uuid,
        reason: Option<String>,
    ) -> Result<AlumniLink, PortalError> {
        let reason = reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        let row = json!({
            "requester_id": requester_id,
            "target_alumni_id": target_alumni_id,
            "reason": reason,
            "status": "requested",
        });
        let mut rows = self.data.insert(AlumniLink::TABLE, row).await?;
        if rows.is_empty() {
            return Err(PortalError::StateConflict("remote did not return the created request".to_string()));
        }
        let link: AlumniLink = serde_json::from_value(rows.remove(0)).map_err(crate::remote::RemoteError::from)?;
        debug_assert_eq!(link.status, LinkStatus::Requested);
        Ok(link)
    }
}
