//! Admin console: operating metrics plus user/role management.

use std::sync::Arc;

use futures::try_join;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::PortalError;
use crate::remote::models::{LearningModule, MentoringBooking, OutputRecord, Profile};
use crate::remote::{decode_rows, DataApi, Filter, FilterOp, SortDirection, TableQuery};
use crate::types::Role;

const RECENT_PROFILES_LIMIT: u32 = 50;

/// Headline counts for the console dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOverview {
    pub users: u64,
    pub modules: u64,
    pub outputs: u64,
    pub bookings: u64,
}

pub struct AdminService {
    data: Arc<dyn DataApi>,
}

impl AdminService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self { data }
    }

    /// The most recently created profiles.
    pub async fn recent_profiles(&self) -> Result<Vec<Profile>, PortalError> {
        let rows = self
            .data
            .select(
                TableQuery::from("profiles")
                    .select(&["id", "role", "full_name", "cohort_code", "created_at"])
                    .order("created_at", SortDirection::Desc)
                    .limit(RECENT_PROFILES_LIMIT)
                    .build(),
            )
            .await?;
        Ok(decode_rows(rows)?)
    }

    pub async fn overview(&self) -> Result<AdminOverview, PortalError> {
        let (users, modules, outputs, bookings) = try_join!(
            self.data.count("profiles", Vec::new()),
            self.data.count(LearningModule::TABLE, Vec::new()),
            self.data.count(OutputRecord::TABLE, Vec::new()),
            self.data.count(MentoringBooking::TABLE, Vec::new()),
        )?;
        Ok(AdminOverview { users, modules, outputs, bookings })
    }

    pub async fn set_role(&self, profile_id: Uuid, role: Role) -> Result<(), PortalError> {
        self.patch_profile(profile_id, json!({ "role": role })).await
    }

    /// Assign or clear a user's cohort. `None` clears it.
    pub async fn set_cohort(&self, profile_id: Uuid, cohort_code: Option<String>) -> Result<(), PortalError> {
        let cohort = cohort_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        self.patch_profile(profile_id, json!({ "cohort_code": cohort })).await
    }

    pub async fn set_full_name(&self, profile_id: Uuid, full_name: String) -> Result<(), PortalError> {
        let name = full_name.trim();
        if name.is_empty() {
            return Err(PortalError::InvalidInput("full name must not be empty".to_string()));
        }
        self.patch_profile(profile_id, json!({ "full_name": name })).await
    }

    async fn patch_profile(&self, profile_id: Uuid, patch: Value) -> Result<(), PortalError> {
        let filters = vec![Filter::new("id", FilterOp::Eq, profile_id.to_string())];
        let updated = self.data.update("profiles", filters, patch).await?;
        if updated.is_empty() {
            return Err(PortalError::NotFound(format!("profile {}", profile_id)));
        }
        Ok(())
    }
}
