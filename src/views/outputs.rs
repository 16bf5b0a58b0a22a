//! Output review pipeline: submissions move Draft → Review → Final.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::try_join;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::PortalError;
use crate::remote::models::{LearningModule, OutputRecord, OutputStage, Profile, ReviewStatus};
use crate::remote::{decode_rows, DataApi, Filter, FilterOp, SortDirection, TableQuery};
use crate::views::cohort_of;

/// The cohort's board: its modules (for linking submissions) plus outputs
/// grouped into the three workflow columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputBoard {
    pub modules: Vec<LearningModule>,
    pub draft: Vec<OutputRecord>,
    pub review: Vec<OutputRecord>,
    pub finished: Vec<OutputRecord>,
}

impl OutputBoard {
    pub fn column(&self, stage: OutputStage) -> &[OutputRecord] {
        match stage {
            OutputStage::Draft => &self.draft,
            OutputStage::Review => &self.review,
            OutputStage::Final => &self.finished,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOutput {
    pub title: String,
    pub module_id: Option<Uuid>,
    pub content: Option<String>,
}

/// Coach-facing queue entry with names resolved from profiles.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewQueueEntry {
    pub output: OutputRecord,
    pub author_name: Option<String>,
    pub reviewer_name: Option<String>,
}

pub struct OutputService {
    data: Arc<dyn DataApi>,
}

impl OutputService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self { data }
    }

    pub async fn board(&self, profile: &Profile) -> Result<OutputBoard, PortalError> {
        let cohort = cohort_of(profile)?;

        let modules_query = TableQuery::from(LearningModule::TABLE)
            .select(LearningModule::COLUMNS)
            .eq("cohort_code", cohort)
            .order("sort_order", SortDirection::Asc)
            .build();
        let outputs_query = TableQuery::from(OutputRecord::TABLE)
            .select(OutputRecord::COLUMNS)
            .eq("cohort_code", cohort)
            .order("updated_at", SortDirection::Desc)
            .build();

        let (module_rows, output_rows) =
            try_join!(self.data.select(modules_query), self.data.select(outputs_query))?;

        let mut board = OutputBoard { modules: decode_rows(module_rows)?, ..Default::default() };
        for output in decode_rows::<OutputRecord>(output_rows)? {
            match output.stage() {
                OutputStage::Draft => board.draft.push(output),
                OutputStage::Review => board.review.push(output),
                OutputStage::Final => board.finished.push(output),
            }
        }
        Ok(board)
    }

    /// Submit a new output into the Draft column.
    pub async fn submit(&self, profile: &Profile, draft: NewOutput) -> Result<OutputRecord, PortalError> {
        let cohort = cohort_of(profile)?;
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(PortalError::InvalidInput("output title must not be empty".to_string()));
        }
        let content = draft.content.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let row = json!({
            "cohort_code": cohort,
            "user_id": profile.id,
            "module_id": draft.module_id,
            "title": title,
            "content": content,
            "review_status": ReviewStatus::Submitted.as_str(),
        });
        let mut rows = self.data.insert(OutputRecord::TABLE, row).await?;
        if rows.is_empty() {
            return Err(PortalError::StateConflict("remote did not return the created output".to_string()));
        }
        Ok(serde_json::from_value(rows.remove(0)).map_err(crate::remote::RemoteError::from)?)
    }

    /// Author action: ask for coach feedback. Valid from the Draft column.
    pub async fn request_review(&self, id: Uuid) -> Result<(), PortalError> {
        self.transition(id, &[ReviewStatus::Submitted, ReviewStatus::RevisionNeeded], ReviewStatus::Reviewing, None)
            .await
    }

    /// Reviewer verdict: approve into the Final column.
    pub async fn approve(&self, id: Uuid) -> Result<(), PortalError> {
        self.transition(id, &[ReviewStatus::Reviewing], ReviewStatus::Approved, None).await
    }

    /// Reviewer verdict: send back for another pass.
    pub async fn needs_revision(&self, id: Uuid) -> Result<(), PortalError> {
        self.transition(id, &[ReviewStatus::Reviewing], ReviewStatus::RevisionNeeded, None).await
    }

    /// Coach action: take an output into review under the given reviewer.
    pub async fn claim_for_review(&self, reviewer_id: Uuid, id: Uuid) -> Result<(), PortalError> {
        self.transition(
            id,
            &[ReviewStatus::Submitted, ReviewStatus::RevisionNeeded],
            ReviewStatus::Reviewing,
            Some(reviewer_id),
        )
        .await
    }

    /// Guarded status move: the update filters on the expected current
    /// statuses, so a transition whose precondition no longer holds updates
    /// zero rows and surfaces as a conflict instead of overwriting a
    /// concurrent change.
    async fn transition(
        &self,
        id: Uuid,
        from: &[ReviewStatus],
        to: ReviewStatus,
        reviewer_id: Option<Uuid>,
    ) -> Result<(), PortalError> {
        let mut patch = json!({
            "review_status": to.as_str(),
            "updated_at": Utc::now(),
        });
        if let Some(reviewer) = reviewer_id {
            patch["reviewer_id"] = json!(reviewer);
        }

        let expected: Vec<serde_json::Value> =
            from.iter().map(|s| serde_json::Value::String(s.as_str().to_string())).collect();
        let filters = vec![
            Filter::new("id", FilterOp::Eq, id.to_string()),
            Filter::new("review_status", FilterOp::In, serde_json::Value::Array(expected)),
        ];

        let updated = self.data.update(OutputRecord::TABLE, filters, patch).await?;
        if updated.is_empty() {
            return Err(PortalError::StateConflict(format!(
                "output {} is not in a state that can move to {}",
                id,
                to.as_str()
            )));
        }
        Ok(())
    }

    /// Coach view: every visible output, newest first, with author and
    /// reviewer names joined from profiles.
    pub async fn review_queue(&self) -> Result<Vec<ReviewQueueEntry>, PortalError> {
        let output_rows = self
            .data
            .select(
                TableQuery::from(OutputRecord::TABLE)
                    .select(OutputRecord::COLUMNS)
                    .order("updated_at", SortDirection::Desc)
                    .build(),
            )
            .await?;
        let outputs: Vec<OutputRecord> = decode_rows(output_rows)?;

        let mut ids: Vec<Uuid> = outputs
            .iter()
            .flat_map(|o| [Some(o.user_id), o.reviewer_id])
            .flatten()
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let names: HashMap<Uuid, Option<String>> = if ids.is_empty() {
            HashMap::new()
        } else {
            let profile_rows = self
                .data
                .select(
                    TableQuery::from("profiles")
                        .select(&["id", "full_name"])
                        .in_list("id", ids.iter().map(|id| id.to_string()).collect::<Vec<_>>())
                        .build(),
                )
                .await?;
            profile_rows
                .into_iter()
                .filter_map(|row| {
                    let id = row.get("id").and_then(|v| v.as_str()).and_then(|s| s.parse().ok())?;
                    let name = row.get("full_name").and_then(|v| v.as_str()).map(String::from);
                    Some((id, name))
                })
                .collect()
        };

        Ok(outputs
            .into_iter()
            .map(|output| {
                let author_name = names.get(&output.user_id).cloned().flatten();
                let reviewer_name =
                    output.reviewer_id.and_then(|id| names.get(&id).cloned().flatten());
                ReviewQueueEntry { output, author_name, reviewer_name }
            })
            .collect())
    }
}
