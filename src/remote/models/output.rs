use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an output sits in its review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Submitted,
    Reviewing,
    Approved,
    RevisionNeeded,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Submitted => "submitted",
            ReviewStatus::Reviewing => "reviewing",
            ReviewStatus::Approved => "approved",
            ReviewStatus::RevisionNeeded => "revision_needed",
        }
    }

    /// Board column for this status. Everything that is neither approved
    /// nor under review counts as a draft the author can still edit.
    pub fn stage(&self) -> OutputStage {
        match self {
            ReviewStatus::Approved => OutputStage::Final,
            ReviewStatus::Reviewing => OutputStage::Review,
            ReviewStatus::Submitted | ReviewStatus::RevisionNeeded => OutputStage::Draft,
        }
    }
}

/// Board columns: Draft → Review → Final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputStage {
    Draft,
    Review,
    Final,
}

impl OutputStage {
    pub fn label(&self) -> &'static str {
        match self {
            OutputStage::Draft => "Draft",
            OutputStage::Review => "Review",
            OutputStage::Final => "Final",
        }
    }
}

/// A submitted deliverable moving through the review pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub module_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub title: String,
    pub content: Option<String>,
    pub review_status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutputRecord {
    pub const TABLE: &'static str = "outputs";
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "module_id",
        "reviewer_id",
        "title",
        "content",
        "review_status",
        "created_at",
        "updated_at",
    ];

    pub fn stage(&self) -> OutputStage {
        self.review_status.stage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_mapping_matches_board_columns() {
        assert_eq!(ReviewStatus::Submitted.stage(), OutputStage::Draft);
        assert_eq!(ReviewStatus::RevisionNeeded.stage(), OutputStage::Draft);
        assert_eq!(ReviewStatus::Reviewing.stage(), OutputStage::Review);
        assert_eq!(ReviewStatus::Approved.stage(), OutputStage::Final);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ReviewStatus::RevisionNeeded).unwrap(), "\"revision_needed\"");
    }
}
