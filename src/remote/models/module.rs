use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One learning module, scoped to a cohort and ordered within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningModule {
    pub id: Uuid,
    pub cohort_code: String,
    pub title: String,
    pub description: Option<String>,
    pub content_url: Option<String>,
    pub sort_order: i32,
}

impl LearningModule {
    pub const TABLE: &'static str = "modules";
    pub const COLUMNS: &'static [&'static str] =
        &["id", "cohort_code", "title", "description", "content_url", "sort_order"];
}
