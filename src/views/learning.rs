//! Learning-module view: cohort modules with per-learner progress.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::PortalError;
use crate::remote::models::{Enrollment, EnrollmentStatus, LearningModule, Profile};
use crate::remote::{decode_rows, DataApi, SortDirection, TableQuery};
use crate::views::cohort_of;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithProgress {
    pub module: LearningModule,
    pub enrollment: Enrollment,
}

/// Aggregates over a module list; `avg_progress` is normalized to 0..=1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub avg_progress: f64,
}

pub struct LearningService {
    data: Arc<dyn DataApi>,
}

impl LearningService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self { data }
    }

    /// Modules for the caller's cohort, ordered as the curriculum lays them
    /// out, with the caller's enrollment state merged in. Modules never
    /// touched come back as `not_started` at 0%.
    pub async fn modules_with_progress(&self, profile: &Profile) -> Result<Vec<ModuleWithProgress>, PortalError> {
        let cohort = cohort_of(profile)?;

        let module_rows = self
            .data
            .select(
                TableQuery::from(LearningModule::TABLE)
                    .select(LearningModule::COLUMNS)
                    .eq("cohort_code", cohort)
                    .order("sort_order", SortDirection::Asc)
                    .build(),
            )
            .await?;
        let modules: Vec<LearningModule> = decode_rows(module_rows)?;
        if modules.is_empty() {
            return Ok(Vec::new());
        }

        let module_ids: Vec<String> = modules.iter().map(|m| m.id.to_string()).collect();
        let enrollment_rows = self
            .data
            .select(
                TableQuery::from(Enrollment::TABLE)
                    .select(&["module_id", "status", "progress"])
                    .eq("user_id", profile.id.to_string())
                    .in_list("module_id", module_ids)
                    .build(),
            )
            .await?;
        let enrollments: Vec<Enrollment> = decode_rows(enrollment_rows)?;
        let by_module: HashMap<Uuid, Enrollment> =
            enrollments.into_iter().map(|e| (e.module_id, e)).collect();

        Ok(modules
            .into_iter()
            .map(|module| {
                let enrollment = by_module
                    .get(&module.id)
                    .cloned()
                    .unwrap_or_else(|| Enrollment::not_started(module.id));
                ModuleWithProgress { module, enrollment }
            })
            .collect())
    }

    pub fn stats(items: &[ModuleWithProgress]) -> LearningStats {
        let total = items.len();
        let completed = items.iter().filter(|i| i.enrollment.status == EnrollmentStatus::Completed).count();
        let in_progress = items.iter().filter(|i| i.enrollment.status == EnrollmentStatus::InProgress).count();
        let not_started = items.iter().filter(|i| i.enrollment.status == EnrollmentStatus::NotStarted).count();
        let avg_progress = if total == 0 {
            0.0
        } else {
            items.iter().map(|i| clamp01(i.enrollment.progress / 100.0)).sum::<f64>() / total as f64
        };
        LearningStats { total, completed, in_progress, not_started, avg_progress }
    }

    /// The module to resume: first in progress, else first not started,
    /// else the first module.
    pub fn now_playing(items: &[ModuleWithProgress]) -> Option<&ModuleWithProgress> {
        items
            .iter()
            .find(|i| i.enrollment.status == EnrollmentStatus::InProgress)
            .or_else(|| items.iter().find(|i| i.enrollment.status == EnrollmentStatus::NotStarted))
            .or_else(|| items.first())
    }

    /// Mark a module as actively being worked on: status moves to
    /// `in_progress` and progress to at least 1%.
    pub async fn continue_module(&self, user_id: Uuid, item: &ModuleWithProgress) -> Result<(), PortalError> {
        let progress = item.enrollment.progress.max(1.0);
        let row = json!({
            "user_id": user_id,
            "module_id": item.module.id,
            "status": "in_progress",
            "progress": progress,
            "updated_at": Utc::now(),
        });
        self.data.upsert(Enrollment::TABLE, row, "user_id,module_id").await?;
        Ok(())
    }
}

fn clamp01(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else {
        n.clamp(0.0, 1.0)
    }
}
