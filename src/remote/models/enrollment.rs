use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl EnrollmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnrollmentStatus::Completed => "Completed",
            EnrollmentStatus::InProgress => "In progress",
            EnrollmentStatus::NotStarted => "Not started",
        }
    }
}

/// A learner's progress on one module. Progress is a percentage in 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub module_id: Uuid,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub progress: f64,
}

impl Enrollment {
    pub const TABLE: &'static str = "enrollments";

    /// Stand-in for a module the learner has not touched yet.
    pub fn not_started(module_id: Uuid) -> Self {
        Self { module_id, status: EnrollmentStatus::NotStarted, progress: 0.0 }
    }
}
