use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable window a coach has published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentoringSlot {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: i32,
}

impl MentoringSlot {
    pub const TABLE: &'static str = "mentoring_slots";
    pub const COLUMNS: &'static [&'static str] =
        &["id", "coach_id", "start_at", "end_at", "location", "meeting_url", "capacity"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Booked,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentoringBooking {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub learner_id: Uuid,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MentoringBooking {
    pub const TABLE: &'static str = "mentoring_bookings";
    pub const COLUMNS: &'static [&'static str] =
        &["id", "slot_id", "learner_id", "status", "note", "created_at"];
}
