//! Mentoring view: coaches publish slots, learners book them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::try_join;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::PortalError;
use crate::remote::models::{BookingStatus, MentoringBooking, MentoringSlot};
use crate::remote::{decode_rows, DataApi, Filter, FilterOp, SortDirection, TableQuery};

/// A booking paired with its slot, when the slot still exists.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWithSlot {
    pub booking: MentoringBooking,
    pub slot: Option<MentoringSlot>,
}

#[derive(Debug, Clone)]
pub struct NewSlot {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: i32,
}

pub struct MentoringService {
    data: Arc<dyn DataApi>,
}

impl MentoringService {
    pub fn new(data: Arc<dyn DataApi>) -> Self {
        Self { data }
    }

    /// Slots that have not ended yet, soonest first.
    pub async fn upcoming_slots(&self) -> Result<Vec<MentoringSlot>, PortalError> {
        let rows = self
            .data
            .select(
                TableQuery::from(MentoringSlot::TABLE)
                    .select(MentoringSlot::COLUMNS)
                    .gte("end_at", Utc::now().to_rfc3339())
                    .order("start_at", SortDirection::Asc)
                    .build(),
            )
            .await?;
        Ok(decode_rows(rows)?)
    }

    /// The caller's bookings, newest first, with their slots attached.
    pub async fn my_bookings(&self, learner_id: Uuid) -> Result<Vec<BookingWithSlot>, PortalError> {
        let booking_rows = self
            .data
            .select(
                TableQuery::from(MentoringBooking::TABLE)
                    .select(MentoringBooking::COLUMNS)
                    .eq("learner_id", learner_id.to_string())
                    .order("created_at", SortDirection::Desc)
                    .build(),
            )
            .await?;
        let bookings: Vec<MentoringBooking> = decode_rows(booking_rows)?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let mut slot_ids: Vec<Uuid> = bookings.iter().map(|b| b.slot_id).collect();
        slot_ids.sort_unstable();
        slot_ids.dedup();

        let slot_rows = self
            .data
            .select(
                TableQuery::from(MentoringSlot::TABLE)
                    .select(MentoringSlot::COLUMNS)
                    .in_list("id", slot_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>())
                    .build(),
            )
            .await?;
        let slots: Vec<MentoringSlot> = decode_rows(slot_rows)?;
        let by_id: HashMap<Uuid, MentoringSlot> = slots.into_iter().map(|s| (s.id, s)).collect();

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let slot = by_id.get(&booking.slot_id).cloned();
                BookingWithSlot { booking, slot }
            })
            .collect())
    }

    /// Slots and the caller's bookings, loaded side by side.
    pub async fn overview(&self, learner_id: Uuid) -> Result<(Vec<MentoringSlot>, Vec<BookingWithSlot>), PortalError> {
        try_join!(self.upcoming_slots(), self.my_bookings(learner_id))
    }

    /// The caller's active booking per slot; cancelled ones don't count.
    pub fn active_by_slot(bookings: &[BookingWithSlot]) -> HashMap<Uuid, &MentoringBooking> {
        let mut by_slot = HashMap::new();
        for entry in bookings {
            if entry.booking.status != BookingStatus::Cancelled {
                by_slot.entry(entry.booking.slot_id).or_insert(&entry.booking);
            }
        }
        by_slot
    }

    pub async fn book(
        &self,
        learner_id: Uuid,
        slot_id: Uuid,
        note: Option<String>,
    ) -> Result<MentoringBooking, PortalError> {
        let note = note.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let row = json!({
            "slot_id": slot_id,
            "learner_id": learner_id,
            "status": BookingStatus::Booked.as_str(),
            "note": note,
        });
        let mut rows = self.data.insert(MentoringBooking::TABLE, row).await?;
        if rows.is_empty() {
            return Err(PortalError::StateConflict("remote did not return the created booking".to_string()));
        }
        Ok(serde_json::from_value(rows.remove(0)).map_err(crate::remote::RemoteError::from)?)
    }

    /// Cancel an active booking. Completed or already-cancelled bookings
    /// are left alone and reported as a conflict.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<(), PortalError> {
        let filters = vec![
            Filter::new("id", FilterOp::Eq, booking_id.to_string()),
            Filter::new("status", FilterOp::Eq, BookingStatus::Booked.as_str()),
        ];
        let patch = json!({ "status": BookingStatus::Cancelled.as_str() });
        let updated = self.data.update(MentoringBooking::TABLE, filters, patch).await?;
        if updated.is_empty() {
            return Err(PortalError::StateConflict(format!("booking {} is not active", booking_id)));
        }
        Ok(())
    }

    /// Coach action: publish a bookable window.
    pub async fn create_slot(&self, coach_id: Uuid, slot: NewSlot) -> Result<MentoringSlot, PortalError> {
        if slot.end_at <= slot.start_at {
            return Err(PortalError::InvalidInput("slot must end after it starts".to_string()));
        }
        if slot.capacity < 1 {
            return Err(PortalError::InvalidInput("slot capacity must be at least 1".to_string()));
        }

        let row = json!({
            "coach_id": coach_id,
            "start_at": slot.start_at,
            "end_at": slot.end_at,
            "location": slot.location.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            "meeting_url": slot.meeting_url.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            "capacity": slot.capacity,
        });
        let mut rows = self.data.insert(MentoringSlot::TABLE, row).await?;
        if rows.is_empty() {
            return Err(PortalError::StateConflict("remote did not return the created slot".to_string()));
        }
        Ok(serde_json::from_value(rows.remove(0)).map_err(crate::remote::RemoteError::from)?)
    }
}
