use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::remote::models::Profile;
use crate::remote::{DataApi, TableQuery};

/// Fetch the caller's profile row, bounded by `timeout`.
///
/// Every failure mode - transport error, remote rejection, timeout, missing
/// row, malformed row - resolves to `None`. The session store treats the
/// absence of a profile as a state, not an error, so nothing here may
/// propagate or panic. The remote call is not aborted on timeout; its
/// result is simply never looked at.
pub(crate) async fn fetch_profile(
    data: &Arc<dyn DataApi>,
    user_id: Uuid,
    timeout: Duration,
) -> Option<Profile> {
    let query = TableQuery::from("profiles")
        .select(&["id", "role", "full_name", "cohort_code"])
        .eq("id", user_id.to_string())
        .limit(1)
        .build();

    let rows = match tokio::time::timeout(timeout, data.select(query)).await {
        Err(_) => {
            tracing::warn!(%user_id, timeout_ms = timeout.as_millis() as u64, "profile fetch timed out");
            return None;
        }
        Ok(Err(err)) => {
            tracing::warn!(%user_id, error = %err, "profile fetch failed");
            return None;
        }
        Ok(Ok(rows)) => rows,
    };

    let row = rows.into_iter().next()?;
    match serde_json::from_value::<Profile>(row) {
        Ok(profile) => Some(profile),
        Err(err) => {
            tracing::warn!(%user_id, error = %err, "profile row failed to decode");
            None
        }
    }
}
