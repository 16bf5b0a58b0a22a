// Feature views: typed query/mutation layers over the remote data client.
// Each scopes its queries by the caller's profile and assumes the route
// guard already enforced access.

pub mod admin;
pub mod alumni;
pub mod learning;
pub mod mentoring;
pub mod outputs;

use crate::error::PortalError;
use crate::remote::models::Profile;

/// Cohort key used to scope a view's queries; most tables partition on it.
pub(crate) fn cohort_of(profile: &Profile) -> Result<&str, PortalError> {
    profile.cohort_code.as_deref().filter(|c| !c.is_empty()).ok_or(PortalError::MissingCohort)
}
