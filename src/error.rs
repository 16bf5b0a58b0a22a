// Portal-level error taxonomy shared by the feature views and the CLI.
//
// The session store deliberately does not use these: its failure semantics
// are "swallow and degrade" (no profile, default role), never a typed error.

use thiserror::Error;

use crate::auth::AuthError;
use crate::remote::RemoteError;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A mutation whose precondition no longer held (e.g. a review
    /// transition raced a concurrent reviewer) updated zero rows.
    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The caller's profile has no cohort assigned; cohort-scoped queries
    /// would return nothing, so surface the setup problem instead.
    #[error("profile has no cohort code set; ask an admin to assign one")]
    MissingCohort,
}
