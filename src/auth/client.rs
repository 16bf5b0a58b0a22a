use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::auth::error::AuthError;
use crate::auth::models::{AuthChange, Session};

/// Auth subsystem surface consumed by the session store.
///
/// Implementations own the token bundle and must broadcast an [`AuthChange`]
/// for every state transition (sign-in, sign-out, silent refresh) so
/// subscribers can follow along without polling.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// The session that currently holds, silently refreshed if the
    /// implementation supports it. `None` when signed out.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Returns `None` when the subsystem requires out-of-band email
    /// confirmation before a session is issued.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to auth-state change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}
