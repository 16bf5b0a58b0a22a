use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::token;

/// Identity record issued by the auth subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Token bundle proving authentication. Owned by the auth client / session
/// store; everything else reads clones out of the published snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Expired (or about to expire within `leeway`), so a silent refresh is
    /// due before the token is used.
    pub fn is_expired(&self, leeway: Duration) -> bool {
        Utc::now() + leeway >= self.expires_at
    }
}

/// Kind of auth-state transition reported by the subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// One change notification: the kind of transition plus the session that
/// now holds (None after sign-out or a failed refresh).
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

/// Wire shape of the token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl TokenResponse {
    /// Resolve the expiry instant: the explicit field when present, else
    /// the access token's own claim, else the relative lifetime.
    pub fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| token::expires_at(&self.access_token))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: Some("a@b.c".into()), created_at: None, last_sign_in_at: None }
    }

    #[test]
    fn session_expiry_respects_leeway() {
        let session = Session {
            access_token: "t".into(),
            refresh_token: "r".into(),
            expires_at: Utc::now() + Duration::seconds(10),
            user: user(),
        };
        assert!(!session.is_expired(Duration::zero()));
        assert!(session.is_expired(Duration::seconds(30)));
    }

    #[test]
    fn token_response_prefers_explicit_expiry() {
        let response = TokenResponse {
            access_token: "not-a-jwt".into(),
            refresh_token: "r".into(),
            expires_in: Some(3600),
            expires_at: Some(1_900_000_000),
            user: user(),
        };
        let session = response.into_session();
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
    }

    #[test]
    fn token_response_falls_back_to_relative_lifetime() {
        let before = Utc::now();
        let response = TokenResponse {
            access_token: "not-a-jwt".into(),
            refresh_token: "r".into(),
            expires_in: Some(60),
            expires_at: None,
            user: user(),
        };
        let session = response.into_session();
        assert!(session.expires_at >= before + Duration::seconds(59));
        assert!(session.expires_at <= Utc::now() + Duration::seconds(61));
    }
}
