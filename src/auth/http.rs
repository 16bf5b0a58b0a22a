use std::fs;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{json, Value};
use tokio::sync::{broadcast, Mutex};

use crate::auth::client::AuthApi;
use crate::auth::error::AuthError;
use crate::auth::models::{AuthChange, AuthEventKind, Session, TokenResponse};
use crate::config::{AuthConfig, RemoteConfig};
use crate::remote::error::api_message;

/// Refresh this long before actual expiry so an in-flight request never
/// crosses the boundary with a dead token.
const REFRESH_LEEWAY_SECS: i64 = 30;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// HTTP client for the hosted auth subsystem (password grant flavor).
///
/// Owns the current session, optionally persists it across processes in the
/// config directory, refreshes it silently when it nears expiry, and
/// broadcasts an [`AuthChange`] on every transition.
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    persist: bool,
    auto_refresh: bool,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

impl HttpAuthClient {
    pub fn new(remote: &RemoteConfig, auth: &AuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(remote.request_timeout_secs))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let persisted = if auth.persist_session { load_persisted_session() } else { None };

        Ok(Self {
            http,
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            anon_key: remote.anon_key.clone(),
            persist: auth.persist_session,
            auto_refresh: auth.auto_refresh_token,
            session: Mutex::new(persisted),
            events,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn post_auth(&self, url: String, query: &[(&str, &str)], body: Value) -> Result<Value, AuthError> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .query(query)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = api_message(&text)
                .unwrap_or_else(|| if text.is_empty() { "authentication rejected".to_string() } else { text });
            return Err(AuthError::Rejected { status: status.as_u16(), message });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Replace the held session, write it through to disk, and notify.
    async fn install(&self, session: Option<Session>, kind: AuthEventKind) {
        {
            *self.session.lock().await = session.clone();
        }
        if self.persist {
            persist_session(session.as_ref());
        }
        // No receivers yet is fine; the store subscribes when it spawns.
        let _ = self.events.send(AuthChange { kind, session });
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let payload = self
            .post_auth(
                self.endpoint("token"),
                &[("grant_type", "refresh_token")],
                json!({ "refresh_token": refresh_token }),
            )
            .await?;
        let response: TokenResponse = serde_json::from_value(payload)?;
        Ok(response.into_session())
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let current = { self.session.lock().await.clone() };
        let Some(session) = current else { return Ok(None) };

        if !session.is_expired(Duration::seconds(REFRESH_LEEWAY_SECS)) {
            return Ok(Some(session));
        }
        if !self.auto_refresh {
            return Ok(None);
        }

        match self.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                tracing::debug!("session silently refreshed");
                self.install(Some(fresh.clone()), AuthEventKind::TokenRefreshed).await;
                Ok(Some(fresh))
            }
            Err(err) => {
                tracing::warn!(error = %err, "session refresh failed; treating as signed out");
                self.install(None, AuthEventKind::SignedOut).await;
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let payload = self
            .post_auth(
                self.endpoint("token"),
                &[("grant_type", "password")],
                json!({ "email": email, "password": password }),
            )
            .await?;
        let response: TokenResponse = serde_json::from_value(payload)?;
        let session = response.into_session();
        self.install(Some(session.clone()), AuthEventKind::SignedIn).await;
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<Option<Session>, AuthError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(target) = redirect_to {
            query.push(("redirect_to", target));
        }
        let payload = self
            .post_auth(self.endpoint("signup"), &query, json!({ "email": email, "password": password }))
            .await?;

        // With confirmation disabled the subsystem answers with a full token
        // bundle; otherwise it returns the bare user and the session arrives
        // only after the email round-trip.
        if payload.get("access_token").is_some() {
            let response: TokenResponse = serde_json::from_value(payload)?;
            let session = response.into_session();
            self.install(Some(session.clone()), AuthEventKind::SignedIn).await;
            Ok(Some(session))
        } else {
            tracing::info!("sign-up accepted; awaiting email confirmation");
            Ok(None)
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let current = { self.session.lock().await.clone() };
        if let Some(session) = current {
            let result = self
                .http
                .post(self.endpoint("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
            if let Err(err) = result {
                // Local state clears regardless; the server token will age out.
                tracing::warn!(error = %err, "remote logout failed");
            }
        }
        self.install(None, AuthEventKind::SignedOut).await;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

fn config_dir() -> Option<PathBuf> {
    let dir = if let Ok(custom) = std::env::var("ISLS_PORTAL_CONFIG_DIR") {
        PathBuf::from(custom)
    } else {
        let home = std::env::var("HOME").ok()?;
        PathBuf::from(home).join(".config").join("isls-portal")
    };
    if !dir.exists() {
        fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

fn session_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("session.json"))
}

fn load_persisted_session() -> Option<Session> {
    let path = session_file()?;
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable persisted session");
            None
        }
    }
}

fn persist_session(session: Option<&Session>) {
    let Some(path) = session_file() else { return };
    let result = match session {
        Some(session) => {
            serde_json::to_string_pretty(session).map_err(std::io::Error::other).and_then(|s| fs::write(&path, s))
        }
        None => {
            if path.exists() {
                fs::remove_file(&path)
            } else {
                Ok(())
            }
        }
    };
    if let Err(err) = result {
        tracing::warn!(error = %err, "could not persist session state");
    }
}
