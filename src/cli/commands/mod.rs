pub mod admin;
pub mod alumni;
pub mod auth;
pub mod coach;
pub mod learn;
pub mod mentoring;
pub mod output;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};

use crate::auth::{AuthApi, HttpAuthClient};
use crate::config;
use crate::guard::{self, RouteDecision};
use crate::remote::models::Profile;
use crate::remote::{DataApi, HttpRemoteClient};
use crate::session::{AuthSnapshot, SessionStore, StoreOptions, VisibilitySignal};

/// Shared wiring for every command: config, the two remote clients and a
/// booted session store.
pub struct PortalContext {
    pub store: SessionStore,
    /// Hook for embedding shells to report foreground/background moves.
    pub visibility: VisibilitySignal,
    data: Arc<HttpRemoteClient>,
}

impl PortalContext {
    pub async fn bootstrap() -> anyhow::Result<Self> {
        let cfg = config::config();
        cfg.validate().map_err(|message| anyhow::anyhow!(message))?;

        let auth = Arc::new(HttpAuthClient::new(&cfg.remote, &cfg.auth).context("auth client setup failed")?);
        let data = Arc::new(HttpRemoteClient::new(&cfg.remote).context("remote client setup failed")?);

        let store = SessionStore::new(
            auth.clone() as Arc<dyn AuthApi>,
            data.clone() as Arc<dyn DataApi>,
            StoreOptions::from_config(cfg),
        );
        store.boot().await;

        let visibility = VisibilitySignal::new();
        if cfg.session.visibility_recheck {
            store.attach_visibility(visibility.subscribe());
        }

        let ctx = Self { store, visibility, data };
        ctx.sync_access_token().await;
        Ok(ctx)
    }

    pub fn data_api(&self) -> Arc<dyn DataApi> {
        self.data.clone()
    }

    /// Keep the table client's bearer in step with the current session.
    pub async fn sync_access_token(&self) {
        let token = self.store.snapshot().session.map(|s| s.access_token);
        self.data.set_access_token(token).await;
    }

    /// Evaluate the route guard for `path` and translate redirects into
    /// command-line errors.
    pub fn require_route(&self, path: &str) -> anyhow::Result<AuthSnapshot> {
        let snapshot = self.store.snapshot();
        match guard::decide_for_path(&snapshot, path) {
            RouteDecision::Render => Ok(snapshot),
            RouteDecision::Loading => bail!("session is still loading; try again"),
            RouteDecision::RedirectToLogin { .. } => {
                bail!("not signed in - run `isls auth login` first")
            }
            RouteDecision::RedirectToHome => {
                bail!("your role does not have access to {}", path)
            }
        }
    }

    /// The caller's profile, which most views need for scoping.
    pub fn require_profile(&self, snapshot: &AuthSnapshot) -> anyhow::Result<Profile> {
        snapshot
            .profile
            .clone()
            .context("your profile has not been provisioned yet; contact an admin")
    }
}

pub fn fmt_dt(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}
