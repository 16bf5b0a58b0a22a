// Process-wide authentication state.
//
// Single writer (the store's own async paths), many readers through the
// watch channel. `loading` is asserted once, for the boot sequence; every
// later refresh - auth events, silent token refresh, visibility re-checks -
// updates state quietly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::auth::{AuthApi, AuthUser, Session};
use crate::config::AppConfig;
use crate::remote::models::Profile;
use crate::remote::DataApi;
use crate::session::profile::fetch_profile;
use crate::session::visibility::Visibility;
use crate::types::{ActionOutcome, Role};

/// Read-only view of the authentication state, published on every change.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    /// True only during the initial boot sequence.
    pub loading: bool,
}

impl AuthSnapshot {
    fn booting() -> Self {
        Self { session: None, user: None, profile: None, loading: true }
    }

    /// Role used for gating decisions; `learner` until a profile is loaded.
    pub fn effective_role(&self) -> Role {
        self.profile.as_ref().map(|p| p.role).unwrap_or(Role::Learner)
    }
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub profile_timeout: Duration,
    pub sign_up_redirect: Option<String>,
}

impl StoreOptions {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            profile_timeout: Duration::from_millis(cfg.session.profile_timeout_ms),
            sign_up_redirect: cfg.auth.sign_up_redirect.clone(),
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { profile_timeout: Duration::from_millis(6000), sign_up_redirect: None }
    }
}

struct StoreInner {
    auth: Arc<dyn AuthApi>,
    data: Arc<dyn DataApi>,
    profile_timeout: Duration,
    sign_up_redirect: Option<String>,
    state: watch::Sender<AuthSnapshot>,
    /// Generation stamp for profile resolutions; only the newest may apply.
    profile_seq: AtomicU64,
    /// Cleared by `shutdown`; once false, nothing may touch `state`.
    alive: AtomicBool,
}

impl StoreInner {
    fn apply(&self, mutate: impl FnOnce(&mut AuthSnapshot)) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }
        self.state.send_modify(mutate);
    }

    fn set_identity(&self, session: Option<Session>) {
        let user = session.as_ref().map(|s| s.user.clone());
        self.apply(|snap| {
            snap.session = session;
            snap.user = user;
        });
    }

    /// Resolve the profile for `user` under the staleness guard: the result
    /// is discarded if a newer resolution was initiated meanwhile, so a
    /// slow fetch can never overwrite a newer session's profile.
    async fn refresh_profile(&self, user: Option<&AuthUser>) {
        let seq = self.profile_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = match user {
            Some(user) => fetch_profile(&self.data, user.id, self.profile_timeout).await,
            None => None,
        };

        if seq != self.profile_seq.load(Ordering::SeqCst) {
            tracing::debug!(seq, "discarding superseded profile resolution");
            return;
        }
        self.apply(|snap| snap.profile = fetched);
    }

    /// Quiet re-fetch of session and profile; never touches `loading`.
    async fn recheck(&self) {
        let session = match self.auth.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "session re-check failed");
                return;
            }
        };
        let user = session.as_ref().map(|s| s.user.clone());
        self.set_identity(session);
        self.refresh_profile(user.as_ref()).await;
    }
}

/// Holder of process-wide auth state. Construct once, `boot` once, then
/// read snapshots or subscribe for updates anywhere.
pub struct SessionStore {
    inner: Arc<StoreInner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthApi>, data: Arc<dyn DataApi>, options: StoreOptions) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::booting());
        let inner = Arc::new(StoreInner {
            auth,
            data,
            profile_timeout: options.profile_timeout,
            sign_up_redirect: options.sign_up_redirect,
            state,
            profile_seq: AtomicU64::new(0),
            alive: AtomicBool::new(true),
        });

        let store = Self { inner, tasks: Mutex::new(Vec::new()) };
        store.spawn_auth_listener();
        store
    }

    /// First activation: resolve the current session and profile, then
    /// clear `loading` no matter how resolution went.
    pub async fn boot(&self) {
        match self.inner.auth.current_session().await {
            Ok(session) => {
                let user = session.as_ref().map(|s| s.user.clone());
                self.inner.set_identity(session);
                self.inner.refresh_profile(user.as_ref()).await;
            }
            Err(err) => tracing::warn!(error = %err, "session bootstrap failed"),
        }
        self.inner.apply(|snap| snap.loading = false);
        tracing::debug!("session store booted");
    }

    fn spawn_auth_listener(&self) {
        let inner = Arc::clone(&self.inner);
        let mut events = inner.auth.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => {
                        if !inner.alive.load(Ordering::SeqCst) {
                            break;
                        }
                        tracing::debug!(kind = ?change.kind, "auth state change");
                        let user = change.session.as_ref().map(|s| s.user.clone());
                        inner.set_identity(change.session);
                        inner.refresh_profile(user.as_ref()).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Dropped notifications: resynchronize from source.
                        tracing::warn!(skipped, "auth events lagged; re-checking session");
                        inner.recheck().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.track(handle);
    }

    /// Watch the host visibility signal; a hidden-to-visible transition
    /// triggers a quiet session/profile re-check to recover from state that
    /// drifted while the process was backgrounded.
    pub fn attach_visibility(&self, mut visibility: watch::Receiver<Visibility>) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut last = *visibility.borrow();
            while visibility.changed().await.is_ok() {
                let current = *visibility.borrow();
                let foregrounded = last == Visibility::Hidden && current == Visibility::Visible;
                last = current;
                if !foregrounded {
                    continue;
                }
                if !inner.alive.load(Ordering::SeqCst) {
                    break;
                }
                tracing::debug!("host became visible; re-checking session");
                inner.recheck().await;
            }
        });
        self.track(handle);
    }

    fn track(&self, handle: JoinHandle<()>) {
        self.tasks.lock().expect("task list poisoned").push(handle);
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Delegates to the auth subsystem. State updates arrive through the
    /// change notification, not from this call.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ActionOutcome {
        match self.inner.auth.sign_in_with_password(email, password).await {
            Ok(_) => ActionOutcome::success(),
            Err(err) => ActionOutcome::failure(err.user_message()),
        }
    }

    /// Same contract as sign-in. When the subsystem requires email
    /// confirmation the outcome is still `ok`; the session simply arrives
    /// later (or not at all) through the usual notification path.
    pub async fn sign_up_with_password(&self, email: &str, password: &str) -> ActionOutcome {
        let redirect = self.inner.sign_up_redirect.as_deref();
        match self.inner.auth.sign_up(email, password, redirect).await {
            Ok(_) => ActionOutcome::success(),
            Err(err) => ActionOutcome::failure(err.user_message()),
        }
    }

    pub async fn sign_out(&self) {
        if let Err(err) = self.inner.auth.sign_out().await {
            tracing::warn!(error = %err, "sign-out request failed");
        }
    }

    /// Manual equivalent of the visibility re-check.
    pub async fn recheck(&self) {
        self.inner.recheck().await;
    }

    /// Stop applying results and detach from all external notifications.
    /// Late-resolving fetches become no-ops; the store is done for good.
    pub fn shutdown(&self) {
        self.inner.alive.store(false, Ordering::SeqCst);
        for task in self.tasks.lock().expect("task list poisoned").drain(..) {
            task.abort();
        }
        tracing::debug!("session store shut down");
    }
}
