//! Access-control decisions for protected views.
//!
//! The guard is a pure function of the published auth snapshot plus the
//! intended destination; it holds no state of its own and is re-evaluated
//! on every navigation. Data fetching stays in the session store and the
//! feature views.

use tokio::sync::watch;

use crate::session::AuthSnapshot;
use crate::types::Role;

/// Outcome of evaluating a navigation against the current auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Boot has not finished: show the neutral placeholder, never redirect.
    Loading,
    /// Not signed in: go to the sign-in entry point, carrying the intended
    /// destination so sign-in can return the user there.
    RedirectToLogin { from: String },
    /// Signed in, but the role is not allowed here: land on the default
    /// authenticated page instead.
    RedirectToHome,
    /// Render the protected content.
    Render,
}

/// Decide what to do with a navigation to `path`.
///
/// `allow` of `None` or an empty slice means any authenticated role. While
/// the profile is still loading (or absent) the role falls back to
/// `learner` - the least-privileged default, applied deliberately even
/// before the real profile is known.
pub fn decide(snapshot: &AuthSnapshot, path: &str, allow: Option<&[Role]>) -> RouteDecision {
    if snapshot.loading {
        return RouteDecision::Loading;
    }
    if snapshot.user.is_none() {
        return RouteDecision::RedirectToLogin { from: path.to_string() };
    }

    let role = snapshot.effective_role();
    match allow {
        Some(roles) if !roles.is_empty() && !roles.contains(&role) => RouteDecision::RedirectToHome,
        _ => RouteDecision::Render,
    }
}

/// A protected route and the roles allowed to enter it.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub allow: Option<&'static [Role]>,
}

/// The portal's protected routes. Paths not listed here are public.
pub const ROUTES: &[Route] = &[
    Route { path: "/lms", allow: None },
    Route { path: "/output", allow: None },
    Route { path: "/mentoring", allow: None },
    Route { path: "/alumni", allow: None },
    Route { path: "/coach", allow: Some(&[Role::Coach, Role::Admin]) },
    Route { path: "/admin", allow: Some(&[Role::Admin]) },
];

pub fn route(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.path == path)
}

/// Evaluate a navigation against the route table. Unlisted paths render
/// unconditionally (the public area).
pub fn decide_for_path(snapshot: &AuthSnapshot, path: &str) -> RouteDecision {
    match route(path) {
        Some(entry) => decide(snapshot, path, entry.allow),
        None => RouteDecision::Render,
    }
}

/// Guard bound to a live store subscription. Constructing one requires the
/// subscription, so the "used without a provider" failure of ad-hoc wiring
/// cannot be expressed; every check reads the then-current snapshot.
pub struct RouteGuard {
    state: watch::Receiver<AuthSnapshot>,
}

impl RouteGuard {
    pub fn new(state: watch::Receiver<AuthSnapshot>) -> Self {
        Self { state }
    }

    pub fn check(&self, path: &str) -> RouteDecision {
        decide_for_path(&self.state.borrow(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(loading: bool) -> AuthSnapshot {
        AuthSnapshot { session: None, user: None, profile: None, loading }
    }

    #[test]
    fn loading_renders_placeholder_not_redirect() {
        let decision = decide(&snapshot(true), "/admin", Some(&[Role::Admin]));
        assert_eq!(decision, RouteDecision::Loading);
    }

    #[test]
    fn missing_user_redirects_to_login_with_origin() {
        let decision = decide(&snapshot(false), "/lms", None);
        assert_eq!(decision, RouteDecision::RedirectToLogin { from: "/lms".to_string() });
    }

    #[test]
    fn route_table_covers_elevated_areas() {
        assert!(route("/coach").unwrap().allow.unwrap().contains(&Role::Coach));
        assert!(route("/admin").unwrap().allow.unwrap().contains(&Role::Admin));
        assert!(route("/lms").unwrap().allow.is_none());
        assert!(route("/nonexistent").is_none());
    }
}
