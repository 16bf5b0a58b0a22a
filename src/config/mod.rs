use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub remote: RemoteConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Hosted data service endpoint shared by the table and auth clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub anon_key: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub persist_session: bool,
    pub auto_refresh_token: bool,
    /// Where the auth subsystem sends users after out-of-band email
    /// confirmation on sign-up.
    pub sign_up_redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub profile_timeout_ms: u64,
    pub visibility_recheck: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Remote overrides (SUPABASE_* kept for parity with the hosted service tooling)
        if let Ok(v) = env::var("PORTAL_REMOTE_URL").or_else(|_| env::var("SUPABASE_URL")) {
            self.remote.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PORTAL_REMOTE_ANON_KEY").or_else(|_| env::var("SUPABASE_ANON_KEY")) {
            self.remote.anon_key = v;
        }
        if let Ok(v) = env::var("PORTAL_REQUEST_TIMEOUT_SECS") {
            self.remote.request_timeout_secs = v.parse().unwrap_or(self.remote.request_timeout_secs);
        }

        // Auth overrides
        if let Ok(v) = env::var("PORTAL_PERSIST_SESSION") {
            self.auth.persist_session = v.parse().unwrap_or(self.auth.persist_session);
        }
        if let Ok(v) = env::var("PORTAL_AUTO_REFRESH_TOKEN") {
            self.auth.auto_refresh_token = v.parse().unwrap_or(self.auth.auto_refresh_token);
        }
        if let Ok(v) = env::var("PORTAL_SIGN_UP_REDIRECT") {
            self.auth.sign_up_redirect = if v.is_empty() { None } else { Some(v) };
        }

        // Session overrides
        if let Ok(v) = env::var("PORTAL_PROFILE_TIMEOUT_MS") {
            self.session.profile_timeout_ms = v.parse().unwrap_or(self.session.profile_timeout_ms);
        }
        if let Ok(v) = env::var("PORTAL_VISIBILITY_RECHECK") {
            self.session.visibility_recheck = v.parse().unwrap_or(self.session.visibility_recheck);
        }

        self
    }

    /// Fail fast on a misconfigured endpoint instead of surfacing it later
    /// as a string of confusing transport errors.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.remote.base_url)
            .map_err(|e| format!("invalid remote base URL '{}': {}", self.remote.base_url, e))?;
        if self.remote.anon_key.is_empty() {
            return Err("remote anon key is not set (PORTAL_REMOTE_ANON_KEY / SUPABASE_ANON_KEY)".to_string());
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            remote: RemoteConfig {
                // Local hosted-service emulator default
                base_url: "http://127.0.0.1:54321".to_string(),
                anon_key: String::new(),
                request_timeout_secs: 30,
            },
            auth: AuthConfig {
                persist_session: true,
                auto_refresh_token: true,
                sign_up_redirect: Some("http://localhost:5173/#/login".to_string()),
            },
            session: SessionConfig {
                profile_timeout_ms: 6000,
                visibility_recheck: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            remote: RemoteConfig {
                base_url: String::new(),
                anon_key: String::new(),
                request_timeout_secs: 15,
            },
            auth: AuthConfig {
                persist_session: true,
                auto_refresh_token: true,
                sign_up_redirect: None,
            },
            session: SessionConfig {
                profile_timeout_ms: 6000,
                visibility_recheck: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            remote: RemoteConfig {
                base_url: String::new(),
                anon_key: String::new(),
                request_timeout_secs: 10,
            },
            auth: AuthConfig {
                persist_session: true,
                auto_refresh_token: true,
                sign_up_redirect: None,
            },
            session: SessionConfig {
                profile_timeout_ms: 6000,
                visibility_recheck: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
