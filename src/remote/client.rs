use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::RemoteConfig;
use crate::remote::error::{api_message, RemoteError};
use crate::remote::query::{Filter, SelectQuery};

/// Request/response access to named remote tables.
///
/// The hosted service is a black box behind this trait: the HTTP client
/// below talks to it in production, and tests substitute in-memory fakes.
/// Calls are expected to fail or hang under network stress; callers either
/// bound them with timeouts (the session store) or propagate typed errors
/// (the feature views).
#[async_trait]
pub trait DataApi: Send + Sync {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, RemoteError>;

    async fn count(&self, table: &str, filters: Vec<Filter>) -> Result<u64, RemoteError>;

    /// Insert one row; returns the created row(s) as stored remotely.
    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, RemoteError>;

    /// Patch every row matching `filters`; returns the rows actually
    /// updated, which is how callers detect a failed precondition.
    async fn update(&self, table: &str, filters: Vec<Filter>, patch: Value) -> Result<Vec<Value>, RemoteError>;

    /// Insert-or-merge on the `on_conflict` column set.
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Vec<Value>, RemoteError>;
}

/// HTTP implementation over the hosted table endpoint.
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// Access token of the signed-in user; falls back to the anon key.
    bearer: RwLock<Option<String>>,
}

impl HttpRemoteClient {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            anon_key: cfg.anon_key.clone(),
            bearer: RwLock::new(None),
        })
    }

    /// Keep row-level security scoped to the signed-in user. `None` drops
    /// back to anonymous access.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.bearer.write().await = token;
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn headers(&self) -> HeaderMap {
        let token = self.bearer.read().await.clone().unwrap_or_else(|| self.anon_key.clone());
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Value>, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = api_message(&body).unwrap_or_else(|| {
                if body.is_empty() { "request rejected".to_string() } else { body }
            });
            return Err(RemoteError::Api { status: status.as_u16(), message });
        }
        Ok(response.json::<Vec<Value>>().await?)
    }
}

#[async_trait]
impl DataApi for HttpRemoteClient {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!(table = %query.table, filters = query.filters.len(), "remote select");
        let response = self
            .http
            .get(self.table_url(&query.table))
            .headers(self.headers().await)
            .query(&query.params())
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn count(&self, table: &str, filters: Vec<Filter>) -> Result<u64, RemoteError> {
        let params: Vec<(String, String)> = filters.iter().map(Filter::as_param).collect();
        let response = self
            .http
            .head(self.table_url(table))
            .headers(self.headers().await)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api { status: status.as_u16(), message: "count rejected".to_string() });
        }

        // Content-Range is "<from>-<to>/<total>" or "*/<total>"
        response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|total| total.parse::<u64>().ok())
            .ok_or(RemoteError::MissingCount)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!(table, "remote insert");
        let response = self
            .http
            .post(self.table_url(table))
            .headers(self.headers().await)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn update(&self, table: &str, filters: Vec<Filter>, patch: Value) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!(table, filters = filters.len(), "remote update");
        let params: Vec<(String, String)> = filters.iter().map(Filter::as_param).collect();
        let response = self
            .http
            .patch(self.table_url(table))
            .headers(self.headers().await)
            .header("Prefer", "return=representation")
            .query(&params)
            .json(&patch)
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!(table, on_conflict, "remote upsert");
        let response = self
            .http
            .post(self.table_url(table))
            .headers(self.headers().await)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .query(&[("on_conflict", on_conflict)])
            .json(&row)
            .send()
            .await?;
        Self::read_rows(response).await
    }
}
