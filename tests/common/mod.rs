// Shared test harness: in-process fakes for the two collaborator traits
// plus a store builder and a snapshot-wait helper.
//
// The fakes are scripted per table / per call so tests can stage delayed,
// failing or empty remote answers without a network.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use isls_portal_rust::auth::{AuthApi, AuthChange, AuthError, AuthEventKind, AuthUser, Session};
use isls_portal_rust::remote::{DataApi, Filter, RemoteError, SelectQuery};
use isls_portal_rust::session::{AuthSnapshot, SessionStore, StoreOptions};

pub const TEST_PASSWORD: &str = "letmein";

pub fn test_user(id: Uuid, email: &str) -> AuthUser {
    AuthUser { id, email: Some(email.to_string()), created_at: None, last_sign_in_at: None }
}

pub fn test_session(user_id: Uuid, email: &str) -> Session {
    Session {
        access_token: format!("token-{}", user_id),
        refresh_token: "refresh".to_string(),
        expires_at: Utc::now() + ChronoDuration::hours(1),
        user: test_user(user_id, email),
    }
}

pub fn profile_row(id: Uuid, role: &str, cohort: Option<&str>) -> Value {
    json!({ "id": id, "role": role, "full_name": "Test User", "cohort_code": cohort })
}

/// Auth double with a programmable held session and an event hook.
pub struct FakeAuth {
    session: Mutex<Option<Session>>,
    pub session_reads: Mutex<usize>,
    events: broadcast::Sender<AuthChange>,
}

impl FakeAuth {
    pub fn new(initial: Option<Session>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self { session: Mutex::new(initial), session_reads: Mutex::new(0), events })
    }

    /// Update the held session and broadcast the matching notification.
    pub fn emit(&self, kind: AuthEventKind, session: Option<Session>) {
        *self.session.lock().unwrap() = session.clone();
        let _ = self.events.send(AuthChange { kind, session });
    }

    pub fn session_reads(&self) -> usize {
        *self.session_reads.lock().unwrap()
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        *self.session_reads.lock().unwrap() += 1;
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if password != TEST_PASSWORD {
            return Err(AuthError::Rejected { status: 400, message: "Invalid login credentials".to_string() });
        }
        let session = test_session(Uuid::new_v4(), email);
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _redirect_to: Option<&str>,
    ) -> Result<Option<Session>, AuthError> {
        // Email confirmation pending: no session yet
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.emit(AuthEventKind::SignedOut, None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

type ScriptedRows = Result<Vec<Value>, String>;

/// Data double: scripted responses per table, consumed in call order.
/// Unscripted selects answer with an empty table; unscripted mutations echo
/// their payload back as the affected row.
#[derive(Default)]
pub struct FakeData {
    selects: Mutex<HashMap<String, VecDeque<(Option<Duration>, ScriptedRows)>>>,
    inserts: Mutex<HashMap<String, VecDeque<Vec<Value>>>>,
    updates: Mutex<HashMap<String, VecDeque<Vec<Value>>>>,
    counts: Mutex<HashMap<String, VecDeque<u64>>>,
    pub select_log: Mutex<Vec<SelectQuery>>,
    /// (operation, table, payload) for every mutation issued.
    pub mutation_log: Mutex<Vec<(String, String, Value)>>,
}

impl FakeData {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_select(&self, table: &str, rows: Vec<Value>) {
        self.script_select_delayed(table, None, Ok(rows));
    }

    pub fn script_select_error(&self, table: &str, message: &str) {
        self.script_select_delayed(table, None, Err(message.to_string()));
    }

    pub fn script_select_delayed(&self, table: &str, delay: Option<Duration>, rows: ScriptedRows) {
        self.selects.lock().unwrap().entry(table.to_string()).or_default().push_back((delay, rows));
    }

    pub fn script_insert(&self, table: &str, rows: Vec<Value>) {
        self.inserts.lock().unwrap().entry(table.to_string()).or_default().push_back(rows);
    }

    pub fn script_update(&self, table: &str, rows: Vec<Value>) {
        self.updates.lock().unwrap().entry(table.to_string()).or_default().push_back(rows);
    }

    pub fn script_count(&self, table: &str, count: u64) {
        self.counts.lock().unwrap().entry(table.to_string()).or_default().push_back(count);
    }

    pub fn selects_for(&self, table: &str) -> Vec<SelectQuery> {
        self.select_log.lock().unwrap().iter().filter(|q| q.table == table).cloned().collect()
    }

    pub fn mutations_for(&self, table: &str) -> Vec<(String, Value)> {
        self.mutation_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, t, _)| t == table)
            .map(|(op, _, payload)| (op.clone(), payload.clone()))
            .collect()
    }
}

#[async_trait]
impl DataApi for FakeData {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, RemoteError> {
        self.select_log.lock().unwrap().push(query.clone());
        let script = self.selects.lock().unwrap().get_mut(&query.table).and_then(|q| q.pop_front());
        let Some((delay, rows)) = script else { return Ok(Vec::new()) };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        rows.map_err(|message| RemoteError::Api { status: 500, message })
    }

    async fn count(&self, table: &str, _filters: Vec<Filter>) -> Result<u64, RemoteError> {
        Ok(self.counts.lock().unwrap().get_mut(table).and_then(|q| q.pop_front()).unwrap_or(0))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, RemoteError> {
        self.mutation_log.lock().unwrap().push(("insert".to_string(), table.to_string(), row.clone()));
        Ok(self.inserts.lock().unwrap().get_mut(table).and_then(|q| q.pop_front()).unwrap_or(vec![row]))
    }

    async fn update(&self, table: &str, filters: Vec<Filter>, patch: Value) -> Result<Vec<Value>, RemoteError> {
        let rendered: Vec<Value> = filters
            .iter()
            .map(|f| {
                let (column, condition) = f.as_param();
                json!({ "column": column, "condition": condition })
            })
            .collect();
        self.mutation_log.lock().unwrap().push((
            "update".to_string(),
            table.to_string(),
            json!({ "filters": rendered, "patch": patch.clone() }),
        ));
        Ok(self.updates.lock().unwrap().get_mut(table).and_then(|q| q.pop_front()).unwrap_or(vec![patch]))
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Vec<Value>, RemoteError> {
        self.mutation_log.lock().unwrap().push((
            format!("upsert({})", on_conflict),
            table.to_string(),
            row.clone(),
        ));
        Ok(vec![row])
    }
}

pub fn build_store(auth: Arc<FakeAuth>, data: Arc<FakeData>) -> SessionStore {
    SessionStore::new(auth, data, StoreOptions::default())
}

/// Wait until the published snapshot satisfies `pred`, or fail the test.
pub async fn wait_until(
    rx: &mut watch::Receiver<AuthSnapshot>,
    mut pred: impl FnMut(&AuthSnapshot) -> bool,
) -> AuthSnapshot {
    {
        let current = rx.borrow().clone();
        if pred(&current) {
            return current;
        }
    }
    loop {
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("timed out waiting for a store update")
            .expect("store state channel closed");
        let current = rx.borrow().clone();
        if pred(&current) {
            return current;
        }
    }
}
