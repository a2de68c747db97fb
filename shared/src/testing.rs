//! In-memory stand-ins for the hosted services, for tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::broadcast::{Channel, Subscription};
use crate::error::RemoteError;
use crate::lenient::RecordTime;
use crate::remote::{AuthEvent, AuthProvider, AuthUser, Filter, Query, Session, SignUpOutcome, SignUpProfile, TableStore};

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert(String, Value),
    Upsert(String, Value, String),
    Update(String, Value),
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<String, Vec<Value>>>,
    failures: RefCell<HashMap<String, RemoteError>>,
    ignore_order: Cell<bool>,
    next_id: Cell<u64>,
    writes: RefCell<Vec<Write>>,
    selects: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1000),
            ..Self::default()
        }
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables.borrow_mut().entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    /// Every call touching `table` fails with `error`
    pub fn fail_table(&self, table: &str, error: RemoteError) {
        self.failures.borrow_mut().insert(table.to_string(), error);
    }

    /// Return rows in insertion order even when a query asks for an order
    pub fn disable_ordering(&self) {
        self.ignore_order.set(true);
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.borrow().clone()
    }

    pub fn select_count(&self) -> usize {
        self.selects.get()
    }

    fn check(&self, table: &str) -> Result<(), RemoteError> {
        match self.failures.borrow().get(table) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn assign_id(&self, row: &mut Value) {
        if let Value::Object(map) = row {
            if !map.contains_key("id") {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                map.insert("id".to_string(), Value::from(id));
            }
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (left.parse::<f64>(), right.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    if let (Some(RecordTime::Zoned(a)), Some(RecordTime::Zoned(b))) = (RecordTime::parse(left), RecordTime::parse(right)) {
        return a.cmp(&b);
    }
    left.cmp(right)
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let Some(actual) = row.get(filter.column()).and_then(as_text) else {
        return false;
    };
    match filter {
        Filter::Eq { value, .. } => actual == *value,
        Filter::Gte { value, .. } => compare_text(&actual, value) != Ordering::Less,
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait(?Send)]
impl TableStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        self.selects.set(self.selects.get() + 1);
        self.check(table)?;
        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect();
        if let (Some(order), false) = (&query.order, self.ignore_order.get()) {
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).and_then(as_text).unwrap_or_default();
                let b = b.get(&order.column).and_then(as_text).unwrap_or_default();
                let ord = compare_text(&a, &b);
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), RemoteError> {
        self.check(table)?;
        self.writes.borrow_mut().push(Write::Insert(table.to_string(), row.clone()));
        let mut row = row;
        self.assign_id(&mut row);
        self.tables.borrow_mut().entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn upsert(&self, table: &str, row: Value, conflict_key: &str) -> Result<(), RemoteError> {
        self.check(table)?;
        self.writes
            .borrow_mut()
            .push(Write::Upsert(table.to_string(), row.clone(), conflict_key.to_string()));
        let key = row.get(conflict_key).and_then(as_text);
        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(table.to_string()).or_default();
        match rows
            .iter_mut()
            .find(|existing| key.is_some() && existing.get(conflict_key).and_then(as_text) == key)
        {
            Some(existing) => merge(existing, &row),
            None => rows.push(row),
        }
        Ok(())
    }

    async fn update(&self, table: &str, patch: Value, filters: &[Filter]) -> Result<(), RemoteError> {
        self.check(table)?;
        self.writes.borrow_mut().push(Write::Update(table.to_string(), patch.clone()));
        let mut tables = self.tables.borrow_mut();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| filters.iter().all(|f| matches(row, f))) {
                merge(row, &patch);
            }
        }
        Ok(())
    }
}

/// Auth provider double with a single known account per email
#[derive(Default)]
pub struct FakeAuth {
    accounts: RefCell<Vec<(String, String, AuthUser)>>,
    current: RefCell<Option<AuthUser>>,
    events: Channel<AuthEvent>,
    pub require_confirmation: Cell<bool>,
    pub unreachable: Cell<bool>,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(email: &str, password: &str, id: &str) -> Self {
        let auth = Self::new();
        auth.accounts.borrow_mut().push((
            email.to_string(),
            password.to_string(),
            AuthUser {
                id: id.to_string(),
                email: Some(email.to_string()),
                user_metadata: Value::Object(Map::new()),
            },
        ));
        auth
    }

    fn reachable(&self) -> Result<(), RemoteError> {
        if self.unreachable.get() {
            Err(RemoteError::Network("auth service unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    fn start_session(&self, user: AuthUser) -> Session {
        *self.current.borrow_mut() = Some(user.clone());
        self.events.notify(&AuthEvent::SignedIn(user.clone()));
        Session {
            access_token: format!("token-{}", user.id),
            refresh_token: None,
            user,
        }
    }
}

#[async_trait(?Send)]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<SignUpOutcome, RemoteError> {
        self.reachable()?;
        if self.accounts.borrow().iter().any(|(e, _, _)| e == email) {
            return Err(RemoteError::Status {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let mut metadata = Map::new();
        metadata.insert("full_name".to_string(), Value::from(profile.full_name.clone()));
        let user = AuthUser {
            id: format!("user-{}", self.accounts.borrow().len() + 1),
            email: Some(email.to_string()),
            user_metadata: Value::Object(metadata),
        };
        self.accounts
            .borrow_mut()
            .push((email.to_string(), password.to_string(), user.clone()));

        if self.require_confirmation.get() {
            return Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            });
        }
        let session = self.start_session(user.clone());
        Ok(SignUpOutcome {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        self.reachable()?;
        let user = self
            .accounts
            .borrow()
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(_, _, user)| user.clone());
        match user {
            Some(user) => Ok(self.start_session(user)),
            None => Err(RemoteError::Status {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.reachable()?;
        *self.current.borrow_mut() = None;
        self.events.notify(&AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, RemoteError> {
        self.reachable()?;
        Ok(self.current.borrow().clone())
    }

    fn on_auth_state_change(&self, handler: Box<dyn Fn(&AuthEvent)>) -> Subscription {
        self.events.subscribe(handler)
    }
}
