//! # Remote access traits
//!
//! The dashboard talks to two hosted services: an auth provider and a
//! tabular store with a PostgREST-style query language. These traits are the
//! only way the rest of the code reaches them, so every call site handles
//! failures the same way: a `Result` with a [`RemoteError`].
//!
//! Everything runs on the browser's single thread, hence `?Send`.

use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::broadcast::Subscription;
use crate::error::RemoteError;

/// Row filter understood by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    Gte { column: String, value: String },
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<String>) -> Self {
        Filter::Eq {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub fn gte(column: &str, value: impl Into<String>) -> Self {
        Filter::Gte {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::Gte { column, .. } => column,
        }
    }

    /// PostgREST parameter, e.g. `("child_id", "eq.42")`
    pub fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
            Filter::Gte { column, value } => (column.clone(), format!("gte.{}", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read against one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::gte(column, value));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string parameters in PostgREST syntax
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        params.push((
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        ));
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Generic access to the hosted tables
#[async_trait(?Send)]
pub trait TableStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError>;

    async fn insert(&self, table: &str, row: Value) -> Result<(), RemoteError>;

    /// Insert or merge on `conflict_key`
    async fn upsert(&self, table: &str, row: Value, conflict_key: &str) -> Result<(), RemoteError>;

    async fn update(&self, table: &str, patch: Value, filters: &[Filter]) -> Result<(), RemoteError>;
}

impl dyn TableStore + '_ {
    /// Select and decode rows.
    ///
    /// Rows that do not decode are skipped with a warning so one bad row
    /// cannot empty a whole page.
    pub async fn select_as<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>, RemoteError> {
        let rows = self.select(table, query).await?;
        let total = rows.len();
        let decoded: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<T>(row) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping malformed {} row: {}", table, e);
                    None
                }
            })
            .collect();
        if decoded.len() != total {
            warn!("Decoded {} of {} {} rows", decoded.len(), total, table);
        }
        Ok(decoded)
    }

    /// First decoded row, if any
    pub async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Option<T>, RemoteError> {
        let query = query.clone().limit(1);
        Ok(self.select_as(table, &query).await?.into_iter().next())
    }

    pub async fn upsert_as<T: Serialize>(&self, table: &str, row: &T, conflict_key: &str) -> Result<(), RemoteError> {
        let row = serde_json::to_value(row)?;
        self.upsert(table, row, conflict_key).await
    }

    pub async fn insert_as<T: Serialize>(&self, table: &str, row: &T) -> Result<(), RemoteError> {
        let row = serde_json::to_value(row)?;
        self.insert(table, row).await
    }
}

/// Account as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// Name stored in the account metadata at sign-up
    pub fn full_name(&self) -> Option<String> {
        self.user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Profile data attached to a new account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpProfile {
    pub full_name: String,
}

/// Result of a sign-up; `session` is absent while the email is unconfirmed
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
}

/// The hosted authentication service
#[async_trait(?Send)]
pub trait AuthProvider {
    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<SignUpOutcome, RemoteError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError>;

    async fn sign_out(&self) -> Result<(), RemoteError>;

    async fn current_user(&self) -> Result<Option<AuthUser>, RemoteError>;

    fn on_auth_state_change(&self, handler: Box<dyn Fn(&AuthEvent)>) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_query_params_for_children() {
        let query = Query::new()
            .columns("id,name")
            .eq("parent_id", "p-1")
            .order_by("name", true);
        assert_eq!(
            query.to_params(),
            params(&[("select", "id,name"), ("parent_id", "eq.p-1"), ("order", "name.asc")])
        );
    }

    #[test]
    fn test_query_params_with_gte_and_limit() {
        let query = Query::new()
            .eq("child_id", "42")
            .gte("timestamp", "2025-01-01T00:00:00+00:00")
            .order_by("created_at", false)
            .limit(1);
        assert_eq!(
            query.to_params(),
            params(&[
                ("select", "*"),
                ("child_id", "eq.42"),
                ("timestamp", "gte.2025-01-01T00:00:00+00:00"),
                ("order", "created_at.desc"),
                ("limit", "1"),
            ])
        );
    }

    #[test]
    fn test_auth_user_full_name() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.c",
            "user_metadata": {"full_name": "  Ann Lee "}
        }))
        .unwrap();
        assert_eq!(user.full_name().as_deref(), Some("Ann Lee"));

        let bare: AuthUser = serde_json::from_value(json!({"id": "u2"})).unwrap();
        assert_eq!(bare.full_name(), None);
        assert_eq!(bare.email, None);
    }
}
