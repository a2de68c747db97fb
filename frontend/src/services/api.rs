use async_trait::async_trait;
use futures::future::{select, Either};
use gloo::net::http::{Request, RequestBuilder, Response};
use gloo::timers::future::TimeoutFuture;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use shared::broadcast::{Channel, Subscription};
use shared::config::DashboardConfig;
use shared::remote::{AuthEvent, AuthProvider, AuthUser, Filter, Query, Session, SignUpOutcome, SignUpProfile, TableStore};
use shared::RemoteError;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use super::storage;

struct ClientInner {
    base_url: String,
    anon_key: String,
    timeout_ms: u32,
    session: RefCell<Option<Session>>,
    auth_events: Channel<AuthEvent>,
}

/// Client for the hosted backend: GoTrue auth plus the PostgREST table API
#[derive(Clone)]
pub struct ApiClient {
    inner: Rc<ClientInner>,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Error text from a PostgREST or GoTrue error body
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Query-string pairs for an upsert keyed on `conflict_key`
pub fn upsert_params(conflict_key: &str) -> Vec<(String, String)> {
    vec![("on_conflict".to_string(), conflict_key.to_string())]
}

impl ApiClient {
    /// Create a client from validated configuration, restoring any stored
    /// session
    pub fn new(config: &DashboardConfig) -> Self {
        let session = storage::load_session();
        if let Some(session) = &session {
            info!("Restored session for {}", session.user.id);
        }
        Self {
            inner: Rc::new(ClientInner {
                base_url: config.supabase_url.clone(),
                anon_key: config.supabase_anon_key.clone(),
                timeout_ms: config.request_timeout_ms,
                session: RefCell::new(session),
                auth_events: Channel::new(),
            }),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.borrow().clone()
    }

    fn set_session(&self, session: Option<Session>) {
        match &session {
            Some(session) => storage::save_session(session),
            None => storage::clear_session(),
        }
        *self.inner.session.borrow_mut() = session;
    }

    fn bearer(&self) -> String {
        let token = self
            .inner
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.inner.anon_key.clone());
        format!("Bearer {}", token)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.inner.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.inner.base_url, path)
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
    }

    /// Run a request, giving up after the configured timeout
    async fn send<F>(&self, request: F) -> Result<Response, RemoteError>
    where
        F: Future<Output = Result<Response, gloo::net::Error>>,
    {
        let timeout_ms = self.inner.timeout_ms;
        let request = Box::pin(request);
        let timer = Box::pin(TimeoutFuture::new(timeout_ms));
        let response = match select(request, timer).await {
            Either::Left((result, _)) => result.map_err(|e| RemoteError::Network(e.to_string()))?,
            Either::Right(_) => {
                warn!("Request timed out after {} ms", timeout_ms);
                return Err(RemoteError::Timeout(timeout_ms));
            }
        };
        if response.ok() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == 401 {
            warn!("Request rejected as unauthenticated: {}", error_message(&body));
            return Err(RemoteError::Unauthenticated);
        }
        Err(RemoteError::Status {
            status,
            message: error_message(&body),
        })
    }

    async fn send_json<T: Serialize>(&self, builder: RequestBuilder, body: &T) -> Result<Response, RemoteError> {
        let request = self
            .with_headers(builder)
            .json(body)
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.send(request.send()).await
    }

    async fn json_body(response: Response) -> Result<Value, RemoteError> {
        response.json::<Value>().await.map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn start_session(&self, session: Session) -> Session {
        info!("Session started for {}", session.user.id);
        self.set_session(Some(session.clone()));
        self.inner.auth_events.notify(&AuthEvent::SignedIn(session.user.clone()));
        session
    }

    fn end_session(&self) {
        self.set_session(None);
        self.inner.auth_events.notify(&AuthEvent::SignedOut);
    }
}

#[async_trait(?Send)]
impl TableStore for ApiClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        debug!("GET {} {:?}", table, query);
        let params = query.to_params();
        let builder = Request::get(&self.rest_url(table)).query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let response = self.send(self.with_headers(builder).send()).await?;
        match Self::json_body(response).await? {
            Value::Array(rows) => Ok(rows),
            other => Err(RemoteError::Decode(format!("expected a list of rows, got {}", other))),
        }
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), RemoteError> {
        debug!("POST {}", table);
        let builder = Request::post(&self.rest_url(table)).header("Prefer", "return=minimal");
        self.send_json(builder, &row).await.map(|_| ())
    }

    async fn upsert(&self, table: &str, row: Value, conflict_key: &str) -> Result<(), RemoteError> {
        debug!("UPSERT {} on {}", table, conflict_key);
        let params = upsert_params(conflict_key);
        let builder = Request::post(&self.rest_url(table))
            .query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .header("Prefer", "resolution=merge-duplicates,return=minimal");
        self.send_json(builder, &row).await.map(|_| ())
    }

    async fn update(&self, table: &str, patch: Value, filters: &[Filter]) -> Result<(), RemoteError> {
        debug!("PATCH {} {:?}", table, filters);
        let params: Vec<(String, String)> = filters.iter().map(Filter::to_param).collect();
        let builder = Request::patch(&self.rest_url(table))
            .query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .header("Prefer", "return=minimal");
        self.send_json(builder, &patch).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl AuthProvider for ApiClient {
    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<SignUpOutcome, RemoteError> {
        let body = json!({ "email": email, "password": password, "data": profile });
        let response = self.send_json(Request::post(&self.auth_url("signup")), &body).await?;
        let value = Self::json_body(response).await?;

        // with email confirmation on, the body is the bare user
        if value.get("access_token").is_some() {
            let session: Session = serde_json::from_value(value)?;
            let user = session.user.clone();
            Ok(SignUpOutcome {
                user: Some(user),
                session: Some(self.start_session(session)),
            })
        } else {
            let user = serde_json::from_value::<AuthUser>(value).ok();
            Ok(SignUpOutcome { user, session: None })
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let body = json!({ "email": email, "password": password });
        let builder = Request::post(&self.auth_url("token")).query([("grant_type", "password")]);
        let response = self.send_json(builder, &body).await?;
        let session: Session = serde_json::from_value(Self::json_body(response).await?)?;
        Ok(self.start_session(session))
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let result = if self.inner.session.borrow().is_some() {
            let builder = self.with_headers(Request::post(&self.auth_url("logout")));
            self.send(builder.send()).await.map(|_| ())
        } else {
            Ok(())
        };
        // the local session goes away even if the server call failed
        self.end_session();
        result
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, RemoteError> {
        if self.inner.session.borrow().is_none() {
            return Ok(None);
        }
        let builder = self.with_headers(Request::get(&self.auth_url("user")));
        match self.send(builder.send()).await {
            Ok(response) => {
                let user: AuthUser = serde_json::from_value(Self::json_body(response).await?)?;
                Ok(Some(user))
            }
            Err(RemoteError::Unauthenticated) => {
                info!("Stored session has expired");
                self.end_session();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn on_auth_state_change(&self, handler: Box<dyn Fn(&AuthEvent)>) -> Subscription {
        self.inner.auth_events.subscribe(handler)
    }
}
