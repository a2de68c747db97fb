//! Sign-up, sign-in and sign-out flows on top of the auth provider.

use log::{info, warn};
use uuid::Uuid;

use crate::broadcast::ActiveChild;
use crate::error::{DashboardError, RemoteError, ValidationError};
use crate::remote::{AuthProvider, AuthUser, Session, SignUpProfile, TableStore};
use crate::{tables, Parent};

/// How a sign-up ended
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpResult {
    /// The account is usable right away
    SignedIn(Session),
    /// The provider wants the email confirmed before the first sign-in
    ConfirmationRequired,
}

fn required(value: &str, error: ValidationError) -> Result<&str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(error)
    } else {
        Ok(value)
    }
}

/// Text shown inline on the login form
fn auth_error(error: RemoteError) -> DashboardError {
    match error {
        RemoteError::Status { message, .. } if !message.trim().is_empty() => DashboardError::Auth(message),
        other => DashboardError::Auth(other.to_string()),
    }
}

/// `parents` row for `user`; `family_key` is only set on first creation
pub fn parent_row(user: &AuthUser, fallback_email: &str, family_key: Option<String>) -> Parent {
    Parent {
        id: user.id.clone(),
        email: user.email.clone().unwrap_or_else(|| fallback_email.to_string()),
        name: user.full_name(),
        family_key,
    }
}

pub async fn sign_up(
    auth: &dyn AuthProvider,
    store: &dyn TableStore,
    name: &str,
    email: &str,
    password: &str,
) -> Result<SignUpResult, DashboardError> {
    let name = required(name, ValidationError::EmptyName)?;
    let email = required(email, ValidationError::EmptyEmail)?;
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword.into());
    }

    info!("Creating account for {}", email);
    let profile = SignUpProfile {
        full_name: name.to_string(),
    };
    let outcome = auth.sign_up(email, password, &profile).await.map_err(auth_error)?;

    let Some(session) = outcome.session else {
        info!("Account for {} awaits email confirmation", email);
        return Ok(SignUpResult::ConfirmationRequired);
    };

    let parent = parent_row(&session.user, email, Some(Uuid::new_v4().to_string()));
    if let Err(e) = store.upsert_as(tables::PARENTS, &parent, "id").await {
        // the auth-state listener creates the row on the next sign-in
        warn!("Could not store parent profile for {}: {}", session.user.id, e);
    }
    Ok(SignUpResult::SignedIn(session))
}

pub async fn sign_in(auth: &dyn AuthProvider, email: &str, password: &str) -> Result<Session, DashboardError> {
    let email = required(email, ValidationError::EmptyEmail)?;
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword.into());
    }

    info!("Signing in {}", email);
    let session = auth.sign_in(email, password).await.map_err(|e| {
        warn!("Sign-in for {} failed: {}", email, e);
        auth_error(e)
    })?;
    info!("Signed in as {}", session.user.id);
    Ok(session)
}

/// Forget the selected child, then end the session
pub async fn sign_out(auth: &dyn AuthProvider, active: &ActiveChild) -> Result<(), DashboardError> {
    active.clear();
    auth.sign_out().await.map_err(auth_error)?;
    info!("Signed out");
    Ok(())
}

/// Make sure the signed-in account has a `parents` row without touching its
/// family key
pub async fn ensure_parent_row(store: &dyn TableStore, user: &AuthUser) -> Result<(), DashboardError> {
    let parent = parent_row(user, "", None);
    store
        .upsert_as(tables::PARENTS, &parent, "id")
        .await
        .map_err(DashboardError::write("parent profile"))
}
