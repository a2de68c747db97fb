use log::{info, warn};
use shared::auth;
use shared::remote::{AuthEvent, AuthProvider, AuthUser};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::Services;

#[derive(Clone, PartialEq)]
pub enum SessionState {
    /// A stored session is being verified
    Checking,
    SignedOut,
    SignedIn(AuthUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Current auth state, following sign-in and sign-out events
#[hook]
pub fn use_session(services: &Services) -> SessionState {
    let state = use_state(|| {
        if services.api.session().is_some() {
            SessionState::Checking
        } else {
            SessionState::SignedOut
        }
    });

    {
        let state = state.clone();
        let services = services.clone();
        use_effect_with((), move |_| {
            let subscription = {
                let state = state.clone();
                let services = services.clone();
                services.api.clone().on_auth_state_change(Box::new(move |event: &AuthEvent| match event {
                    AuthEvent::SignedIn(user) => {
                        state.set(SessionState::SignedIn(user.clone()));
                        let services = services.clone();
                        let user = user.clone();
                        spawn_local(async move {
                            if let Err(e) = auth::ensure_parent_row(&services.api, &user).await {
                                warn!("Could not ensure parent profile for {}: {}", user.id, e);
                            }
                        });
                    }
                    AuthEvent::SignedOut => state.set(SessionState::SignedOut),
                }))
            };

            if services.api.session().is_some() {
                spawn_local(async move {
                    match services.api.current_user().await {
                        Ok(Some(user)) => {
                            info!("Resumed session for {}", user.id);
                            state.set(SessionState::SignedIn(user));
                        }
                        Ok(None) => state.set(SessionState::SignedOut),
                        Err(e) => {
                            // keep working from the stored session while offline
                            warn!("Could not verify stored session: {}", e);
                            match services.api.session() {
                                Some(session) => state.set(SessionState::SignedIn(session.user)),
                                None => state.set(SessionState::SignedOut),
                            }
                        }
                    }
                });
            }

            move || drop(subscription)
        });
    }

    (*state).clone()
}
