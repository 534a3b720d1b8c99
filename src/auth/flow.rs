//! Auth Flow Controller: login, registration and the external-login side entry.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::form::{AuthForm, MissingField};
use crate::api::{ApiError, AuthResponse, CareApi};
use crate::config::{ClientConfig, ROOT_PATH};
use crate::models::Identity;
use crate::notify::{Navigator, Notifier};
use crate::session::{CredentialToken, SessionError, SessionStore};

const AUTH_FALLBACK: &str = "Authentication failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Idle,
    Submitting,
    /// Terminal: the session is stored and the shell has been sent to root.
    Authenticated,
}

/// Snapshot of the controller for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub mode: AuthMode,
    pub phase: AuthPhase,
    /// Last failure shown to the user; cleared on the next submit.
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("A submission is already in progress")]
    Busy,
    #[error(transparent)]
    Missing(#[from] MissingField),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct AuthFlow<A> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    config: ClientConfig,
    state: Mutex<AuthState>,
}

impl<A: CareApi> AuthFlow<A> {
    pub fn new(
        api: Arc<A>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        config: ClientConfig,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            navigator,
            config,
            state: Mutex::new(AuthState::default()),
        }
    }

    pub fn state(&self) -> AuthState {
        self.lock().clone()
    }

    /// Switch between login and registration. Ignored unless idle.
    pub fn toggle_mode(&self) -> AuthMode {
        let mut state = self.lock();
        if state.phase == AuthPhase::Idle {
            state.mode = match state.mode {
                AuthMode::Login => AuthMode::Register,
                AuthMode::Register => AuthMode::Login,
            };
            state.error = None;
        }
        state.mode
    }

    /// Submit `form` in the current mode.
    ///
    /// On success the pair is stored, a welcome is shown and the shell is sent
    /// to the application root. On failure nothing is stored and the
    /// controller returns to idle with the error recorded.
    pub async fn submit(&self, form: &AuthForm) -> Result<Identity, AuthError> {
        let mode = {
            let mut state = self.lock();
            if state.phase == AuthPhase::Submitting {
                return Err(AuthError::Busy);
            }
            state.phase = AuthPhase::Submitting;
            state.error = None;
            state.mode
        };

        let result = match mode {
            AuthMode::Login => match form.login_request() {
                Ok(req) => self.api.login(&req).await.map_err(AuthError::from),
                Err(missing) => Err(missing.into()),
            },
            AuthMode::Register => match form.registration_request() {
                Ok(req) => self.api.register(&req).await.map_err(AuthError::from),
                Err(missing) => Err(missing.into()),
            },
        };

        match result.and_then(|resp| self.establish(resp)) {
            Ok(identity) => {
                self.lock().phase = AuthPhase::Authenticated;
                tracing::info!(user_id = %identity.id, role = identity.role.as_str(), ?mode, "Signed in");
                self.notifier
                    .success(&format!("Welcome {}!", identity.full_name));
                self.navigator.navigate(ROOT_PATH);
                Ok(identity)
            }
            Err(err) => {
                let message = failure_message(&err);
                tracing::warn!(?mode, error = %err, "Sign-in failed");
                {
                    let mut state = self.lock();
                    state.phase = AuthPhase::Idle;
                    state.error = Some(message.clone());
                }
                self.notifier.error(&message);
                Err(err)
            }
        }
    }

    /// Full-page navigation to the provider-initiation URL. Nothing else
    /// happens here; the callback handler picks up on return.
    pub fn begin_external_login(&self) {
        self.navigator
            .redirect_external(&self.config.external_login_url());
    }

    fn establish(&self, resp: AuthResponse) -> Result<Identity, AuthError> {
        let identity = resp.user;
        self.store
            .set(identity.clone(), CredentialToken::new(resp.access_token))?;
        Ok(identity)
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn failure_message(err: &AuthError) -> String {
    match err {
        AuthError::Api(api) => api.user_message(AUTH_FALLBACK),
        AuthError::Missing(missing) => missing.to_string(),
        AuthError::Busy | AuthError::Session(_) => AUTH_FALLBACK.to_string(),
    }
}
