//! Top-level coordinator: wires the store, API and side channels into the
//! controllers and picks which one is live.

use std::sync::Arc;

use crate::api::{ApiError, CareApi, HttpCareApi};
use crate::auth::{AuthFlow, OAuthCallback};
use crate::config::{ClientConfig, OAUTH_CALLBACK_PATH};
use crate::dashboard::{DoctorDashboard, PatientDashboard};
use crate::notify::{Navigator, Notifier, TracingNotifier};
use crate::router::{route, View};
use crate::session::{DurableSessionStore, Session, SessionError, SessionStore};

const LOGOUT_MESSAGE: &str = "Logged out successfully";

/// The controller for the current view, ready to use.
pub enum Mounted<A> {
    Auth(AuthFlow<A>),
    Patient(PatientDashboard<A>),
    Doctor(DoctorDashboard<A>),
}

impl<A> Mounted<A> {
    pub fn view(&self) -> View {
        match self {
            Mounted::Auth(_) => View::Auth,
            Mounted::Patient(_) => View::PatientDashboard,
            Mounted::Doctor(_) => View::DoctorDashboard,
        }
    }
}

pub struct CareApp<A> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    config: ClientConfig,
}

impl CareApp<HttpCareApi> {
    /// Production wiring: HTTP backend, on-disk session, log notifications.
    pub fn connect(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let api = Arc::new(HttpCareApi::new(&config)?);
        let store = Arc::new(DurableSessionStore::new(config.storage_dir()));
        tracing::info!(
            backend = config.backend_url(),
            session_file = %store.path().display(),
            "Client configured"
        );
        Ok(Self::new(api, store, Arc::new(TracingNotifier), navigator, config))
    }
}

impl<A: CareApi> CareApp<A> {
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
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.store.read()
    }

    /// Route on whatever the store holds right now.
    pub fn current_view(&self) -> View {
        route(self.store.read().as_ref())
    }

    /// Handle a landing on `path`. The callback path completes the external
    /// login first; every path then routes on the stored session.
    pub async fn enter(&self, path: &str) -> View {
        if route_path(path) == OAUTH_CALLBACK_PATH {
            let outcome = self.oauth_callback().run().await;
            tracing::debug!(?outcome, "Callback handled");
        }
        self.current_view()
    }

    /// Build the controller for the current view. Dashboards start their
    /// initial fetches before returning.
    pub async fn mount(&self) -> Mounted<A> {
        match self.current_view() {
            View::Auth => Mounted::Auth(self.auth_flow()),
            View::PatientDashboard => {
                let dash = self.patient_dashboard();
                dash.mount().await;
                Mounted::Patient(dash)
            }
            View::DoctorDashboard => {
                let dash = self.doctor_dashboard();
                dash.mount().await;
                Mounted::Doctor(dash)
            }
        }
    }

    /// Clear both halves of the session together.
    pub fn logout(&self) -> Result<(), SessionError> {
        let user_id = self.store.read().map(|s| s.identity().id.clone());
        self.store.clear()?;
        tracing::info!(user_id = ?user_id, "Logged out");
        self.notifier.success(LOGOUT_MESSAGE);
        Ok(())
    }

    pub fn auth_flow(&self) -> AuthFlow<A> {
        AuthFlow::new(
            self.api.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.navigator.clone(),
            self.config.clone(),
        )
    }

    pub fn oauth_callback(&self) -> OAuthCallback<A> {
        OAuthCallback::new(
            self.api.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.navigator.clone(),
        )
    }

    pub fn patient_dashboard(&self) -> PatientDashboard<A> {
        PatientDashboard::new(self.api.clone(), self.store.clone(), self.notifier.clone())
    }

    pub fn doctor_dashboard(&self) -> DoctorDashboard<A> {
        DoctorDashboard::new(self.api.clone(), self.store.clone(), self.notifier.clone())
    }
}

/// Route part of a landing URL: query and fragment cut, one trailing `/`
/// trimmed. The root stays `/`.
fn route_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
