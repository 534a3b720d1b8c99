//! OAuth Callback Handler: finishes the external-provider login on return.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::CareApi;
use crate::config::ROOT_PATH;
use crate::models::Identity;
use crate::notify::{Navigator, Notifier};
use crate::session::{CredentialToken, SessionStore};

const CALLBACK_FAILURE: &str = "Google authentication failed";

/// Result of a callback run.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    SignedIn(Identity),
    Failed,
    /// This handler already ran; nothing was done.
    AlreadyHandled,
}

/// One instance per landing on the callback path. `run` acts at most once no
/// matter how many times it is invoked.
pub struct OAuthCallback<A> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    started: AtomicBool,
}

impl<A: CareApi> OAuthCallback<A> {
    pub fn new(
        api: Arc<A>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            navigator,
            started: AtomicBool::new(false),
        }
    }

    /// Exchange the provider session for a stored pair, then go to root.
    /// Failure also goes to root; there is no retry.
    pub async fn run(&self) -> CallbackOutcome {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("OAuth callback already handled");
            return CallbackOutcome::AlreadyHandled;
        }

        let outcome = match self.api.oauth_session().await {
            Ok(resp) => {
                let identity = resp.user;
                match self
                    .store
                    .set(identity.clone(), CredentialToken::new(resp.access_token))
                {
                    Ok(()) => {
                        tracing::info!(user_id = %identity.id, "External login completed");
                        self.notifier
                            .success(&format!("Welcome {}!", identity.full_name));
                        CallbackOutcome::SignedIn(identity)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to store session after external login");
                        self.notifier.error(CALLBACK_FAILURE);
                        CallbackOutcome::Failed
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "External login session exchange failed");
                self.notifier.error(CALLBACK_FAILURE);
                CallbackOutcome::Failed
            }
        };

        self.navigator.navigate(ROOT_PATH);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockCall, MockCareApi};
    use crate::models::identity::test_identity;
    use crate::models::Role;
    use crate::notify::{NavigationTarget, RecordingNavigator, RecordingNotifier};
    use crate::session::MemorySessionStore;

    fn handler(
        api: &Arc<MockCareApi>,
    ) -> (
        OAuthCallback<MockCareApi>,
        Arc<MemorySessionStore>,
        Arc<RecordingNotifier>,
        Arc<RecordingNavigator>,
    ) {
        let store = Arc::new(MemorySessionStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let cb = OAuthCallback::new(
            api.clone(),
            store.clone(),
            notifier.clone(),
            navigator.clone(),
        );
        (cb, store, notifier, navigator)
    }

    #[tokio::test]
    async fn success_stores_pair_and_goes_home() {
        let api = Arc::new(MockCareApi::new());
        api.set_oauth(MockCareApi::auth_ok(test_identity(Role::Patient), "g-tok"));
        let (cb, store, notifier, nav) = handler(&api);

        let outcome = cb.run().await;

        assert!(matches!(outcome, CallbackOutcome::SignedIn(_)));
        assert_eq!(store.read().unwrap().token().expose(), "g-tok");
        assert_eq!(notifier.messages(), ["Welcome Jane Doe!"]);
        assert_eq!(nav.history(), [NavigationTarget::Path("/".into())]);
    }

    #[tokio::test]
    async fn failure_notifies_and_still_goes_home() {
        let api = Arc::new(MockCareApi::new());
        api.set_oauth(Err(ApiError::from_status(401, r#"{"detail":"Not authenticated"}"#)));
        let (cb, store, notifier, nav) = handler(&api);

        assert_eq!(cb.run().await, CallbackOutcome::Failed);
        assert!(store.read().is_none());
        assert_eq!(notifier.messages(), ["Google authentication failed"]);
        assert_eq!(nav.history(), [NavigationTarget::Path("/".into())]);
    }

    #[tokio::test]
    async fn runs_exactly_once() {
        let api = Arc::new(MockCareApi::new());
        api.set_oauth(Err(ApiError::Transport("down".into())));
        let (cb, _store, notifier, nav) = handler(&api);

        cb.run().await;
        assert_eq!(cb.run().await, CallbackOutcome::AlreadyHandled);
        assert_eq!(cb.run().await, CallbackOutcome::AlreadyHandled);

        assert_eq!(api.count(&MockCall::OAuthSession), 1);
        assert_eq!(notifier.all().len(), 1);
        assert_eq!(nav.history().len(), 1);
    }
}
