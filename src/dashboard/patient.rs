//! Patient Dashboard Controller.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{bearer, fetch_appointments};
use crate::api::{ApiError, CareApi};
use crate::models::vitals::{recent, sort_newest_first, PATIENT_RECENT_LIMIT};
use crate::models::{
    risk_color, Appointment, ChatRequest, ChatTurn, FormError, Identity, RiskAssessment,
    RiskColor, VitalField, VitalForm, VitalReading,
};
use crate::notify::Notifier;
use crate::session::SessionStore;

const VITALS_FETCH_FAILURE: &str = "Failed to fetch vitals";
const RISK_FETCH_FAILURE: &str = "Failed to fetch risk score";
const SUBMIT_SUCCESS: &str = "Vitals logged successfully";
const SUBMIT_FAILURE: &str = "Failed to log vitals";
const CHAT_FAILURE: &str = "Failed to get response";

/// Everything the patient screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientView {
    /// Most recent first.
    pub vitals: Vec<VitalReading>,
    pub risk: Option<RiskAssessment>,
    pub form: VitalForm,
    pub transcript: Vec<ChatTurn>,
    pub submitting: bool,
    /// Chat messages sent and not yet answered.
    pub pending_replies: usize,
    /// True while `pending_replies` is non-zero.
    pub awaiting_reply: bool,
}

impl PatientView {
    pub fn recent_vitals(&self) -> &[VitalReading] {
        recent(&self.vitals, PATIENT_RECENT_LIMIT)
    }

    pub fn risk_color(&self) -> RiskColor {
        risk_color(self.risk.as_ref().map(|r| r.risk_level))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("A vital submission is already in progress")]
    Busy,
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// First phase of a chat exchange: the user turn is already in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "complete_chat sends the message"]
pub struct PendingChat {
    message: String,
}

impl PendingChat {
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub struct PatientDashboard<A> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    view: Mutex<PatientView>,
}

impl<A: CareApi> PatientDashboard<A> {
    pub fn new(api: Arc<A>, store: Arc<dyn SessionStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            view: Mutex::new(PatientView::default()),
        }
    }

    pub fn snapshot(&self) -> PatientView {
        self.lock().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store.read().map(|s| s.identity().clone())
    }

    /// Fetch vitals and risk concurrently. Either may fail without
    /// affecting the other.
    pub async fn mount(&self) {
        tokio::join!(self.refresh_vitals(), self.refresh_risk());
    }

    pub async fn refresh_vitals(&self) {
        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.list_vitals(&token).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(mut readings) => {
                sort_newest_first(&mut readings);
                tracing::debug!(count = readings.len(), "Vitals loaded");
                self.lock().vitals = readings;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vitals fetch failed");
                self.notifier.error(VITALS_FETCH_FAILURE);
            }
        }
    }

    pub async fn refresh_risk(&self) {
        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.latest_risk(&token).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(risk) => {
                tracing::debug!(level = ?risk.as_ref().map(|r| r.risk_level), "Risk loaded");
                self.lock().risk = risk;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Risk fetch failed");
                self.notifier.error(RISK_FETCH_FAILURE);
            }
        }
    }

    // ── Vital form ───────────────────────────────────────

    pub fn edit_form(&self, field: VitalField, value: &str) {
        let mut view = self.lock();
        view.form = view.form.with(field, value);
    }

    /// Send the current form. Success resets the form and refetches vitals
    /// and risk; any failure leaves the form as typed.
    pub async fn submit_vital(&self) -> Result<VitalReading, SubmitError> {
        let submission = {
            let mut view = self.lock();
            if view.submitting {
                return Err(SubmitError::Busy);
            }
            let parsed = view.form.to_submission();
            match parsed {
                Ok(sub) => {
                    view.submitting = true;
                    sub
                }
                Err(e) => {
                    drop(view);
                    tracing::debug!(error = %e, "Vital form rejected locally");
                    self.notifier.error(&e.to_string());
                    return Err(e.into());
                }
            }
        };

        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.submit_vital(&token, &submission).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(created) => {
                {
                    let mut view = self.lock();
                    view.submitting = false;
                    view.form = VitalForm::empty();
                }
                tracing::info!(vital_id = %created.id, "Vital reading logged");
                self.notifier.success(SUBMIT_SUCCESS);
                self.mount().await;
                Ok(created)
            }
            Err(e) => {
                self.lock().submitting = false;
                tracing::warn!(error = %e, "Vital submission failed");
                self.notifier.error(SUBMIT_FAILURE);
                Err(e.into())
            }
        }
    }

    // ── Chat ─────────────────────────────────────────────

    /// Append the user turn now. `None` for blank text.
    pub fn begin_chat(&self, text: &str) -> Option<PendingChat> {
        if text.trim().is_empty() {
            return None;
        }
        let mut view = self.lock();
        view.transcript.push(ChatTurn::user(text));
        view.pending_replies += 1;
        view.awaiting_reply = true;
        Some(PendingChat {
            message: text.to_string(),
        })
    }

    /// Send a begun message. The user turn stays in the transcript whatever
    /// the outcome.
    pub async fn complete_chat(&self, pending: PendingChat) -> Result<ChatTurn, ApiError> {
        let request = ChatRequest {
            message: pending.message,
        };
        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.chat(&token, &request).await,
            Err(e) => Err(e),
        };

        let mut view = self.lock();
        view.pending_replies = view.pending_replies.saturating_sub(1);
        view.awaiting_reply = view.pending_replies > 0;
        match result {
            Ok(reply) => {
                let turn = ChatTurn::assistant(reply.response);
                view.transcript.push(turn.clone());
                Ok(turn)
            }
            Err(e) => {
                drop(view);
                tracing::warn!(error = %e, "Chat request failed");
                self.notifier.error(CHAT_FAILURE);
                Err(e)
            }
        }
    }

    /// `begin_chat` then `complete_chat`. `None` when the text was blank.
    pub async fn send_chat_message(&self, text: &str) -> Option<Result<ChatTurn, ApiError>> {
        let pending = self.begin_chat(text)?;
        Some(self.complete_chat(pending).await)
    }

    pub async fn load_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        fetch_appointments(self.api.as_ref(), self.store.as_ref(), self.notifier.as_ref()).await
    }

    fn lock(&self) -> MutexGuard<'_, PatientView> {
        self.view.lock().unwrap_or_else(|p| p.into_inner())
    }
}
