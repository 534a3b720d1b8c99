//! Scriptable in-memory [`CareApi`] for tests and offline embedding.
//!
//! Each endpoint returns whatever result is currently scripted for it.
//! `gate_patient_vitals` and `gate_chat` hold a response back until the test
//! releases it, which is how completion order is forced.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

use super::client::CareApi;
use super::error::ApiError;
use super::types::{AuthResponse, LoginRequest, RegistrationRequest};
use crate::models::{
    Appointment, ChatReply, ChatRequest, FaqEntry, Identity, RiskAssessment, RosterEntry,
    VitalReading, VitalSubmission,
};
use crate::session::CredentialToken;

type VitalsResult = Result<Vec<VitalReading>, ApiError>;

/// One recorded call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Register(RegistrationRequest),
    Login(LoginRequest),
    OAuthSession,
    ListVitals,
    SubmitVital(VitalSubmission),
    LatestRisk,
    Chat(String),
    ListPatients,
    PatientVitals(String),
    ListFaqs,
    ListAppointments,
}

pub struct MockCareApi {
    auth: Mutex<Result<AuthResponse, ApiError>>,
    oauth: Mutex<Result<AuthResponse, ApiError>>,
    vitals: Mutex<VitalsResult>,
    submit: Mutex<Result<VitalReading, ApiError>>,
    risk: Mutex<Result<Option<RiskAssessment>, ApiError>>,
    chat: Mutex<Result<ChatReply, ApiError>>,
    patients: Mutex<Result<Vec<RosterEntry>, ApiError>>,
    patient_vitals: Mutex<HashMap<String, VitalsResult>>,
    faqs: Mutex<Result<Vec<FaqEntry>, ApiError>>,
    appointments: Mutex<Result<Vec<Appointment>, ApiError>>,
    vitals_gates: Mutex<HashMap<String, oneshot::Receiver<VitalsResult>>>,
    chat_gate: Mutex<Option<oneshot::Receiver<Result<ChatReply, ApiError>>>>,
    calls: Mutex<Vec<MockCall>>,
    tokens: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unscripted() -> ApiError {
    ApiError::Status {
        status: 500,
        detail: Some("not scripted".into()),
    }
}

impl MockCareApi {
    /// Every list endpoint returns empty, auth endpoints fail until scripted.
    pub fn new() -> Self {
        Self {
            auth: Mutex::new(Err(unscripted())),
            oauth: Mutex::new(Err(unscripted())),
            vitals: Mutex::new(Ok(Vec::new())),
            submit: Mutex::new(Err(unscripted())),
            risk: Mutex::new(Ok(None)),
            chat: Mutex::new(Err(unscripted())),
            patients: Mutex::new(Ok(Vec::new())),
            patient_vitals: Mutex::new(HashMap::new()),
            faqs: Mutex::new(Ok(Vec::new())),
            appointments: Mutex::new(Ok(Vec::new())),
            vitals_gates: Mutex::new(HashMap::new()),
            chat_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a successful auth body for `identity`.
    pub fn auth_ok(identity: Identity, token: &str) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            access_token: token.to_string(),
            token_type: Some("bearer".into()),
            user: identity,
        })
    }

    // ── Scripting ────────────────────────────────────────

    /// Result for both `login` and `register`.
    pub fn set_auth(&self, result: Result<AuthResponse, ApiError>) {
        *lock(&self.auth) = result;
    }

    pub fn set_oauth(&self, result: Result<AuthResponse, ApiError>) {
        *lock(&self.oauth) = result;
    }

    pub fn set_vitals(&self, result: VitalsResult) {
        *lock(&self.vitals) = result;
    }

    pub fn set_submit(&self, result: Result<VitalReading, ApiError>) {
        *lock(&self.submit) = result;
    }

    pub fn set_risk(&self, result: Result<Option<RiskAssessment>, ApiError>) {
        *lock(&self.risk) = result;
    }

    pub fn set_chat(&self, result: Result<ChatReply, ApiError>) {
        *lock(&self.chat) = result;
    }

    pub fn set_patients(&self, result: Result<Vec<RosterEntry>, ApiError>) {
        *lock(&self.patients) = result;
    }

    pub fn set_patient_vitals(&self, patient_id: &str, result: VitalsResult) {
        lock(&self.patient_vitals).insert(patient_id.to_string(), result);
    }

    pub fn set_faqs(&self, result: Result<Vec<FaqEntry>, ApiError>) {
        *lock(&self.faqs) = result;
    }

    pub fn set_appointments(&self, result: Result<Vec<Appointment>, ApiError>) {
        *lock(&self.appointments) = result;
    }

    /// Hold the next `patient_vitals(patient_id)` until the sender fires.
    pub fn gate_patient_vitals(&self, patient_id: &str) -> oneshot::Sender<VitalsResult> {
        let (tx, rx) = oneshot::channel();
        lock(&self.vitals_gates).insert(patient_id.to_string(), rx);
        tx
    }

    /// Hold the next `chat` until the sender fires.
    pub fn gate_chat(&self) -> oneshot::Sender<Result<ChatReply, ApiError>> {
        let (tx, rx) = oneshot::channel();
        *lock(&self.chat_gate) = Some(rx);
        tx
    }

    // ── Inspection ───────────────────────────────────────

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, call: &MockCall) -> usize {
        lock(&self.calls).iter().filter(|c| *c == call).count()
    }

    /// Bearer tokens presented to protected endpoints, in order.
    pub fn tokens_seen(&self) -> Vec<String> {
        lock(&self.tokens).clone()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }

    fn record_authed(&self, call: MockCall, token: &CredentialToken) {
        lock(&self.tokens).push(token.expose().to_string());
        self.record(call);
    }
}

impl Default for MockCareApi {
    fn default() -> Self {
        Self::new()
    }
}

impl CareApi for MockCareApi {
    async fn register(&self, request: &RegistrationRequest) -> Result<AuthResponse, ApiError> {
        self.record(MockCall::Register(request.clone()));
        lock(&self.auth).clone()
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.record(MockCall::Login(request.clone()));
        lock(&self.auth).clone()
    }

    async fn oauth_session(&self) -> Result<AuthResponse, ApiError> {
        self.record(MockCall::OAuthSession);
        lock(&self.oauth).clone()
    }

    async fn list_vitals(&self, token: &CredentialToken) -> Result<Vec<VitalReading>, ApiError> {
        self.record_authed(MockCall::ListVitals, token);
        lock(&self.vitals).clone()
    }

    async fn submit_vital(
        &self,
        token: &CredentialToken,
        body: &VitalSubmission,
    ) -> Result<VitalReading, ApiError> {
        self.record_authed(MockCall::SubmitVital(body.clone()), token);
        lock(&self.submit).clone()
    }

    async fn latest_risk(
        &self,
        token: &CredentialToken,
    ) -> Result<Option<RiskAssessment>, ApiError> {
        self.record_authed(MockCall::LatestRisk, token);
        lock(&self.risk).clone()
    }

    async fn chat(
        &self,
        token: &CredentialToken,
        request: &ChatRequest,
    ) -> Result<ChatReply, ApiError> {
        self.record_authed(MockCall::Chat(request.message.clone()), token);
        let gate = lock(&self.chat_gate).take();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(unscripted())),
            None => lock(&self.chat).clone(),
        }
    }

    async fn list_patients(&self, token: &CredentialToken) -> Result<Vec<RosterEntry>, ApiError> {
        self.record_authed(MockCall::ListPatients, token);
        lock(&self.patients).clone()
    }

    async fn patient_vitals(
        &self,
        token: &CredentialToken,
        patient_id: &str,
    ) -> Result<Vec<VitalReading>, ApiError> {
        self.record_authed(MockCall::PatientVitals(patient_id.to_string()), token);
        let gate = lock(&self.vitals_gates).remove(patient_id);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(unscripted())),
            None => lock(&self.patient_vitals)
                .get(patient_id)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new())),
        }
    }

    async fn list_faqs(&self, token: &CredentialToken) -> Result<Vec<FaqEntry>, ApiError> {
        self.record_authed(MockCall::ListFaqs, token);
        lock(&self.faqs).clone()
    }

    async fn list_appointments(
        &self,
        token: &CredentialToken,
    ) -> Result<Vec<Appointment>, ApiError> {
        self.record_authed(MockCall::ListAppointments, token);
        lock(&self.appointments).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::test_identity;
    use crate::models::Role;

    #[tokio::test]
    async fn records_calls_and_tokens() {
        let api = MockCareApi::new();
        let token = CredentialToken::new("t-1");
        api.list_vitals(&token).await.unwrap();
        api.latest_risk(&token).await.unwrap();

        assert_eq!(api.calls(), [MockCall::ListVitals, MockCall::LatestRisk]);
        assert_eq!(api.tokens_seen(), ["t-1", "t-1"]);
    }

    #[tokio::test]
    async fn scripted_auth_is_returned_for_login() {
        let api = MockCareApi::new();
        api.set_auth(MockCareApi::auth_ok(test_identity(Role::Doctor), "tok"));
        let resp = api
            .login(&LoginRequest {
                email: "a".into(),
                password: "b".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.role, Role::Doctor);
    }

    #[tokio::test]
    async fn gated_vitals_wait_for_release() {
        let api = MockCareApi::new();
        let tx = api.gate_patient_vitals("p1");
        tx.send(Ok(Vec::new())).unwrap();
        let got = api.patient_vitals(&CredentialToken::new("t"), "p1").await;
        assert_eq!(got, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn dropped_gate_yields_error() {
        let api = MockCareApi::new();
        drop(api.gate_chat());
        let got = api
            .chat(
                &CredentialToken::new("t"),
                &ChatRequest {
                    message: "hi".into(),
                },
            )
            .await;
        assert!(got.is_err());
    }
}
