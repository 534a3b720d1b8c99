//! The backend contract consumed by the controllers.

use std::future::Future;

use super::error::ApiError;
use super::types::{AuthResponse, LoginRequest, RegistrationRequest};
use crate::models::{
    Appointment, ChatReply, ChatRequest, FaqEntry, RiskAssessment, RosterEntry, VitalReading,
    VitalSubmission,
};
use crate::session::CredentialToken;

/// Every backend operation the client performs.
///
/// Protected calls take the bearer token explicitly; implementations attach
/// it as an `Authorization` header. No implementation retries.
pub trait CareApi: Send + Sync {
    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// Exchange the server-side session left by the provider redirect for a
    /// client-held credential. No body, no bearer token.
    fn oauth_session(&self) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn list_vitals(
        &self,
        token: &CredentialToken,
    ) -> impl Future<Output = Result<Vec<VitalReading>, ApiError>> + Send;

    fn submit_vital(
        &self,
        token: &CredentialToken,
        body: &VitalSubmission,
    ) -> impl Future<Output = Result<VitalReading, ApiError>> + Send;

    /// `Ok(None)` when the patient has no assessment yet.
    fn latest_risk(
        &self,
        token: &CredentialToken,
    ) -> impl Future<Output = Result<Option<RiskAssessment>, ApiError>> + Send;

    fn chat(
        &self,
        token: &CredentialToken,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, ApiError>> + Send;

    fn list_patients(
        &self,
        token: &CredentialToken,
    ) -> impl Future<Output = Result<Vec<RosterEntry>, ApiError>> + Send;

    fn patient_vitals(
        &self,
        token: &CredentialToken,
        patient_id: &str,
    ) -> impl Future<Output = Result<Vec<VitalReading>, ApiError>> + Send;

    fn list_faqs(
        &self,
        token: &CredentialToken,
    ) -> impl Future<Output = Result<Vec<FaqEntry>, ApiError>> + Send;

    fn list_appointments(
        &self,
        token: &CredentialToken,
    ) -> impl Future<Output = Result<Vec<Appointment>, ApiError>> + Send;
}
