//! Role dashboards.
//!
//! Both controllers hold their view state behind a short-lived
//! `std::sync::Mutex`. A lock is never held across an `.await`; each fetch
//! re-enters the state only when its own request completes, and only touches
//! its own collection.

pub mod doctor;
pub mod patient;

use crate::api::{ApiError, CareApi};
use crate::models::appointment::sort_latest_first;
use crate::models::Appointment;
use crate::notify::Notifier;
use crate::session::{CredentialToken, SessionStore};

pub use doctor::{DoctorDashboard, DoctorView, SelectionOutcome};
pub use patient::{PatientDashboard, PatientView, PendingChat, SubmitError};

const APPOINTMENTS_FAILURE: &str = "Failed to fetch appointments";

/// Token for the next protected request, read fresh from the store.
pub(crate) fn bearer(store: &dyn SessionStore) -> Result<CredentialToken, ApiError> {
    store
        .read()
        .map(|session| session.token().clone())
        .ok_or(ApiError::NotAuthenticated)
}

/// Shared by both dashboards: read-only, newest first, failure is a toast.
pub(crate) async fn fetch_appointments<A: CareApi>(
    api: &A,
    store: &dyn SessionStore,
    notifier: &dyn Notifier,
) -> Result<Vec<Appointment>, ApiError> {
    let result = match bearer(store) {
        Ok(token) => api.list_appointments(&token).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(mut list) => {
            sort_latest_first(&mut list);
            Ok(list)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Appointment fetch failed");
            notifier.error(APPOINTMENTS_FAILURE);
            Err(e)
        }
    }
}
