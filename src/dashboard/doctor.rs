//! Doctor Dashboard Controller. Read-only over patient data.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{bearer, fetch_appointments};
use crate::api::{ApiError, CareApi};
use crate::models::vitals::{recent, sort_newest_first, DOCTOR_TIMELINE_LIMIT};
use crate::models::{Appointment, FaqEntry, Identity, RosterEntry, VitalReading};
use crate::notify::Notifier;
use crate::session::SessionStore;

const PATIENTS_FETCH_FAILURE: &str = "Failed to fetch patients";
const FAQS_FETCH_FAILURE: &str = "Failed to fetch FAQs";
const PATIENT_VITALS_FAILURE: &str = "Failed to fetch patient vitals";

/// Everything the doctor screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorView {
    pub patients: Vec<RosterEntry>,
    pub faqs: Vec<FaqEntry>,
    pub selected: Option<RosterEntry>,
    /// Vitals of `selected`, most recent first. Empty while loading.
    pub selected_vitals: Vec<VitalReading>,
    pub loading_vitals: bool,
}

impl DoctorView {
    pub fn timeline(&self) -> &[VitalReading] {
        recent(&self.selected_vitals, DOCTOR_TIMELINE_LIMIT)
    }
}

/// What happened to a patient-vitals response when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Applied,
    Failed,
    /// A newer selection was made while this fetch was in flight.
    Superseded,
}

/// Identifies one selection. A response is applied only if its ticket is
/// still the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectionTicket {
    patient_id: String,
    generation: u64,
}

#[derive(Default)]
struct DoctorState {
    view: DoctorView,
    generation: u64,
}

impl DoctorState {
    fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.generation == ticket.generation
            && self
                .view
                .selected
                .as_ref()
                .is_some_and(|p| p.id == ticket.patient_id)
    }
}

pub struct DoctorDashboard<A> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<DoctorState>,
}

impl<A: CareApi> DoctorDashboard<A> {
    pub fn new(api: Arc<A>, store: Arc<dyn SessionStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            state: Mutex::new(DoctorState::default()),
        }
    }

    pub fn snapshot(&self) -> DoctorView {
        self.lock().view.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store.read().map(|s| s.identity().clone())
    }

    /// Fetch roster and FAQ feed concurrently; failures are per collection.
    pub async fn mount(&self) {
        tokio::join!(self.refresh_patients(), self.refresh_faqs());
    }

    pub async fn refresh_patients(&self) {
        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.list_patients(&token).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(patients) => {
                tracing::debug!(count = patients.len(), "Roster loaded");
                self.lock().view.patients = patients;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Roster fetch failed");
                self.notifier.error(PATIENTS_FETCH_FAILURE);
            }
        }
    }

    pub async fn refresh_faqs(&self) {
        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.list_faqs(&token).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(faqs) => {
                tracing::debug!(count = faqs.len(), "FAQ feed loaded");
                self.lock().view.faqs = faqs;
            }
            Err(e) => {
                tracing::warn!(error = %e, "FAQ fetch failed");
                self.notifier.error(FAQS_FETCH_FAILURE);
            }
        }
    }

    /// Select `patient` now and load their vitals.
    ///
    /// The selection is visible before the request goes out. When the
    /// response arrives it is applied only if no other selection (including
    /// a re-selection of the same patient) happened in between; otherwise it
    /// is dropped silently.
    pub async fn select_patient(&self, patient: RosterEntry) -> SelectionOutcome {
        let ticket = {
            let mut state = self.lock();
            state.generation += 1;
            let ticket = SelectionTicket {
                patient_id: patient.id.clone(),
                generation: state.generation,
            };
            state.view.selected = Some(patient);
            state.view.selected_vitals.clear();
            state.view.loading_vitals = true;
            ticket
        };

        let result = match bearer(self.store.as_ref()) {
            Ok(token) => self.api.patient_vitals(&token, &ticket.patient_id).await,
            Err(e) => Err(e),
        };

        let mut state = self.lock();
        if !state.is_current(&ticket) {
            tracing::debug!(
                patient_id = %ticket.patient_id,
                generation = ticket.generation,
                live_generation = state.generation,
                "Discarding stale patient vitals"
            );
            return SelectionOutcome::Superseded;
        }

        state.view.loading_vitals = false;
        match result {
            Ok(mut readings) => {
                sort_newest_first(&mut readings);
                state.view.selected_vitals = readings;
                SelectionOutcome::Applied
            }
            Err(e) => {
                drop(state);
                tracing::warn!(patient_id = %ticket.patient_id, error = %e, "Patient vitals fetch failed");
                self.notifier.error(PATIENT_VITALS_FAILURE);
                SelectionOutcome::Failed
            }
        }
    }

    pub async fn load_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        fetch_appointments(self.api.as_ref(), self.store.as_ref(), self.notifier.as_ref()).await
    }

    fn lock(&self) -> MutexGuard<'_, DoctorState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}
