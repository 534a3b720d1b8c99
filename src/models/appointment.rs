use serde::{Deserialize, Serialize};

/// A scheduled consultation. The server scopes the list by the caller's role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    /// As entered at booking time; not normalized by the server.
    pub scheduled_time: String,
    pub reason: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Order by scheduled time, latest first.
pub fn sort_latest_first(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| b.scheduled_time.cmp(&a.scheduled_time));
}
