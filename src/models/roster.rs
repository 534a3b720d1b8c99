use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::risk::{risk_color, RiskAssessment, RiskColor};

/// A doctor's view of one patient plus that patient's latest risk, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub age: Option<i64>,
    /// Absent for patients with no readings yet. Not an error.
    #[serde(default)]
    pub latest_risk: Option<RiskAssessment>,
}

impl RosterEntry {
    pub fn badge_color(&self) -> RiskColor {
        risk_color(self.latest_risk.as_ref().map(|r| r.risk_level))
    }

    pub fn badge_text(&self) -> Option<String> {
        self.latest_risk.as_ref().map(|r| r.risk_level.badge())
    }
}

/// An aggregated patient question shown in the doctor's FAQ feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: String,
    pub patient_name: String,
    pub category: String,
    pub question: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn test_patient(id: &str, name: &str) -> RosterEntry {
    RosterEntry {
        id: id.into(),
        email: format!("{id}@example.org"),
        full_name: name.into(),
        age: None,
        latest_risk: None,
    }
}
