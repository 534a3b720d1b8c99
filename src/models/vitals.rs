use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Readings shown in the patient's "Recent Vitals" card.
pub const PATIENT_RECENT_LIMIT: usize = 5;

/// Readings shown in the clinician's per-patient timeline.
pub const DOCTOR_TIMELINE_LIMIT: usize = 7;

/// A stored vital reading. Every measurement is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub heart_rate: Option<i64>,
    #[serde(default)]
    pub blood_pressure_systolic: Option<i64>,
    #[serde(default)]
    pub blood_pressure_diastolic: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub oxygen_saturation: Option<i64>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub activity_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl VitalReading {
    /// "sys/dia" when a systolic value exists. Missing diastolic renders as "-".
    pub fn blood_pressure_label(&self) -> Option<String> {
        let systolic = self.blood_pressure_systolic?;
        let diastolic = self
            .blood_pressure_diastolic
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        Some(format!("{systolic}/{diastolic}"))
    }
}

/// Order readings most-recent-first. Stable for equal timestamps.
pub fn sort_newest_first(readings: &mut [VitalReading]) {
    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// The first `limit` readings of an already ordered history.
pub fn recent(readings: &[VitalReading], limit: usize) -> &[VitalReading] {
    &readings[..readings.len().min(limit)]
}

// ═══════════════════════════════════════════
// Form state
// ═══════════════════════════════════════════

/// One input of the vital-logging form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VitalField {
    HeartRate,
    Systolic,
    Diastolic,
    Temperature,
    OxygenSaturation,
    SleepHours,
    ActivityMinutes,
    Notes,
}

impl VitalField {
    pub const ALL: [VitalField; 8] = [
        Self::HeartRate,
        Self::Systolic,
        Self::Diastolic,
        Self::Temperature,
        Self::OxygenSaturation,
        Self::SleepHours,
        Self::ActivityMinutes,
        Self::Notes,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Systolic => "blood_pressure_systolic",
            Self::Diastolic => "blood_pressure_diastolic",
            Self::Temperature => "temperature",
            Self::OxygenSaturation => "oxygen_saturation",
            Self::SleepHours => "sleep_hours",
            Self::ActivityMinutes => "activity_minutes",
            Self::Notes => "notes",
        }
    }
}

/// Raw text of the vital form, exactly as typed.
///
/// Immutable: every edit produces a new value via [`VitalForm::with`].
/// An empty (or whitespace-only) input means "not measured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalForm {
    heart_rate: String,
    systolic: String,
    diastolic: String,
    temperature: String,
    oxygen_saturation: String,
    sleep_hours: String,
    activity_minutes: String,
    notes: String,
}

impl VitalForm {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A copy of this form with one field replaced.
    pub fn with(&self, field: VitalField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.slot_mut(field) = value.into();
        next
    }

    pub fn get(&self, field: VitalField) -> &str {
        match field {
            VitalField::HeartRate => &self.heart_rate,
            VitalField::Systolic => &self.systolic,
            VitalField::Diastolic => &self.diastolic,
            VitalField::Temperature => &self.temperature,
            VitalField::OxygenSaturation => &self.oxygen_saturation,
            VitalField::SleepHours => &self.sleep_hours,
            VitalField::ActivityMinutes => &self.activity_minutes,
            VitalField::Notes => &self.notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        VitalField::ALL.iter().all(|f| self.get(*f).trim().is_empty())
    }

    fn slot_mut(&mut self, field: VitalField) -> &mut String {
        match field {
            VitalField::HeartRate => &mut self.heart_rate,
            VitalField::Systolic => &mut self.systolic,
            VitalField::Diastolic => &mut self.diastolic,
            VitalField::Temperature => &mut self.temperature,
            VitalField::OxygenSaturation => &mut self.oxygen_saturation,
            VitalField::SleepHours => &mut self.sleep_hours,
            VitalField::ActivityMinutes => &mut self.activity_minutes,
            VitalField::Notes => &mut self.notes,
        }
    }

    /// Build the request body. Empty inputs become absent fields, never zero.
    pub fn to_submission(&self) -> Result<VitalSubmission, FormError> {
        Ok(VitalSubmission {
            heart_rate: parse_int(VitalField::HeartRate, &self.heart_rate)?,
            blood_pressure_systolic: parse_int(VitalField::Systolic, &self.systolic)?,
            blood_pressure_diastolic: parse_int(VitalField::Diastolic, &self.diastolic)?,
            temperature: parse_decimal(VitalField::Temperature, &self.temperature)?,
            oxygen_saturation: parse_int(VitalField::OxygenSaturation, &self.oxygen_saturation)?,
            sleep_hours: parse_decimal(VitalField::SleepHours, &self.sleep_hours)?,
            activity_minutes: parse_int(VitalField::ActivityMinutes, &self.activity_minutes)?,
            notes: Some(self.notes.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }
}

fn parse_int(field: VitalField, raw: &str) -> Result<Option<i64>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FormError::NotANumber {
            field: field.as_str(),
            value: raw.to_string(),
        })
}

fn parse_decimal(field: VitalField, raw: &str) -> Result<Option<f64>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(FormError::NotANumber {
            field: field.as_str(),
            value: raw.to_string(),
        }),
    }
}

/// JSON body for `POST /vitals`. Absent measurements are omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Local form validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
}

#[cfg(test)]
pub(crate) fn test_reading(id: &str, rfc3339: &str) -> VitalReading {
    VitalReading {
        id: id.into(),
        user_id: None,
        heart_rate: Some(72),
        blood_pressure_systolic: None,
        blood_pressure_diastolic: None,
        temperature: None,
        oxygen_saturation: None,
        sleep_hours: None,
        activity_minutes: None,
        notes: None,
        timestamp: DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc),
    }
}
