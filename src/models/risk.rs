use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-derived risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Badge text, e.g. "HIGH".
    pub fn badge(self) -> String {
        self.as_str().to_uppercase()
    }
}

/// Display colour for a risk badge. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskColor {
    Alert,
    Warning,
    Normal,
}

impl RiskColor {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Alert => "#ef4444",
            Self::Warning => "#f59e0b",
            Self::Normal => "#10b981",
        }
    }
}

/// high → alert, medium → warning, low or absent → normal.
pub fn risk_color(level: Option<RiskLevel>) -> RiskColor {
    match level {
        Some(RiskLevel::High) => RiskColor::Alert,
        Some(RiskLevel::Medium) => RiskColor::Warning,
        Some(RiskLevel::Low) | None => RiskColor::Normal,
    }
}

/// Latest risk assessment for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RiskAssessment {
    pub fn color(&self) -> RiskColor {
        risk_color(Some(self.risk_level))
    }
}
