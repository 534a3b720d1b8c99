use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role carried by an authenticated identity.
///
/// Only `patient` and `doctor` are defined. Any other tag (a corrupted store,
/// a server change) is kept verbatim in `Unrecognized` so routing can refuse it
/// instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Patient,
    Doctor,
    Unrecognized(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Parse a role tag. Exact, case-sensitive match.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "patient" => Self::Patient,
            "doctor" => Self::Doctor,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// An authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// First word of the display name, used for the dashboard greeting.
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.full_name)
    }

    /// Header label for the clinician view: "Dr. {name}".
    pub fn doctor_title(&self) -> String {
        format!("Dr. {}", self.full_name)
    }

    /// Subtitle under the clinician name; falls back to "Doctor".
    pub fn specialization_label(&self) -> &str {
        self.specialization
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Doctor")
    }
}

#[cfg(test)]
pub(crate) fn test_identity(role: Role) -> Identity {
    Identity {
        id: "u-1".into(),
        email: "jane@example.org".into(),
        full_name: "Jane Doe".into(),
        role,
        age: None,
        specialization: None,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_parse_exactly() {
        assert_eq!(Role::from_tag("patient"), Role::Patient);
        assert_eq!(Role::from_tag("doctor"), Role::Doctor);
        assert_eq!(Role::from_tag("Doctor"), Role::Unrecognized("Doctor".into()));
        assert_eq!(Role::from_tag(""), Role::Unrecognized(String::new()));
    }

    #[test]
    fn unknown_role_survives_deserialization() {
        let json = r#"{"id":"1","email":"a@b.c","full_name":"A B","role":"admin"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, Role::Unrecognized("admin".into()));
        assert!(!identity.role.is_recognized());
    }

    #[test]
    fn role_serializes_as_plain_tag() {
        let json = serde_json::to_value(Role::Doctor).unwrap();
        assert_eq!(json, "doctor");
    }

    #[test]
    fn identity_roundtrips_through_storage_form() {
        let mut identity = test_identity(Role::Patient);
        identity.age = Some(61);
        let stored = serde_json::to_string(&identity).unwrap();
        let restored: Identity = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, identity);
    }

    #[test]
    fn server_user_with_python_timestamp_parses() {
        let json = r#"{
            "id": "9f1c", "email": "d@x.org", "full_name": "Gregory House",
            "role": "doctor", "age": null, "specialization": "Diagnostics",
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        }"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, Role::Doctor);
        assert!(identity.created_at.is_some());
    }

    #[test]
    fn greeting_and_titles() {
        let mut identity = test_identity(Role::Doctor);
        assert_eq!(identity.first_name(), "Jane");
        assert_eq!(identity.doctor_title(), "Dr. Jane Doe");
        assert_eq!(identity.specialization_label(), "Doctor");
        identity.specialization = Some("Cardiology".into());
        assert_eq!(identity.specialization_label(), "Cardiology");
    }
}
