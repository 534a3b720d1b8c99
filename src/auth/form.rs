//! Login / registration form value.

use crate::api::{LoginRequest, RegistrationRequest};
use crate::models::Role;

/// Which required input was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingField {
    #[error("Email is required")]
    Email,
    #[error("Password is required")]
    Password,
    #[error("Full name is required")]
    FullName,
}

/// Raw auth form input.
///
/// Immutable like the vital form: edits go through the `with_*` builders.
/// Fields that do not apply to the chosen role are kept but never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub age: String,
    pub specialization: String,
}

impl AuthForm {
    pub fn login(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    pub fn with_full_name(&self, name: &str) -> Self {
        Self {
            full_name: name.to_string(),
            ..self.clone()
        }
    }

    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }

    pub fn with_age(&self, age: &str) -> Self {
        Self {
            age: age.to_string(),
            ..self.clone()
        }
    }

    pub fn with_specialization(&self, specialization: &str) -> Self {
        Self {
            specialization: specialization.to_string(),
            ..self.clone()
        }
    }

    /// Non-empty check only; format is the server's concern.
    pub fn login_request(&self) -> Result<LoginRequest, MissingField> {
        Ok(LoginRequest {
            email: required(&self.email, MissingField::Email)?,
            password: required(&self.password, MissingField::Password)?,
        })
    }

    pub fn registration_request(&self) -> Result<RegistrationRequest, MissingField> {
        let LoginRequest { email, password } = self.login_request()?;
        let full_name = required(&self.full_name, MissingField::FullName)?;

        let age = match self.role {
            Role::Patient => parse_age(&self.age),
            _ => None,
        };
        let specialization = match self.role {
            Role::Doctor => Some(self.specialization.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        };

        Ok(RegistrationRequest {
            email,
            password,
            full_name,
            role: self.role.clone(),
            age,
            specialization,
        })
    }
}

fn required(value: &str, field: MissingField) -> Result<String, MissingField> {
    if value.trim().is_empty() {
        Err(field)
    } else {
        Ok(value.to_string())
    }
}

/// Leading integer of the input, sign allowed. Blank or non-numeric text
/// yields `None` and the key is left off the request.
fn parse_age(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(role: Role) -> AuthForm {
        AuthForm::login("d@x.org", "pw")
            .with_full_name("Dana Cole")
            .with_role(role)
    }

    #[test]
    fn doctor_registration_omits_age_and_keeps_specialization() {
        let form = registration(Role::Doctor)
            .with_age("52")
            .with_specialization("Cardiology");
        let req = form.registration_request().unwrap();
        assert_eq!(req.age, None);
        assert_eq!(req.specialization.as_deref(), Some("Cardiology"));

        let body = serde_json::to_value(&req).unwrap();
        assert!(!body.as_object().unwrap().contains_key("age"));
        assert_eq!(body["specialization"], "Cardiology");
    }

    #[test]
    fn patient_registration_omits_specialization() {
        let form = registration(Role::Patient)
            .with_age("64")
            .with_specialization("Cardiology");
        let req = form.registration_request().unwrap();
        assert_eq!(req.age, Some(64));
        assert_eq!(req.specialization, None);
    }

    #[test]
    fn blank_age_is_omitted() {
        let req = registration(Role::Patient)
            .with_age("  ")
            .registration_request()
            .unwrap();
        assert_eq!(req.age, None);
    }

    #[test]
    fn age_parsing_is_lenient() {
        assert_eq!(parse_age("70 years"), Some(70));
        assert_eq!(parse_age("-3"), Some(-3));
        assert_eq!(parse_age("999"), Some(999));
        assert_eq!(parse_age("old"), None);
        assert_eq!(parse_age("-"), None);
    }

    #[test]
    fn non_numeric_age_is_left_out_of_payload() {
        let req = registration(Role::Patient)
            .with_age("abc")
            .registration_request()
            .unwrap();
        assert_eq!(req.age, None);

        let body = serde_json::to_value(&req).unwrap();
        assert!(!body.as_object().unwrap().contains_key("age"));
        assert_eq!(body["role"], "patient");
    }

    #[test]
    fn role_defaults_to_patient() {
        assert_eq!(AuthForm::default().role, Role::Patient);
    }

    #[test]
    fn required_fields_must_be_non_empty() {
        assert_eq!(
            AuthForm::login("", "pw").login_request(),
            Err(MissingField::Email)
        );
        assert_eq!(
            AuthForm::login("a@b.c", " ").login_request(),
            Err(MissingField::Password)
        );
        assert_eq!(
            AuthForm::login("a@b.c", "pw").registration_request(),
            Err(MissingField::FullName)
        );
    }

    #[test]
    fn login_does_not_validate_email_format() {
        let req = AuthForm::login("not-an-email", "pw").login_request().unwrap();
        assert_eq!(req.email, "not-an-email");
    }
}
