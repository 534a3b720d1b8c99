//! Role Router: which top-level view a session gets.

use serde::Serialize;

use crate::models::Role;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Auth,
    PatientDashboard,
    DoctorDashboard,
}

/// Pure decision over the current session.
///
/// Only the exact `patient` and `doctor` tags reach a dashboard. Anything
/// else is treated as logged out.
pub fn route(session: Option<&Session>) -> View {
    let Some(session) = session else {
        return View::Auth;
    };
    match &session.identity().role {
        Role::Patient => View::PatientDashboard,
        Role::Doctor => View::DoctorDashboard,
        Role::Unrecognized(tag) => {
            tracing::warn!(role = %tag, user_id = %session.identity().id, "Unrecognized role in session, routing to auth");
            View::Auth
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::test_identity;
    use crate::session::CredentialToken;

    fn session(role: Role) -> Session {
        Session::new(test_identity(role), CredentialToken::new("t"))
    }

    #[test]
    fn absent_routes_to_auth() {
        assert_eq!(route(None), View::Auth);
    }

    #[test]
    fn known_roles_route_to_their_dashboard() {
        assert_eq!(route(Some(&session(Role::Patient))), View::PatientDashboard);
        assert_eq!(route(Some(&session(Role::Doctor))), View::DoctorDashboard);
    }

    #[test]
    fn unknown_role_fails_closed() {
        for tag in ["admin", "Doctor", "DOCTOR", ""] {
            let s = session(Role::from_tag(tag));
            assert_eq!(route(Some(&s)), View::Auth, "tag {tag:?}");
        }
    }
}
