//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{Identity, Role};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`. Optional fields are omitted, not null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    /// Omitted when blank or not a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

/// Successful response of every auth endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: Identity,
}
