//! API error types with server-detail extraction.

use serde::Deserialize;

/// Failure of one API call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Could not reach server: {0}")]
    Transport(String),
    #[error("Server returned {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("Unexpected response body: {0}")]
    Decode(String),
    #[error("Not logged in")]
    NotAuthenticated,
}

/// Error body shape used by the backend: `{"detail": ...}`.
/// `detail` is a string for handled errors and a list for validation errors.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    /// Build a status error, keeping the server's `detail` if it is a string.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail.as_str().map(str::to_string))
            .filter(|d| !d.trim().is_empty());
        ApiError::Status { status, detail }
    }

    /// Text for the user: the server detail when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Bad credentials, expired token, or missing session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                status: 401 | 403,
                ..
            } | ApiError::NotAuthenticated
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
