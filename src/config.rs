use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CareCompanion";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the backend origin.
pub const BACKEND_URL_ENV: &str = "CARECOMPANION_BACKEND_URL";

/// Backend origin used when the environment does not provide one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Application root; every completed auth flow lands here.
pub const ROOT_PATH: &str = "/";

/// Path the identity provider redirects back to.
pub const OAUTH_CALLBACK_PATH: &str = "/oauth2callback";

/// Durable storage key for the credential token.
pub const TOKEN_KEY: &str = "token";

/// Durable storage key for the serialized identity.
pub const USER_KEY: &str = "user";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,carecompanion_lib=debug"
}

/// Get the application data directory.
/// `<platform data dir>/CareCompanion`, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Client configuration resolved once at startup and passed into components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    backend_url: String,
    storage_dir: PathBuf,
}

impl ClientConfig {
    /// Create a config for an explicit backend origin and storage directory.
    pub fn new(backend_url: &str, storage_dir: PathBuf) -> Self {
        Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            storage_dir,
        }
    }

    /// Read the backend origin from `CARECOMPANION_BACKEND_URL`.
    pub fn from_env() -> Self {
        let backend = std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(&backend, app_data_dir())
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Base for every JSON endpoint.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.backend_url)
    }

    /// Full-page navigation target that starts the external provider flow.
    pub fn external_login_url(&self) -> String {
        format!("{}/auth/google", self.backend_url)
    }

    pub fn storage_dir(&self) -> &std::path::Path {
        &self.storage_dir
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL, app_data_dir())
    }
}
