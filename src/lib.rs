pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod notify;
pub mod router;
pub mod session;

pub use api::{ApiError, CareApi, HttpCareApi, MockCareApi};
pub use app::{CareApp, Mounted};
pub use config::ClientConfig;
pub use router::View;
pub use session::{CredentialToken, DurableSessionStore, MemorySessionStore, Session, SessionStore};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} client starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
