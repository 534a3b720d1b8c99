//! Backend API layer.
//!
//! `CareApi` is the contract the controllers depend on. `HttpCareApi` talks to
//! the real backend under `{backend}/api`; `MockCareApi` is scriptable and
//! used by the controller tests.

pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use client::CareApi;
pub use error::ApiError;
pub use http::HttpCareApi;
pub use mock::{MockCall, MockCareApi};
pub use types::{AuthResponse, LoginRequest, RegistrationRequest};
