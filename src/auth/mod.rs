pub mod callback;
pub mod flow;
pub mod form;

pub use callback::{CallbackOutcome, OAuthCallback};
pub use flow::{AuthError, AuthFlow, AuthMode, AuthPhase, AuthState};
pub use form::{AuthForm, MissingField};
