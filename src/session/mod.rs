//! Session store: the single source of truth for "who is logged in".
//!
//! Key properties:
//! - Identity and credential token are one value (`Session`); there is no way
//!   to hold one without the other
//! - `set` and `clear` replace the whole pair in one step
//! - Tokens are zeroed on drop and never printed by `Debug`
//! - No freshness check: a stored token is trusted until a protected request fails

pub mod durable;

use std::fmt;
use std::sync::RwLock;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::Identity;

pub use durable::DurableSessionStore;

// ═══════════════════════════════════════════════════════════
// CredentialToken (zeroed on drop)
// ═══════════════════════════════════════════════════════════

/// Opaque bearer credential issued by the auth endpoints.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialToken(String);

impl CredentialToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw value for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialToken(<redacted>)")
    }
}

// ═══════════════════════════════════════════════════════════
// Session: identity + token, always together
// ═══════════════════════════════════════════════════════════

/// The authenticated pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    identity: Identity,
    token: CredentialToken,
}

impl Session {
    pub fn new(identity: Identity, token: CredentialToken) -> Self {
        Self { identity, token }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> &CredentialToken {
        &self.token
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore trait
// ═══════════════════════════════════════════════════════════

/// Injectable store for the current session.
///
/// Implementations must make `set` and `clear` whole-pair operations: a
/// concurrent `read` sees either the old pair, the new pair, or absent.
pub trait SessionStore: Send + Sync {
    /// Persist both halves, replacing any prior session.
    fn set(&self, identity: Identity, token: CredentialToken) -> Result<(), SessionError>;

    /// Remove both halves.
    fn clear(&self) -> Result<(), SessionError>;

    /// Current session, or `None` when absent or unreadable.
    fn read(&self) -> Option<Session>;
}

/// In-memory store. Lost on process exit; used by tests and embedders that
/// manage persistence themselves.
#[derive(Default)]
pub struct MemorySessionStore {
    current: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts logged in.
    pub fn with_session(session: Session) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, identity: Identity, token: CredentialToken) -> Result<(), SessionError> {
        let mut guard = self.current.write().map_err(|_| SessionError::LockPoisoned)?;
        *guard = Some(Session::new(identity, token));
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.current.write().map_err(|_| SessionError::LockPoisoned)?;
        *guard = None;
        Ok(())
    }

    fn read(&self) -> Option<Session> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Session lock poisoned")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
