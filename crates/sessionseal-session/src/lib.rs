//! Encrypted storage of a session's OIDC tokens.
//!
//! Tokens are encrypted with the configured keyring and bound to the session
//! id through the encryption context, so a blob copied into another session
//! fails to decrypt.

pub mod backend;
pub mod config;
pub mod error;
pub mod store;
pub mod tokens;

pub use backend::{BackendError, MemoryBackend, SessionBackend};
pub use config::{SessionConfig, ENCRYPTION_KEYS_VAR, ENVIRONMENT_VAR, EPHEMERAL_KEY_NAME};
pub use error::SessionError;
pub use store::{SessionTokenStore, SESSION_ID_CONTEXT_KEY};
pub use tokens::{Session, Tokens};
