use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("SESSION_ENCRYPTION_KEYS required in production mode")]
    MissingProductionKeys,

    #[error("Crypto error: {0}")]
    Crypto(#[from] sessionseal_crypto::CryptoError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl SessionError {
    /// The stored tokens cannot be trusted (wrong key, tampering, or bound to
    /// another session). Treat the session as invalid.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            SessionError::Crypto(e) => e.is_authentication_failure(),
            _ => false,
        }
    }
}
