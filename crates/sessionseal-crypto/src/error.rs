use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Keyring must contain at least one key")]
    EmptyKeyring,

    #[error("Unable to unwrap data key: {0}")]
    UnwrapFailure(String),

    #[error("Encrypted message context does not match decryption context")]
    ContextMismatch,

    #[error("Malformed encrypted message: {0}")]
    MalformedMessage(String),

    #[error("Unsupported algorithm suite: {0:#06x}")]
    UnsupportedSuite(u16),

    #[error("Unsupported message version: {0}")]
    UnsupportedVersion(u8),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl CryptoError {
    /// True for failures that mean "this ciphertext cannot be trusted" as
    /// opposed to configuration or environment failures.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            CryptoError::UnwrapFailure(_)
                | CryptoError::ContextMismatch
                | CryptoError::MalformedMessage(_)
                | CryptoError::UnsupportedSuite(_)
                | CryptoError::UnsupportedVersion(_)
        )
    }
}
