//! Per-message data key primitives.
//!
//! Every message gets a fresh random 256-bit data key. The data key is wrapped
//! (encrypted) under a master key from the keyring using AES-KW (RFC 3394).

use aes_kw::Kek;

use crate::error::CryptoError;
use crate::types::AES_KEY_LENGTH;

/// AES-KW output size for a 32-byte key: 32 + 8 = 40 bytes.
pub const WRAPPED_DATA_KEY_SIZE: usize = 40;

/// Generate a random 256-bit data key.
pub fn generate_data_key() -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    let mut key = [0u8; AES_KEY_LENGTH];
    getrandom::getrandom(&mut key).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(key)
}

/// Wrap a data key under a master key with AES-KW.
pub fn wrap_data_key(
    data_key: &[u8; AES_KEY_LENGTH],
    master_key: &[u8; AES_KEY_LENGTH],
) -> Result<[u8; WRAPPED_DATA_KEY_SIZE], CryptoError> {
    let kek = Kek::from(*master_key);
    let mut wrapped = [0u8; WRAPPED_DATA_KEY_SIZE];
    kek.wrap(data_key, &mut wrapped)
        .map_err(|e| CryptoError::EncryptionFailed(format!("AES-KW wrap failed: {:?}", e)))?;
    Ok(wrapped)
}

/// Unwrap a data key with AES-KW.
///
/// A wrong master key or any modification of the wrapped bytes fails the
/// RFC 3394 integrity check and surfaces as `UnwrapFailure`.
pub fn unwrap_data_key(
    wrapped: &[u8],
    master_key: &[u8; AES_KEY_LENGTH],
) -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    if wrapped.len() != WRAPPED_DATA_KEY_SIZE {
        return Err(CryptoError::UnwrapFailure(format!(
            "wrapped data key must be {} bytes, got {}",
            WRAPPED_DATA_KEY_SIZE,
            wrapped.len()
        )));
    }
    let kek = Kek::from(*master_key);
    let mut data_key = [0u8; AES_KEY_LENGTH];
    kek.unwrap(wrapped, &mut data_key)
        .map_err(|e| CryptoError::UnwrapFailure(format!("AES-KW unwrap failed: {:?}", e)))?;
    Ok(data_key)
}
