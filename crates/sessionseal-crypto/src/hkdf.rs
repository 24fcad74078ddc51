//! Payload key derivation.
//!
//! `payload_key = HKDF-SHA256(ikm = data key, salt = header.mid,
//! info = "sessionseal:payload:" || v || suite_be)`

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::CryptoError;
use crate::message::MessageHeader;
use crate::types::AES_KEY_LENGTH;

const PAYLOAD_INFO_PREFIX: &[u8] = b"sessionseal:payload:";

fn payload_info(version: u8, suite_id: u16) -> Vec<u8> {
    let mut info = PAYLOAD_INFO_PREFIX.to_vec();
    info.push(version);
    info.extend_from_slice(&suite_id.to_be_bytes());
    info
}

/// Derive the AES-256-GCM key for a message's payload from its unwrapped
/// data key. The message id salts the derivation, so a data key is never
/// used directly and two messages never share a payload key.
pub fn derive_payload_key(
    data_key: &[u8; AES_KEY_LENGTH],
    header: &MessageHeader,
) -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    let hk = Hkdf::<Sha256>::new(Some(&header.mid), data_key);
    let mut okm = [0u8; AES_KEY_LENGTH];
    hk.expand(&payload_info(header.v, header.suite), &mut okm)
        .map_err(|e| CryptoError::EncryptionFailed(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}
