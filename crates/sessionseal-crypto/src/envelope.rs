//! Envelope encryption under a keyring.
//!
//! Encrypt: fresh data key → AES-KW wrap under the generator → HKDF-SHA256
//! payload key → AES-256-GCM(payload, aad = header bytes) → base64 message
//!
//! Decrypt: parse → unwrap with the first matching candidate → HKDF-SHA256 →
//! AES-256-GCM open → check the caller's context against the embedded one
//!
//! Only the generator wraps new data keys. Older keys stay in the keyring to
//! decrypt what they wrapped; removing a key decommissions its messages.

use zeroize::Zeroize;

use crate::aes_gcm::{open, seal};
use crate::dek::{generate_data_key, unwrap_data_key, wrap_data_key};
use crate::error::CryptoError;
use crate::hkdf::derive_payload_key;
use crate::key_material::KeyEntry;
use crate::keyring::Keyring;
use crate::message::{EncryptedMessage, MessageHeader, WrappedDataKey};
use crate::types::{
    EncryptionContext, AES_KEY_LENGTH, CURRENT_VERSION, KEY_NAMESPACE, MESSAGE_ID_LENGTH,
    SUITE_AES256_GCM_IV12_TAG16_HKDF_SHA256,
};

fn generate_message_id() -> Result<Vec<u8>, CryptoError> {
    let mut mid = vec![0u8; MESSAGE_ID_LENGTH];
    getrandom::getrandom(&mut mid).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(mid)
}

/// Encrypt `plaintext` under the keyring's generator.
///
/// `context` is embedded in cleartext and authenticated; it must not hold
/// secrets. Returns the base64 encrypted message.
pub fn encrypt(
    keyring: &Keyring,
    plaintext: impl AsRef<[u8]>,
    context: Option<&EncryptionContext>,
) -> Result<String, CryptoError> {
    let mut data_key = generate_data_key()?;
    let message = seal_message(keyring.generator(), &data_key, plaintext.as_ref(), context);
    data_key.zeroize();
    message?.to_base64()
}

fn seal_message(
    generator: &KeyEntry,
    data_key: &[u8; AES_KEY_LENGTH],
    plaintext: &[u8],
    context: Option<&EncryptionContext>,
) -> Result<EncryptedMessage, CryptoError> {
    let wrapped = wrap_data_key(data_key, generator.secret())?;
    let header = MessageHeader {
        v: CURRENT_VERSION,
        suite: SUITE_AES256_GCM_IV12_TAG16_HKDF_SHA256,
        mid: generate_message_id()?,
        ctx: context.cloned().unwrap_or_default(),
        keys: vec![WrappedDataKey {
            ns: KEY_NAMESPACE.to_string(),
            name: generator.name().to_string(),
            key: wrapped.to_vec(),
        }],
    };
    let header_bytes = EncryptedMessage::encode_header(&header)?;

    let mut payload_key = derive_payload_key(data_key, &header)?;
    let sealed = seal(&payload_key, plaintext, &header_bytes);
    payload_key.zeroize();

    Ok(EncryptedMessage::assemble(header, header_bytes, sealed?))
}

/// Find the first candidate (in keyring order) that unwraps one of the
/// message's data keys.
fn unwrap_with_keyring(
    keyring: &Keyring,
    message: &EncryptedMessage,
) -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    for candidate in keyring.candidates() {
        let matching = message
            .header()
            .keys
            .iter()
            .filter(|w| w.ns == KEY_NAMESPACE && w.name == candidate.name());
        for wrapped in matching {
            match unwrap_data_key(&wrapped.key, candidate.secret()) {
                Ok(data_key) => return Ok(data_key),
                Err(e) => {
                    tracing::debug!(key = candidate.name(), error = %e, "candidate failed to unwrap");
                }
            }
        }
    }

    let wrapped_under: Vec<String> = message
        .header()
        .keys
        .iter()
        .map(|w| format!("{}:{}", w.ns, w.name))
        .collect();
    Err(CryptoError::UnwrapFailure(format!(
        "no keyring key can unwrap the data key (wrapped under {})",
        wrapped_under.join(", ")
    )))
}

/// Every pair in `expected` must be present and equal in `embedded`.
/// A subset is fine; an extra or differing pair is a mismatch.
fn check_context(
    embedded: &EncryptionContext,
    expected: &EncryptionContext,
) -> Result<(), CryptoError> {
    let matches = expected
        .iter()
        .all(|(key, value)| embedded.get(key) == Some(value));
    if matches {
        Ok(())
    } else {
        Err(CryptoError::ContextMismatch)
    }
}

/// Decrypt a base64 message to raw bytes.
pub fn decrypt_bytes(
    keyring: &Keyring,
    ciphertext: &str,
    context: Option<&EncryptionContext>,
) -> Result<Vec<u8>, CryptoError> {
    let message = EncryptedMessage::parse(ciphertext)?;
    let header = message.header();

    let mut data_key = unwrap_with_keyring(keyring, &message)?;
    let payload_key = derive_payload_key(&data_key, header);
    data_key.zeroize();
    let mut payload_key = payload_key?;

    let plaintext = open(
        &payload_key,
        message.iv(),
        message.tag(),
        message.ciphertext(),
        message.associated_data(),
    );
    payload_key.zeroize();
    let mut plaintext = plaintext?;

    if let Some(expected) = context {
        if let Err(e) = check_context(&header.ctx, expected) {
            plaintext.zeroize();
            return Err(e);
        }
    }
    Ok(plaintext)
}

/// Decrypt a base64 message to a UTF-8 string.
///
/// If `context` is given, each of its pairs must match the context embedded
/// at encryption time.
pub fn decrypt(
    keyring: &Keyring,
    ciphertext: &str,
    context: Option<&EncryptionContext>,
) -> Result<String, CryptoError> {
    let plaintext = decrypt_bytes(keyring, ciphertext, context)?;
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        CryptoError::MalformedMessage("plaintext is not valid UTF-8".into())
    })
}
