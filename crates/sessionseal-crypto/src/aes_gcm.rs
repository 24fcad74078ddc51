//! AES-256-GCM payload encryption with a detached tag.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};

use crate::error::CryptoError;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH};

/// Output of a payload encryption: IV, detached tag, ciphertext.
#[derive(Debug, Clone)]
pub struct SealedPayload {
    pub iv: [u8; AES_GCM_IV_LENGTH],
    pub tag: [u8; AES_GCM_TAG_LENGTH],
    pub ciphertext: Vec<u8>,
}

/// Generate a random 12-byte IV for AES-GCM.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_GCM_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(iv)
}

/// Encrypt `plaintext` under `key`, authenticating `aad`.
pub fn seal(
    key: &[u8; AES_KEY_LENGTH],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<SealedPayload, CryptoError> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let iv = generate_iv()?;
    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), aad, &mut ciphertext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut tag_bytes = [0u8; AES_GCM_TAG_LENGTH];
    tag_bytes.copy_from_slice(&tag);
    Ok(SealedPayload {
        iv,
        tag: tag_bytes,
        ciphertext,
    })
}

/// Decrypt a payload. Any authentication failure (wrong key, tampered
/// ciphertext, IV, tag or associated data) is an `UnwrapFailure`.
pub fn open(
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8],
    tag: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != AES_GCM_IV_LENGTH {
        return Err(CryptoError::MalformedMessage(format!(
            "IV must be {} bytes, got {}",
            AES_GCM_IV_LENGTH,
            iv.len()
        )));
    }
    if tag.len() != AES_GCM_TAG_LENGTH {
        return Err(CryptoError::MalformedMessage(format!(
            "tag must be {} bytes, got {}",
            AES_GCM_TAG_LENGTH,
            tag.len()
        )));
    }
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::UnwrapFailure(e.to_string()))?;
    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(iv),
            aad,
            &mut plaintext,
            Tag::from_slice(tag),
        )
        .map_err(|_| CryptoError::UnwrapFailure("payload authentication failed".into()))?;
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        getrandom::getrandom(&mut key).unwrap();
        key
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let sealed = seal(&key, b"Hello, World!", b"aad").unwrap();
        let opened = open(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext, b"aad").unwrap();
        assert_eq!(opened, b"Hello, World!");
    }

    #[test]
    fn different_iv_each_time() {
        let key = random_key();
        let a = seal(&key, b"test", b"").unwrap();
        let b = seal(&key, b"test", b"").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn handles_empty_plaintext() {
        let key = random_key();
        let sealed = seal(&key, b"", b"").unwrap();
        assert!(sealed.ciphertext.is_empty());
        let opened = open(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext, b"").unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let key = random_key();
        let mut sealed = seal(&key, b"secret", b"").unwrap();
        sealed.ciphertext[0] ^= 0xff;
        let err = open(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext, b"").unwrap_err();
        assert!(matches!(err, CryptoError::UnwrapFailure(_)));
    }

    #[test]
    fn rejects_tampered_tag() {
        let key = random_key();
        let mut sealed = seal(&key, b"secret", b"").unwrap();
        sealed.tag[15] ^= 0x01;
        assert!(open(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext, b"").is_err());
    }

    #[test]
    fn rejects_wrong_aad() {
        let key = random_key();
        let sealed = seal(&key, b"bound", b"header-a").unwrap();
        assert!(open(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext, b"header-b").is_err());
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&random_key(), b"secret", b"").unwrap();
        assert!(open(&random_key(), &sealed.iv, &sealed.tag, &sealed.ciphertext, b"").is_err());
    }

    #[test]
    fn rejects_short_iv_and_tag() {
        let key = random_key();
        let sealed = seal(&key, b"secret", b"").unwrap();
        let err = open(&key, &sealed.iv[..8], &sealed.tag, &sealed.ciphertext, b"").unwrap_err();
        assert!(matches!(err, CryptoError::MalformedMessage(_)));
        let err = open(&key, &sealed.iv, &sealed.tag[..4], &sealed.ciphertext, b"").unwrap_err();
        assert!(matches!(err, CryptoError::MalformedMessage(_)));
    }
}
