//! Key material registry: parses configured `name=base64(secret)` pairs into
//! validated key entries.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::base64::{base64url_encode, decode_key_material};
use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, KEY_LENGTH_BITS};

/// A named 256-bit master key. Immutable once constructed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyEntry {
    name: String,
    secret: [u8; AES_KEY_LENGTH],
}

impl KeyEntry {
    /// Build an entry from raw secret bytes, which must be exactly 256 bits.
    pub fn new(name: impl Into<String>, secret: &[u8]) -> Result<Self, CryptoError> {
        let name = name.into();
        let secret: [u8; AES_KEY_LENGTH] = secret.try_into().map_err(|_| {
            CryptoError::InvalidKeyMaterial(format!(
                "invalid key size for \"{}\": expected {} bits, got {} bits",
                name,
                KEY_LENGTH_BITS,
                secret.len() * 8
            ))
        })?;
        Ok(Self { name, secret })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn secret(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.secret
    }
}

impl fmt::Debug for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEntry")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Parse a URL-query-shaped param string of `name=base64(secret)` pairs.
///
/// Order is preserved and names are not deduplicated. Every value must decode
/// to exactly 256 bits; the first bad entry fails the whole string.
pub fn build_key_entries(param_string: &str) -> Result<Vec<KeyEntry>, CryptoError> {
    url::form_urlencoded::parse(param_string.as_bytes())
        .map(|(name, encoded)| {
            // Form decoding turns '+' into a space; undo it for standard base64.
            let encoded = encoded.replace(' ', "+");
            let mut secret = decode_key_material(&encoded).map_err(|e| {
                CryptoError::InvalidKeyMaterial(format!(
                    "key \"{}\" is not valid base64: {}",
                    name, e
                ))
            })?;
            let entry = KeyEntry::new(name.into_owned(), &secret);
            secret.zeroize();
            entry
        })
        .collect()
}

/// Generate base64url-encoded random key material. Useful for tests and
/// local development; `byte_len` is normally `KEY_LENGTH_BITS / 8`.
pub fn random_key(byte_len: usize) -> Result<String, CryptoError> {
    let mut bytes = vec![0u8; byte_len];
    getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    let encoded = base64url_encode(&bytes);
    bytes.zeroize();
    Ok(encoded)
}
