//! Keyring-based envelope encryption for small secrets at rest.

pub mod aes_gcm;
pub mod base64;
pub mod dek;
pub mod envelope;
pub mod error;
pub mod hkdf;
pub mod key_material;
pub mod keyring;
pub mod message;
pub mod types;

pub use envelope::{decrypt, decrypt_bytes, encrypt};
pub use error::CryptoError;
pub use key_material::{build_key_entries, random_key, KeyEntry};
pub use keyring::Keyring;
pub use message::{EncryptedMessage, MessageHeader, WrappedDataKey};
pub use types::{
    EncryptionContext, CURRENT_VERSION, KEY_LENGTH_BITS, KEY_NAMESPACE,
    SUITE_AES256_GCM_IV12_TAG16_HKDF_SHA256,
};
