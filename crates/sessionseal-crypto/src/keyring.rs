//! Immutable keyring: one generator key for encryption, every key (generator
//! first) as an ordered decryption candidate.

use crate::error::CryptoError;
use crate::key_material::{build_key_entries, KeyEntry};

#[derive(Debug, Clone)]
pub struct Keyring {
    /// Active encryption key.
    generator: KeyEntry,
    /// Remaining decryption candidates, in configured order.
    others: Vec<KeyEntry>,
}

impl Keyring {
    /// Build a keyring from ordered entries. The first entry becomes the generator.
    pub fn new(entries: Vec<KeyEntry>) -> Result<Self, CryptoError> {
        let mut entries = entries.into_iter();
        let generator = entries.next().ok_or(CryptoError::EmptyKeyring)?;
        let keyring = Self {
            generator,
            others: entries.collect(),
        };
        tracing::debug!(
            keys = keyring.len(),
            generator = keyring.generator.name(),
            "keyring constructed"
        );
        Ok(keyring)
    }

    /// Parse and validate a `name=base64(secret)&...` string into a keyring.
    pub fn from_param_string(param_string: &str) -> Result<Self, CryptoError> {
        Self::new(build_key_entries(param_string)?)
    }

    /// The key that wraps data keys for every new message.
    pub fn generator(&self) -> &KeyEntry {
        &self.generator
    }

    /// All keys in decryption order, generator first.
    pub fn candidates(&self) -> impl Iterator<Item = &KeyEntry> {
        std::iter::once(&self.generator).chain(self.others.iter())
    }

    pub fn key_names(&self) -> Vec<&str> {
        self.candidates().map(KeyEntry::name).collect()
    }

    pub fn len(&self) -> usize {
        1 + self.others.len()
    }

    /// Always false; a keyring cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}
