//! Encrypted message wire format.
//!
//! `base64( CBOR { h, iv, tag, ct } )` where `h` is itself the CBOR-encoded
//! [`MessageHeader`]. The header bytes are authenticated as AES-GCM associated
//! data exactly as they appear on the wire, so the embedded context and key
//! identifiers cannot be altered without failing decryption.

use serde::{Deserialize, Serialize};

use crate::aes_gcm::SealedPayload;
use crate::base64::{base64_decode, base64_encode};
use crate::error::CryptoError;
use crate::types::{
    EncryptionContext, SUITE_AES256_GCM_IV12_TAG16_HKDF_SHA256, SUPPORTED_VERSIONS,
};

/// A data key wrapped under one named master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedDataKey {
    /// Key namespace.
    pub ns: String,
    /// Key name within the namespace.
    pub name: String,
    /// AES-KW(master key, data key).
    #[serde(with = "serde_bytes")]
    pub key: Vec<u8>,
}

/// Cleartext, authenticated message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Wire format version.
    pub v: u8,
    /// Algorithm suite identifier.
    pub suite: u16,
    /// Random message id, the HKDF salt.
    #[serde(with = "serde_bytes")]
    pub mid: Vec<u8>,
    /// Encryption context (cleartext).
    pub ctx: EncryptionContext,
    /// Wrapped data keys, one per wrapping master key.
    pub keys: Vec<WrappedDataKey>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    #[serde(with = "serde_bytes")]
    h: Vec<u8>,
    #[serde(with = "serde_bytes")]
    iv: Vec<u8>,
    #[serde(with = "serde_bytes")]
    tag: Vec<u8>,
    #[serde(with = "serde_bytes")]
    ct: Vec<u8>,
}

/// A parsed encrypted message.
#[derive(Debug, Clone)]
pub struct EncryptedMessage {
    header: MessageHeader,
    header_bytes: Vec<u8>,
    iv: Vec<u8>,
    tag: Vec<u8>,
    ciphertext: Vec<u8>,
}

fn cbor_encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| CryptoError::EncryptionFailed(format!("CBOR encode error: {}", e)))?;
    Ok(buf)
}

fn cbor_decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, CryptoError> {
    ciborium::from_reader(data)
        .map_err(|e| CryptoError::MalformedMessage(format!("CBOR decode error: {}", e)))
}

impl EncryptedMessage {
    /// Encode the header (fixing the associated data for the payload).
    pub(crate) fn encode_header(header: &MessageHeader) -> Result<Vec<u8>, CryptoError> {
        cbor_encode(header)
    }

    pub(crate) fn assemble(
        header: MessageHeader,
        header_bytes: Vec<u8>,
        payload: SealedPayload,
    ) -> Self {
        Self {
            header,
            header_bytes,
            iv: payload.iv.to_vec(),
            tag: payload.tag.to_vec(),
            ciphertext: payload.ciphertext,
        }
    }

    /// Decode a base64 message and validate its version and suite.
    pub fn parse(encoded: &str) -> Result<Self, CryptoError> {
        let raw = base64_decode(encoded.trim())
            .map_err(|e| CryptoError::MalformedMessage(format!("invalid base64: {}", e)))?;
        let wire: WireMessage = cbor_decode(&raw)?;
        let header: MessageHeader = cbor_decode(&wire.h)?;

        if !SUPPORTED_VERSIONS.contains(&header.v) {
            return Err(CryptoError::UnsupportedVersion(header.v));
        }
        if header.suite != SUITE_AES256_GCM_IV12_TAG16_HKDF_SHA256 {
            return Err(CryptoError::UnsupportedSuite(header.suite));
        }
        if header.keys.is_empty() {
            return Err(CryptoError::MalformedMessage(
                "message carries no wrapped data keys".into(),
            ));
        }

        Ok(Self {
            header,
            header_bytes: wire.h,
            iv: wire.iv,
            tag: wire.tag,
            ciphertext: wire.ct,
        })
    }

    /// Serialize to the base64 wire representation.
    pub fn to_base64(&self) -> Result<String, CryptoError> {
        let wire = WireMessage {
            h: self.header_bytes.clone(),
            iv: self.iv.clone(),
            tag: self.tag.clone(),
            ct: self.ciphertext.clone(),
        };
        Ok(base64_encode(&cbor_encode(&wire)?))
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// The embedded (unverified until decryption) encryption context.
    pub fn encryption_context(&self) -> &EncryptionContext {
        &self.header.ctx
    }

    pub(crate) fn associated_data(&self) -> &[u8] {
        &self.header_bytes
    }

    pub(crate) fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub(crate) fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub(crate) fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}
