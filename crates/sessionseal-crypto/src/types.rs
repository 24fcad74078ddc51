/// Wire format version for encrypted messages.
///
/// Version 1: AES-KW wrapped data key(s), HKDF-SHA256 payload key, AES-256-GCM payload.
/// Format: base64(CBOR { header: CBOR(MessageHeader), iv, tag, ct })
pub const CURRENT_VERSION: u8 = 1;

/// Supported wire format versions (for decryption).
pub const SUPPORTED_VERSIONS: &[u8] = &[1];

/// Algorithm suite: AES-256-GCM, 96-bit IV, 128-bit tag, HKDF-SHA256 key derivation.
/// No signing, no key commitment.
pub const SUITE_AES256_GCM_IV12_TAG16_HKDF_SHA256: u16 = 0x0178;

/// Namespace embedded alongside every key name. Kept short since it is
/// written in cleartext into every message.
pub const KEY_NAMESPACE: &str = "N";

/// Length of configured master keys in bits.
pub const KEY_LENGTH_BITS: usize = 256;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = KEY_LENGTH_BITS / 8;

/// AES-GCM IV length in bytes (96 bits per NIST recommendation).
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// Random per-message identifier, used as the HKDF salt.
pub const MESSAGE_ID_LENGTH: usize = 32;

/// Associated data bound to a ciphertext: authenticated, never encrypted.
///
/// Ordered so the header encoding is deterministic. Do not put secrets here.
pub type EncryptionContext = std::collections::BTreeMap<String, String>;
