use base64ct::{Base64, Base64Unpadded, Base64Url, Base64UrlUnpadded, Encoding};

/// Standard base64 encode with padding. Used for the outer message encoding.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Standard base64 decode with padding.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Decode key material from any of the common base64 alphabets.
///
/// Keys are documented as base64url, but standard base64 (padded or not)
/// is accepted too.
pub fn decode_key_material(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64UrlUnpadded::decode_vec(s)
        .or_else(|_| Base64Url::decode_vec(s))
        .or_else(|_| Base64Unpadded::decode_vec(s))
        .or_else(|_| Base64::decode_vec(s))
}
