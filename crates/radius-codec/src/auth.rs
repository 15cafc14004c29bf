//! Authenticator computation and User-Password obfuscation (RFC 2865/2866).

use rand::Rng;
use tracing::error;

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3.
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut rng = rand::rng();
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator);
    authenticator
}

/// Response Authenticator per RFC 2865 Section 3:
///
/// MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
pub fn response_authenticator(
    code: u8,
    identifier: u8,
    length: u16,
    request_authenticator: &[u8; 16],
    avp_bytes: &[u8],
    secret: &[u8],
) -> [u8; 16] {
    let mut data = Vec::with_capacity(20 + avp_bytes.len() + secret.len());
    data.push(code);
    data.push(identifier);
    data.extend_from_slice(&length.to_be_bytes());
    data.extend_from_slice(request_authenticator);
    data.extend_from_slice(avp_bytes);
    data.extend_from_slice(secret);
    md5::compute(&data).0
}

/// Request Authenticator of an Accounting-Request per RFC 2866 Section 3:
///
/// MD5(Code + ID + Length + 16 zero octets + Attributes + Secret)
pub fn accounting_request_authenticator(
    code: u8,
    identifier: u8,
    length: u16,
    avp_bytes: &[u8],
    secret: &[u8],
) -> [u8; 16] {
    let zero = [0u8; 16];
    response_authenticator(code, identifier, length, &zero, avp_bytes, secret)
}

/// Recompute the authenticator of a received datagram and compare it against
/// the wire value, without short-circuiting on the first mismatched byte.
/// Applies to Accounting-Request and response packets, whose authenticator is
/// keyed on 16 zero octets in place of a request authenticator.
pub fn verify_authenticator(raw: &[u8], secret: &[u8]) -> bool {
    if raw.len() < 20 {
        return false;
    }
    let mut data = Vec::with_capacity(raw.len() + secret.len());
    data.extend_from_slice(&raw[0..4]);
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&raw[20..]);
    data.extend_from_slice(secret);
    let digest = md5::compute(&data);
    constant_time_compare(&digest.0, &raw[4..20])
}

/// Obscure a plaintext password per RFC 2865 Section 5.2.
///
/// The password is zero-padded to a multiple of 16 bytes (at least one
/// block), then each block is XORed with MD5(secret + previous), where
/// `previous` is the request authenticator for the first block and the
/// previous ciphertext block afterwards.
pub fn obscure_user_password(password: &str, secret: &[u8], authenticator: &[u8; 16]) -> Vec<u8> {
    let mut padded = password.as_bytes().to_vec();
    let padding = (16 - padded.len() % 16) % 16;
    padded.resize(padded.len() + padding, 0);
    if padded.is_empty() {
        padded.resize(16, 0);
    }

    let mut out = Vec::with_capacity(padded.len());
    let mut previous = *authenticator;

    for chunk in padded.chunks_exact(16) {
        let key = block_key(secret, &previous);
        let mut block = [0u8; 16];
        for i in 0..16 {
            block[i] = chunk[i] ^ key[i];
        }
        previous = block;
        out.extend_from_slice(&block);
    }

    out
}

/// Reveal an obscured User-Password.
///
/// The content must be 16 to 128 bytes and a multiple of 16; violations
/// return `None`. The plaintext ends at the first zero byte (the padding),
/// which is not included in the result.
pub fn reveal_user_password(
    obscured: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Option<String> {
    if obscured.len() < 16 {
        error!(len = obscured.len(), "user-password content too short");
        return None;
    }
    if obscured.len() > 128 {
        error!(len = obscured.len(), "user-password content too long");
        return None;
    }
    if obscured.len() % 16 != 0 {
        error!(len = obscured.len(), "user-password content not a multiple of 16");
        return None;
    }

    let mut plain = Vec::with_capacity(obscured.len());
    let mut previous = *authenticator;

    for chunk in obscured.chunks_exact(16) {
        let key = block_key(secret, &previous);
        for i in 0..16 {
            plain.push(chunk[i] ^ key[i]);
        }
        previous.copy_from_slice(chunk);
    }

    let end = plain.iter().position(|byte| *byte == 0).unwrap_or(plain.len());
    plain.truncate(end);
    Some(String::from_utf8_lossy(&plain).into_owned())
}

fn block_key(secret: &[u8], previous: &[u8; 16]) -> [u8; 16] {
    let mut keyed = Vec::with_capacity(secret.len() + 16);
    keyed.extend_from_slice(secret);
    keyed.extend_from_slice(previous);
    md5::compute(&keyed).0
}

/// Compare two byte strings without data-dependent early exit.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
