use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;

use crate::errors::{ApiError, Result};

type HmacSha512 = Hmac<Sha512>;

/// 2^16 iterations of PBKDF2-HMAC-SHA512.
const ITERATIONS: u32 = 1 << 16;
const KEY_LENGTH: usize = 64;

/// Derives the stored digest for a password.
///
/// Deterministic for a given (password, salt) pair, so verification is a
/// recompute-and-compare without ever storing the plaintext. Salt and
/// digest travel base64-encoded; decoded salts are 128 bytes
/// (see `tokens::SALT_LENGTH`).
pub fn hash_password(password: &str, salt_b64: &str) -> Result<String> {
    let salt = STANDARD
        .decode(salt_b64)
        .map_err(|e| ApiError::Internal(format!("stored salt is not valid base64: {}", e)))?;

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha512>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| ApiError::Internal(format!("PBKDF2 derivation failed: {}", e)))?;

    Ok(STANDARD.encode(key))
}

/// Recomputes the digest and compares it to the stored one.
///
/// The comparison is over derived digests, not over the secret itself;
/// the PBKDF2 work factor dominates timing.
pub fn validate_password(password: &str, digest_b64: &str, salt_b64: &str) -> Result<bool> {
    Ok(hash_password(password, salt_b64)? == digest_b64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tokens;

    #[test]
    fn test_hash_round_trip() {
        let salt = tokens::random_salt();
        let digest = hash_password("pw12345", &salt).unwrap();

        assert!(validate_password("pw12345", &digest, &salt).unwrap());
        assert!(!validate_password("pw12346", &digest, &salt).unwrap());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let salt = tokens::random_salt();
        let a = hash_password("secret", &salt).unwrap();
        let b = hash_password("secret", &salt).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_salts_give_different_digests() {
        let a = hash_password("secret", &tokens::random_salt()).unwrap();
        let b = hash_password("secret", &tokens::random_salt()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_has_expected_encoded_length() {
        let salt = tokens::random_salt();
        let digest = hash_password("secret", &salt).unwrap();
        assert_eq!(digest.len(), tokens::encoded_length(KEY_LENGTH));
    }
}
