use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;

/// Decoded lengths of the random byte strings the backend hands out.
/// The base64-encoded forms are what gets stored and transmitted;
/// `encoded_length` gives the exact column width they need.
pub const SALT_LENGTH: usize = 128;
pub const SESSION_TOKEN_LENGTH: usize = 64;
pub const VERIFICATION_CODE_LENGTH: usize = 64;

fn random_base64(raw_len: usize) -> String {
    // OsRng, never a seeded RNG: these values gate authentication.
    let mut buf = vec![0u8; raw_len];
    OsRng.fill_bytes(&mut buf);
    STANDARD.encode(buf)
}

pub fn random_salt() -> String {
    random_base64(SALT_LENGTH)
}

pub fn random_session_token() -> String {
    random_base64(SESSION_TOKEN_LENGTH)
}

pub fn random_verification_code() -> String {
    random_base64(VERIFICATION_CODE_LENGTH)
}

/// Length of the base64 encoding of `raw_len` bytes, padding included.
pub const fn encoded_length(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_length() {
        assert_eq!(encoded_length(0), 0);
        assert_eq!(encoded_length(1), 4);
        assert_eq!(encoded_length(3), 4);
        assert_eq!(encoded_length(64), 88);
        assert_eq!(encoded_length(128), 172);
    }

    #[test]
    fn test_generated_values_have_fixed_length() {
        assert_eq!(random_salt().len(), encoded_length(SALT_LENGTH));
        assert_eq!(
            random_session_token().len(),
            encoded_length(SESSION_TOKEN_LENGTH)
        );
        assert_eq!(
            random_verification_code().len(),
            encoded_length(VERIFICATION_CODE_LENGTH)
        );
    }

    #[test]
    fn test_tokens_are_not_repeated() {
        // Two draws colliding would mean the RNG is broken.
        assert_ne!(random_session_token(), random_session_token());
    }
}
