//! One-time verification codes.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Entropy per code.
pub const CODE_BYTES: usize = 16;

/// Generate a fresh code from the OS CSPRNG.
///
/// 16 random bytes in the padded URL-safe base64 alphabet (24 characters).
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_url_safe(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<String> = (0..10_000).map(|_| generate_code()).collect();
        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn test_codes_are_url_safe() {
        for _ in 0..1_000 {
            let code = generate_code();
            assert_eq!(code.len(), 24);
            assert!(code.chars().all(is_url_safe), "unexpected character in {}", code);
            assert!(code.ends_with("=="));
        }
    }
}
