//! SHA-256 password hasher

use sha2::{Digest, Sha256};

use crate::application::ports::PasswordHasherPort;

/// `hex(sha256(password || salt))`, where `salt` is stored hex encoded.
///
/// A salt that is not valid hex is mixed in as its raw UTF-8 bytes, so
/// hand-provisioned records still verify.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256PasswordHasher;

impl PasswordHasherPort for Sha256PasswordHasher {
    fn hash(&self, password: &str, salt: &str) -> String {
        let salt_bytes = hex::decode(salt).unwrap_or_else(|_| salt.as_bytes().to_vec());

        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(&salt_bytes);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // sha256("abc") with an empty salt
        assert_eq!(
            Sha256PasswordHasher.hash("abc", ""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_salt_is_decoded_from_hex() {
        // "6263" decodes to "bc", so the input is "abc"
        assert_eq!(
            Sha256PasswordHasher.hash("a", "6263"),
            Sha256PasswordHasher.hash("abc", "")
        );
    }

    #[test]
    fn test_salt_changes_digest() {
        let h = Sha256PasswordHasher;
        assert_ne!(h.hash("hunter2", "00"), h.hash("hunter2", "01"));
        assert!(h.verify("hunter2", "00", &h.hash("hunter2", "00")));
        assert!(!h.verify("hunter3", "00", &h.hash("hunter2", "00")));
    }
}
