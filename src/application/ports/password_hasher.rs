//! Password Hasher Port
//!
//! `hash(password, salt) -> digest`, injectable so the hashing scheme stays
//! outside the ledger core.

pub trait PasswordHasherPort: Send + Sync {
    /// Returns the hex digest for `password` salted with the hex-encoded `salt`.
    fn hash(&self, password: &str, salt: &str) -> String;

    /// Compares a candidate password against a stored digest.
    fn verify(&self, password: &str, salt: &str, digest: &str) -> bool {
        constant_time_eq(self.hash(password, salt).as_bytes(), digest.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reverse;

    impl PasswordHasherPort for Reverse {
        fn hash(&self, password: &str, salt: &str) -> String {
            format!("{}{}", salt, password.chars().rev().collect::<String>())
        }
    }

    #[test]
    fn test_verify_uses_hash() {
        assert!(Reverse.verify("abc", "s", "scba"));
        assert!(!Reverse.verify("abc", "s", "scbx"));
        assert!(!Reverse.verify("abc", "s", "scb"));
    }
}
