use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// One-way password encoding used when users are created.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> Result<String, ServiceError>;
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// Argon2id with the crate defaults and a fresh random salt per hash.
#[derive(Clone, Default)]
pub struct Argon2Encoder {
    argon: Argon2<'static>,
}

impl Argon2Encoder {
    pub fn new() -> Self { Self::default() }
}

impl PasswordEncoder for Argon2Encoder {
    fn encode(&self, raw: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        match PasswordHash::new(encoded) {
            Ok(parsed) => self.argon.verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_to_phc_string_and_verifies() {
        let enc = Argon2Encoder::new();
        let hash = enc.encode("pw123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, "pw123");
        assert!(enc.matches("pw123", &hash));
        assert!(!enc.matches("pw124", &hash));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let enc = Argon2Encoder::new();
        assert_ne!(enc.encode("secret").unwrap(), enc.encode("secret").unwrap());
    }

    #[test]
    fn garbage_hash_never_matches() {
        assert!(!Argon2Encoder::new().matches("pw", "not-a-hash"));
    }
}
