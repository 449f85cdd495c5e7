//! Salted password hashing for patient and ophthalmologist logins.
//!
//! Credentials are stored as `pbkdf2-sha256$<iterations>$<salt>$<hash>` with
//! base64 salt and hash, so the iteration count can change without
//! invalidating existing accounts.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Hashes and verifies login secrets
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Iteration count for newly hashed secrets unless configured otherwise
    pub const DEFAULT_ITERATIONS: u32 = 600_000;

    /// Create a hasher that derives new credentials with `iterations` rounds
    #[must_use]
    pub const fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Iteration count used for new credentials
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash `secret` under a fresh random salt
    #[must_use]
    pub fn hash(&self, secret: &str) -> String {
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        self.hash_with_salt(secret, &salt)
    }

    fn hash_with_salt(&self, secret: &str, salt: &[u8]) -> String {
        let digest = derive(secret, salt, self.iterations);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(digest)
        )
    }

    /// Check `secret` against a stored credential.
    ///
    /// Malformed credentials never verify.
    #[must_use]
    pub fn verify(&self, secret: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        if scheme != SCHEME {
            return false;
        }

        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(expected)) else {
            return false;
        };

        let actual = derive(secret, &salt, iterations);
        actual.as_slice().ct_eq(expected.as_slice()).into()
    }
}

fn derive(secret: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: PasswordHasher = PasswordHasher::new(1_000);

    #[test]
    fn hash_verifies_same_secret() {
        let stored = FAST.hash("4321");
        assert!(FAST.verify("4321", &stored));
        assert!(!FAST.verify("4322", &stored));
    }

    #[test]
    fn stored_form_hides_the_secret() {
        let stored = FAST.hash("987654");
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(!stored.contains("987654"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(FAST.hash("1111"), FAST.hash("1111"));
    }

    #[test]
    fn deterministic_for_fixed_salt() {
        let salt = [7u8; SALT_LENGTH];
        assert_eq!(FAST.hash_with_salt("55", &salt), FAST.hash_with_salt("55", &salt));
    }

    #[test]
    fn verify_uses_stored_iteration_count() {
        let stored = PasswordHasher::new(500).hash("2468");
        assert!(FAST.verify("2468", &stored));
    }

    #[test]
    fn malformed_credentials_never_verify() {
        assert!(!FAST.verify("1", ""));
        assert!(!FAST.verify("1", "plain"));
        assert!(!FAST.verify("1", "md5$1$abc$def"));
        assert!(!FAST.verify("1", "pbkdf2-sha256$x$abc$def"));
        assert!(!FAST.verify("1", "pbkdf2-sha256$10$!!$def"));
    }
}
