//! Authentication capability.
//!
//! The engine never sees credentials; it only learns that a login was
//! accepted. `Authenticator` is the seam, `SharedSecretAuthenticator`
//! compares against a single license key held as a secret.

use secrecy::{ExposeSecret, SecretString};

/// Verifies a presented credential.
pub trait Authenticator: Send + Sync {
    fn verify(&self, credential: &str) -> bool;
}

/// Accepts exactly one shared license key.
pub struct SharedSecretAuthenticator {
    secret: SecretString,
}

impl SharedSecretAuthenticator {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }
}

impl std::fmt::Debug for SharedSecretAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretAuthenticator").finish_non_exhaustive()
    }
}

impl Authenticator for SharedSecretAuthenticator {
    fn verify(&self, credential: &str) -> bool {
        let expected = self.secret.expose_secret().as_bytes();
        let given = credential.as_bytes();
        if expected.is_empty() || expected.len() != given.len() {
            return false;
        }
        // Compare every byte regardless of where the first mismatch is.
        expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
