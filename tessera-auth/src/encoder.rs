//! Password hash verification.
//!
//! Records store `base64(hash(salt || password))` together with the hash
//! function name and the base64-encoded salt. Verification recomputes the
//! digest from the presented password and compares in constant time.
//!
//! # Security
//!
//! The comparison uses [`subtle::ConstantTimeEq`] so a mismatch takes the
//! same time regardless of where the digests diverge. Unknown hash
//! functions never match; they do not error, so a record with a bogus
//! hash function is indistinguishable from a wrong password.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tessera_core::hash_function;

/// Verifies a clear-text password against a stored hash.
pub trait PasswordEncoder: Send + Sync {
    /// Whether `password` produces `pwd_hash` under `hash_function` and
    /// `salt`.
    fn matches(
        &self,
        password: &str,
        hash_function: &str,
        pwd_hash: &str,
        salt: Option<&str>,
    ) -> bool;
}

/// The default encoder: salted SHA-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256PasswordEncoder;

impl Sha256PasswordEncoder {
    /// Encode a password for storage, returning the base64 digest.
    ///
    /// Mostly useful for provisioning tooling and tests.
    pub fn encode(password: &str, salt: Option<&[u8]>) -> String {
        let mut hasher = Sha256::new();
        if let Some(salt) = salt {
            hasher.update(salt);
        }
        hasher.update(password.as_bytes());
        BASE64.encode(hasher.finalize())
    }
}

impl PasswordEncoder for Sha256PasswordEncoder {
    fn matches(
        &self,
        password: &str,
        hash_function: &str,
        pwd_hash: &str,
        salt: Option<&str>,
    ) -> bool {
        if hash_function != hash_function::SHA256 {
            tracing::warn!(hash_function, "unsupported password hash function");
            return false;
        }
        let Ok(expected) = BASE64.decode(pwd_hash) else {
            tracing::warn!("stored password hash is not valid base64");
            return false;
        };
        let salt_bytes = match salt {
            Some(s) => match BASE64.decode(s) {
                Ok(bytes) => Some(bytes),
                Err(_) => {
                    tracing::warn!("stored password salt is not valid base64");
                    return false;
                }
            },
            None => None,
        };
        let mut hasher = Sha256::new();
        if let Some(salt) = &salt_bytes {
            hasher.update(salt);
        }
        hasher.update(password.as_bytes());
        let actual = hasher.finalize();
        actual.as_slice().ct_eq(&expected).into()
    }
}
