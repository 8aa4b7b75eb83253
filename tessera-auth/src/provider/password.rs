//! Password secret matching.
//!
//! Hash verification is CPU-bound, so it runs on the blocking pool. A
//! semaphore bounds how many verifications may occupy the pool at once;
//! at the bound, further attempts queue instead of failing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Semaphore;

use tessera_core::{CredentialsRecord, SecretDetail};

use crate::credentials::UsernamePasswordCredentials;
use crate::encoder::PasswordEncoder;
use crate::error::AuthError;
use crate::provider::SecretsMatcher;

/// Tuning knobs for the password matcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordMatcherConfig {
    /// How many hash verifications may run on the blocking pool at once.
    pub max_concurrent_verifications: usize,
}

impl Default for PasswordMatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_verifications: 8,
        }
    }
}

/// Matches a presented password against the hashed-password secrets on
/// record, first match wins.
pub struct PasswordSecretsMatcher {
    encoder: Arc<dyn PasswordEncoder>,
    offload: Arc<Semaphore>,
}

impl PasswordSecretsMatcher {
    pub fn new(encoder: Arc<dyn PasswordEncoder>, config: PasswordMatcherConfig) -> Self {
        Self {
            encoder,
            offload: Arc::new(Semaphore::new(config.max_concurrent_verifications)),
        }
    }
}

#[async_trait]
impl SecretsMatcher for PasswordSecretsMatcher {
    type Credentials = UsernamePasswordCredentials;

    async fn matches(
        &self,
        credentials: &Self::Credentials,
        record: &CredentialsRecord,
    ) -> Result<(), AuthError> {
        let candidates: Vec<(String, String, Option<String>)> = record
            .candidate_secrets(Utc::now())
            .into_iter()
            .filter_map(|secret| match &secret.detail {
                SecretDetail::HashedPassword {
                    hash_function,
                    pwd_hash,
                    salt,
                } => Some((hash_function.clone(), pwd_hash.clone(), salt.clone())),
                _ => None,
            })
            .collect();
        if candidates.is_empty() {
            tracing::debug!("no usable password secrets on record");
            return Err(AuthError::Unauthorized);
        }

        let permit = self
            .offload
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AuthError::ServiceUnavailable)?;
        let encoder = Arc::clone(&self.encoder);
        let password = credentials.password().clone();
        let matched = tokio::task::spawn_blocking(move || {
            let matched = candidates.iter().any(|(hash_fn, pwd_hash, salt)| {
                encoder.matches(password.as_str(), hash_fn, pwd_hash, salt.as_deref())
            });
            drop(permit);
            matched
        })
        .await
        .map_err(|_| AuthError::ServiceUnavailable)?;

        if matched {
            Ok(())
        } else {
            tracing::debug!("password does not match any candidate secret");
            Err(AuthError::Unauthorized)
        }
    }
}
