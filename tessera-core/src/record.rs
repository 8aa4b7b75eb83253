//! The credentials registry's record model.
//!
//! A [`CredentialsRecord`] is the registry's answer for one
//! `(tenant, type, auth-id)` claim: the resolved device identifier plus an
//! ordered list of candidate [`Secret`]s. The pipeline only ever reads
//! records; it never writes them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DeviceId;

/// Well-known credential type identifiers.
pub mod credential_type {
    /// Username/password credentials, verified against stored hashes.
    pub const HASHED_PASSWORD: &str = "hashed-password";
    /// X.509 client certificate credentials, keyed by subject DN.
    pub const X509_CERT: &str = "x509-cert";
}

/// Well-known password hash function identifiers.
pub mod hash_function {
    pub const SHA256: &str = "sha-256";
    pub const BCRYPT: &str = "bcrypt";
}

/// Credentials on record for a single identity claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsRecord {
    /// The device the auth-id resolves to.
    pub device_id: DeviceId,
    /// The authentication identifier this record answers for.
    pub auth_id: String,
    /// The credential type this record answers for.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Disabled records must never authenticate a device.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Candidate secrets, in registry-defined order.
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

impl CredentialsRecord {
    pub fn new(
        device_id: DeviceId,
        auth_id: impl Into<String>,
        credential_type: impl Into<String>,
    ) -> Self {
        Self {
            device_id,
            auth_id: auth_id.into(),
            credential_type: credential_type.into(),
            enabled: true,
            secrets: Vec::new(),
        }
    }

    /// Builder-style secret registration.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secrets.push(secret);
        self
    }

    /// The secrets eligible for matching at `now`: enabled, and inside
    /// their validity window if one is set.
    ///
    /// Order is preserved from the registry but carries no semantic
    /// meaning; matching is any-of.
    pub fn candidate_secrets(&self, now: DateTime<Utc>) -> Vec<&Secret> {
        self.secrets
            .iter()
            .filter(|s| s.is_valid_at(now))
            .collect()
    }
}

/// One candidate proof-of-identity value stored by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Earliest instant this secret may be used, if bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,
    /// Latest instant this secret may be used, if bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<DateTime<Utc>>,
    /// Scheme-specific comparison material.
    pub detail: SecretDetail,
}

impl Secret {
    /// A hashed-password secret with no validity bounds.
    pub fn hashed_password(
        hash_fn: impl Into<String>,
        pwd_hash: impl Into<String>,
        salt: Option<String>,
    ) -> Self {
        Self {
            enabled: true,
            not_before: None,
            not_after: None,
            detail: SecretDetail::HashedPassword {
                hash_function: hash_fn.into(),
                pwd_hash: pwd_hash.into(),
                salt,
            },
        }
    }

    /// An X.509 secret: carries no comparable material, its presence on an
    /// enabled record is the proof.
    pub fn x509() -> Self {
        Self {
            enabled: true,
            not_before: None,
            not_after: None,
            detail: SecretDetail::X509,
        }
    }

    pub fn with_validity(
        mut self,
        not_before: Option<DateTime<Utc>>,
        not_after: Option<DateTime<Utc>>,
    ) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this secret may be used for matching at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(nb) = self.not_before {
            if now < nb {
                return false;
            }
        }
        if let Some(na) = self.not_after {
            if now > na {
                return false;
            }
        }
        true
    }
}

/// Scheme-specific part of a [`Secret`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretDetail {
    HashedPassword {
        /// Identifier of the hash function, e.g. [`hash_function::SHA256`].
        hash_function: String,
        /// Base64-encoded hash value.
        pwd_hash: String,
        /// Base64-encoded salt, if the hash function uses one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        salt: Option<String>,
    },
    X509,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_with(secrets: Vec<Secret>) -> CredentialsRecord {
        let mut record =
            CredentialsRecord::new(DeviceId::new("d1"), "auth-1", credential_type::HASHED_PASSWORD);
        record.secrets = secrets;
        record
    }

    #[test]
    fn candidate_secrets_keeps_unbounded_enabled_secrets() {
        let record = record_with(vec![Secret::hashed_password(
            hash_function::SHA256,
            "hash",
            None,
        )]);
        assert_eq!(record.candidate_secrets(Utc::now()).len(), 1);
    }

    #[test]
    fn candidate_secrets_skips_disabled() {
        let record = record_with(vec![
            Secret::hashed_password(hash_function::SHA256, "a", None).disabled(),
            Secret::hashed_password(hash_function::SHA256, "b", None),
        ]);
        let candidates = record.candidate_secrets(Utc::now());
        assert_eq!(candidates.len(), 1);
        assert!(
            matches!(&candidates[0].detail, SecretDetail::HashedPassword { pwd_hash, .. } if pwd_hash == "b")
        );
    }

    #[test]
    fn candidate_secrets_respects_validity_window() {
        let now = Utc::now();
        let expired = Secret::hashed_password(hash_function::SHA256, "old", None)
            .with_validity(None, Some(now - Duration::hours(1)));
        let not_yet = Secret::hashed_password(hash_function::SHA256, "future", None)
            .with_validity(Some(now + Duration::hours(1)), None);
        let current = Secret::hashed_password(hash_function::SHA256, "current", None)
            .with_validity(Some(now - Duration::hours(1)), Some(now + Duration::hours(1)));

        let record = record_with(vec![expired, not_yet, current]);
        let candidates = record.candidate_secrets(now);
        assert_eq!(candidates.len(), 1);
        assert!(
            matches!(&candidates[0].detail, SecretDetail::HashedPassword { pwd_hash, .. } if pwd_hash == "current")
        );
    }

    #[test]
    fn record_roundtrip() {
        let record = record_with(vec![Secret::hashed_password(
            hash_function::SHA256,
            "AAAA",
            Some("c2FsdA==".to_string()),
        )]);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: CredentialsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn enabled_defaults_to_true_when_absent() {
        let parsed: CredentialsRecord = serde_json::from_str(
            r#"{"device_id":"d1","auth_id":"a","type":"hashed-password"}"#,
        )
        .unwrap();
        assert!(parsed.enabled);
        assert!(parsed.secrets.is_empty());
    }
}
