//! The validation engine.
//!
//! [`CredentialsApiAuthProvider`] drives one authentication attempt as a
//! single forward pass: pre-validation hook, registry lookup, secret
//! matching, identity. No stage is retried; the first failure is the
//! outcome.
//!
//! # Security
//!
//! Every "identity does not check out" condition collapses into
//! [`AuthError::Unauthorized`]: an unknown auth-id, a disabled record and
//! a wrong secret are indistinguishable to the caller. The distinction
//! only exists in `tracing` output.

mod password;
mod subject_dn;

pub use password::{PasswordMatcherConfig, PasswordSecretsMatcher};
pub use subject_dn::SubjectDnSecretsMatcher;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use tessera_core::{CredentialsRecord, DeviceIdentity};

use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::handler::ExecutionContext;
use crate::hook::PreValidationHandler;
use crate::registry::{CredentialsClient, CredentialsLookupError};

/// Scheme-specific secret matching.
///
/// The associated type pins each matcher to its credential scheme, so a
/// password matcher can never be handed certificate credentials.
#[async_trait]
pub trait SecretsMatcher: Send + Sync {
    type Credentials: Credentials;

    /// Decide whether `credentials` prove the identity the `record`
    /// describes. Must only be called with an enabled, type-consistent
    /// record.
    async fn matches(
        &self,
        credentials: &Self::Credentials,
        record: &CredentialsRecord,
    ) -> Result<(), AuthError>;
}

/// The registry-backed authentication provider.
pub struct CredentialsApiAuthProvider<R, M> {
    registry: Arc<R>,
    matcher: M,
    hook: Option<Arc<dyn PreValidationHandler>>,
}

impl<R, M> CredentialsApiAuthProvider<R, M>
where
    R: CredentialsClient,
    M: SecretsMatcher,
{
    pub fn new(registry: Arc<R>, matcher: M) -> Self {
        Self {
            registry,
            matcher,
            hook: None,
        }
    }

    /// Install a pre-validation hook. Absent by default.
    pub fn with_pre_validation_handler(mut self, hook: Arc<dyn PreValidationHandler>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Authenticate one credential presentation.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthorized`] when the identity does not check out,
    ///   with no further distinction
    /// - [`AuthError::ServiceUnavailable`] when the registry cannot answer
    pub async fn authenticate(
        &self,
        credentials: M::Credentials,
        ctx: &dyn ExecutionContext,
    ) -> Result<DeviceIdentity, AuthError> {
        let span = tracing::info_span!(
            "authenticate_device",
            tenant_id = %credentials.tenant_id(),
            auth_id = credentials.auth_id(),
            credential_type = credentials.credential_type(),
        );
        self.authenticate_inner(credentials, ctx).instrument(span).await
    }

    async fn authenticate_inner(
        &self,
        credentials: M::Credentials,
        ctx: &dyn ExecutionContext,
    ) -> Result<DeviceIdentity, AuthError> {
        if let Some(hook) = &self.hook {
            hook.handle(&credentials.to_device_credentials(), ctx)
                .await
                .inspect_err(|e| {
                    tracing::debug!(error = %e, "pre-validation hook rejected attempt")
                })?;
        }

        let record = self.lookup(&credentials).await?;

        if !record.enabled {
            tracing::debug!("credentials on record are disabled");
            return Err(AuthError::Unauthorized);
        }
        if record.credential_type != credentials.credential_type()
            || record.auth_id != credentials.auth_id()
        {
            tracing::warn!(
                record_type = record.credential_type,
                record_auth_id = record.auth_id,
                "registry returned a record for a different claim"
            );
            return Err(AuthError::Unauthorized);
        }

        self.matcher
            .matches(&credentials, &record)
            .instrument(tracing::debug_span!("match_secrets"))
            .await?;

        let identity = DeviceIdentity::new(credentials.tenant_id().clone(), record.device_id);
        tracing::debug!(device_id = %identity.device_id, "device authenticated");
        Ok(identity)
    }

    async fn lookup(&self, credentials: &M::Credentials) -> Result<CredentialsRecord, AuthError> {
        self.registry
            .get_credentials(
                credentials.tenant_id(),
                credentials.credential_type(),
                credentials.auth_id(),
                credentials.client_context(),
            )
            .instrument(tracing::debug_span!("credentials_lookup"))
            .await
            .map_err(|e| match e {
                CredentialsLookupError::NotFound => {
                    tracing::debug!("no credentials on record");
                    AuthError::Unauthorized
                }
                CredentialsLookupError::Unavailable(reason) => {
                    tracing::warn!(reason, "credentials registry unavailable");
                    AuthError::ServiceUnavailable
                }
            })
    }
}
