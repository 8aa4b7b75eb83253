//! The seam to the remote credentials registry.
//!
//! The pipeline never talks to the registry directly; it goes through
//! [`CredentialsClient`], so deployments can back it with whatever
//! transport they have (gRPC, AMQP, an in-process cache) and tests can
//! substitute fakes.

use async_trait::async_trait;
use tessera_core::{ClientContext, CredentialsRecord, TenantId};

/// Why a registry lookup did not produce a usable record.
///
/// `NotFound` covers every "no usable record" case: unknown auth-id,
/// disabled record, disabled tenant. Callers translate it to the same
/// failure as a wrong secret, so a registry answer never reveals whether
/// an identity exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CredentialsLookupError {
    /// No enabled record for this type/auth-id in this tenant.
    #[error("no usable credentials on record")]
    NotFound,
    /// The registry could not be reached or answered malformed.
    #[error("credentials registry unavailable: {0}")]
    Unavailable(String),
}

/// A client for the credentials registry.
///
/// Implementations are expected to return [`CredentialsLookupError::NotFound`]
/// rather than an empty record when nothing usable is on file.
#[async_trait]
pub trait CredentialsClient: Send + Sync {
    /// Look up the credentials on record for `auth_id` of the given type
    /// within `tenant_id`.
    ///
    /// `client_context` carries scheme-specific attributes that a registry
    /// may use to narrow the lookup (for instance, properties extracted
    /// from a client certificate).
    async fn get_credentials(
        &self,
        tenant_id: &TenantId,
        credential_type: &str,
        auth_id: &str,
        client_context: &ClientContext,
    ) -> Result<CredentialsRecord, CredentialsLookupError>;
}
