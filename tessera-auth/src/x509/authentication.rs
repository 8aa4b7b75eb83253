//! Tenant-aware client certificate authentication.
//!
//! The certificate itself never names the tenant. The end-entity
//! certificate's issuer DN is resolved to a tenant through the injected
//! [`TenantClient`]; that tenant's trust anchors are then the only roots
//! the chain may terminate at. Path validation is CPU-bound and runs on
//! the blocking pool behind a bounded semaphore.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use tessera_core::{ClientContext, TenantId};

use crate::credentials::SubjectDnCredentials;
use crate::error::AuthError;
use crate::x509::chain::{CertificateChainValidator, TrustAnchor, MAX_CERT_SIZE};

/// What the tenant directory knows about the tenant behind an issuer.
#[derive(Debug, Clone)]
pub struct TenantTrustBundle {
    pub tenant_id: TenantId,
    pub enabled: bool,
    pub trust_anchors: Vec<TrustAnchor>,
    /// Template for deriving the auth-id from the leaf's subject DN.
    /// `None` means the subject DN is used verbatim.
    pub auth_id_template: Option<String>,
}

/// Why the tenant directory did not produce a trust bundle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TenantLookupError {
    #[error("no tenant configured for this issuer")]
    NotFound,
    #[error("tenant directory unavailable: {0}")]
    Unavailable(String),
}

/// The seam to the tenant directory.
#[async_trait]
pub trait TenantClient: Send + Sync {
    /// Resolve the tenant that configured `issuer_dn` as a certificate
    /// authority for its devices.
    async fn tenant_of_issuer(&self, issuer_dn: &str)
        -> Result<TenantTrustBundle, TenantLookupError>;
}

/// Turns a TLS client certificate chain into credentials.
#[async_trait]
pub trait X509Authentication: Send + Sync {
    /// Validate `chain` (leaf first, DER) and derive the credentials the
    /// device presented with it. `sni_hosts` are the TLS SNI names of the
    /// session, carried into the credentials' client context.
    async fn validate_client_certificate(
        &self,
        chain: &[Vec<u8>],
        sni_hosts: &[String],
    ) -> Result<SubjectDnCredentials, AuthError>;
}

/// The standard [`X509Authentication`]: issuer DN -> tenant -> path
/// validation against that tenant's anchors -> subject-DN credentials.
pub struct TenantAwareX509Authentication<T, V> {
    tenants: Arc<T>,
    validator: Arc<V>,
    offload: Arc<Semaphore>,
}

impl<T, V> TenantAwareX509Authentication<T, V>
where
    T: TenantClient,
    V: CertificateChainValidator + 'static,
{
    /// `max_concurrent_validations` bounds how many path validations may
    /// occupy the blocking pool at once; further attempts queue.
    pub fn new(tenants: Arc<T>, validator: Arc<V>, max_concurrent_validations: usize) -> Self {
        Self {
            tenants,
            validator,
            offload: Arc::new(Semaphore::new(max_concurrent_validations)),
        }
    }
}

#[async_trait]
impl<T, V> X509Authentication for TenantAwareX509Authentication<T, V>
where
    T: TenantClient,
    V: CertificateChainValidator + 'static,
{
    async fn validate_client_certificate(
        &self,
        chain: &[Vec<u8>],
        sni_hosts: &[String],
    ) -> Result<SubjectDnCredentials, AuthError> {
        let Some(leaf_der) = chain.first() else {
            return Err(AuthError::Unauthorized);
        };
        if leaf_der.len() > MAX_CERT_SIZE {
            tracing::warn!(size = leaf_der.len(), "client certificate exceeds size limit");
            return Err(AuthError::Unauthorized);
        }
        let issuer_dn = match X509Certificate::from_der(leaf_der) {
            Ok((_, leaf)) => leaf.issuer().to_string(),
            Err(e) => {
                tracing::warn!(error = ?e, "client certificate could not be parsed");
                return Err(AuthError::Unauthorized);
            }
        };

        let bundle = match self.tenants.tenant_of_issuer(&issuer_dn).await {
            Ok(bundle) => bundle,
            Err(TenantLookupError::NotFound) => {
                tracing::debug!(issuer_dn, "no tenant for certificate issuer");
                return Err(AuthError::Unauthorized);
            }
            Err(TenantLookupError::Unavailable(reason)) => {
                tracing::warn!(reason, "tenant directory unavailable");
                return Err(AuthError::ServiceUnavailable);
            }
        };
        if !bundle.enabled {
            tracing::debug!(tenant_id = %bundle.tenant_id, "tenant is disabled");
            return Err(AuthError::Unauthorized);
        }

        let permit = self
            .offload
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AuthError::ServiceUnavailable)?;
        let validator = Arc::clone(&self.validator);
        let owned_chain = chain.to_vec();
        let anchors = bundle.trust_anchors.clone();
        let validated = tokio::task::spawn_blocking(move || {
            let result = validator.validate(&owned_chain, &anchors);
            drop(permit);
            result
        })
        .await
        .map_err(|_| AuthError::ServiceUnavailable)?
        .map_err(|e| {
            tracing::warn!(tenant_id = %bundle.tenant_id, error = %e, "certificate chain rejected");
            AuthError::Unauthorized
        })?;

        let mut context = ClientContext::new();
        if !sni_hosts.is_empty() {
            context.insert("host-names", serde_json::json!(sni_hosts));
        }

        SubjectDnCredentials::create(
            bundle.tenant_id,
            &validated.subject_dn,
            bundle.auth_id_template.as_deref(),
            context,
        )
        .ok_or_else(|| {
            tracing::debug!("auth-id template did not apply to subject DN");
            AuthError::Unauthorized
        })
    }
}
