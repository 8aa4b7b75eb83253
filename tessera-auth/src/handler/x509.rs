//! TLS client certificate extraction.

use std::sync::Arc;

use async_trait::async_trait;

use tessera_core::DeviceIdentity;

use crate::error::AuthError;
use crate::handler::{AuthHandler, ExecutionContext};
use crate::provider::{CredentialsApiAuthProvider, SubjectDnSecretsMatcher};
use crate::registry::CredentialsClient;
use crate::x509::X509Authentication;

/// Authenticates the peer of a TLS session by its client certificate.
///
/// The handler only sequences: chain off the session, tenant-aware
/// validation, then the registry pipeline. A session without a peer
/// certificate fails the same way everything the certificate layer
/// rejects does: a bare `Unauthorized`, no detail leaked about why.
pub struct X509AuthHandler<R, A> {
    auth: Arc<A>,
    provider: CredentialsApiAuthProvider<R, SubjectDnSecretsMatcher>,
}

impl<R, A> X509AuthHandler<R, A>
where
    R: CredentialsClient,
    A: X509Authentication,
{
    pub fn new(
        auth: Arc<A>,
        provider: CredentialsApiAuthProvider<R, SubjectDnSecretsMatcher>,
    ) -> Self {
        Self { auth, provider }
    }
}

#[async_trait]
impl<R, A, C> AuthHandler<C> for X509AuthHandler<R, A>
where
    R: CredentialsClient,
    A: X509Authentication,
    C: ExecutionContext,
{
    async fn authenticate(&self, ctx: &C) -> Result<DeviceIdentity, AuthError> {
        let chain = match ctx.client_certificate_chain() {
            Some(chain) if !chain.is_empty() => chain,
            _ => {
                tracing::debug!("session carries no client certificate");
                return Err(AuthError::Unauthorized);
            }
        };
        let credentials = self
            .auth
            .validate_client_certificate(chain, ctx.sni_host_names())
            .await?;
        self.provider.authenticate(credentials, ctx).await
    }
}
