//! Subject-DN secret matching.
//!
//! Certificate credentials carry no secondary secret: the TLS layer has
//! already proven possession of the private key, and path validation has
//! already tied the certificate to the tenant's trust anchors. An enabled
//! record for the subject DN is therefore the entire proof.

use async_trait::async_trait;

use tessera_core::CredentialsRecord;

use crate::credentials::SubjectDnCredentials;
use crate::error::AuthError;
use crate::provider::SecretsMatcher;

/// Accepts any enabled record; see the module docs for why.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubjectDnSecretsMatcher;

#[async_trait]
impl SecretsMatcher for SubjectDnSecretsMatcher {
    type Credentials = SubjectDnCredentials;

    async fn matches(
        &self,
        _credentials: &Self::Credentials,
        _record: &CredentialsRecord,
    ) -> Result<(), AuthError> {
        Ok(())
    }
}
