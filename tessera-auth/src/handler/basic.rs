//! HTTP Basic credential extraction.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use async_trait::async_trait;

use tessera_core::{ClientContext, DeviceIdentity};

use crate::credentials::UsernamePasswordCredentials;
use crate::error::AuthError;
use crate::handler::{AuthHandler, ExecutionContext};
use crate::provider::{CredentialsApiAuthProvider, PasswordSecretsMatcher};
use crate::registry::CredentialsClient;

/// Extracts `Authorization: Basic <base64>` credentials and drives the
/// password pipeline with them.
///
/// The decoded payload is split on the first `:`; a payload without a
/// `:` means an empty password, not a malformed request. When the
/// password part is empty the username is additionally tried as base64
/// of `user:pass` — some devices tunnel their whole credential through
/// the username field.
pub struct BasicAuthHandler<R> {
    provider: CredentialsApiAuthProvider<R, PasswordSecretsMatcher>,
}

impl<R: CredentialsClient> BasicAuthHandler<R> {
    pub fn new(provider: CredentialsApiAuthProvider<R, PasswordSecretsMatcher>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R, C> AuthHandler<C> for BasicAuthHandler<R>
where
    R: CredentialsClient,
    C: ExecutionContext,
{
    async fn authenticate(&self, ctx: &C) -> Result<DeviceIdentity, AuthError> {
        let Some(header) = ctx.authorization_header() else {
            tracing::debug!("request carries no authorization header");
            return Err(AuthError::MalformedRequest);
        };
        let (username, password) = parse_basic(header)?;
        let credentials =
            UsernamePasswordCredentials::create(&username, password, ClientContext::new())
                .ok_or_else(|| {
                    tracing::debug!("username does not identify a tenant");
                    AuthError::MalformedRequest
                })?;
        self.provider.authenticate(credentials, ctx).await
    }
}

/// Decode a `Basic` header value into `(username, password)`.
fn parse_basic(header: &str) -> Result<(String, String), AuthError> {
    let payload = match header.split_once(' ') {
        Some((scheme, payload)) if scheme.eq_ignore_ascii_case("basic") => payload.trim(),
        _ => {
            tracing::debug!("authorization header does not use the Basic scheme");
            return Err(AuthError::MalformedRequest);
        }
    };
    let decoded = BASE64.decode(payload).map_err(|_| {
        tracing::debug!("authorization payload is not valid base64");
        AuthError::MalformedRequest
    })?;
    let decoded = String::from_utf8(decoded).map_err(|_| {
        tracing::debug!("authorization payload is not valid UTF-8");
        AuthError::MalformedRequest
    })?;
    let (username, password) = match decoded.split_once(':') {
        Some((u, p)) => (u.to_string(), p.to_string()),
        None => (decoded, String::new()),
    };
    if password.is_empty() {
        if let Some(embedded) = credentials_encoded_in_username(&username) {
            return Ok(embedded);
        }
    }
    Ok((username, password))
}

/// An empty password may mean the username itself is base64 of
/// `user:pass`. Returns the embedded pair when it is.
fn credentials_encoded_in_username(username: &str) -> Option<(String, String)> {
    let decoded = BASE64.decode(username).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    if user.is_empty() || pass.is_empty() {
        return None;
    }
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Sha256PasswordEncoder;
    use crate::provider::PasswordMatcherConfig;
    use crate::registry::CredentialsLookupError;
    use std::sync::Arc;
    use tessera_core::{
        credential_type, hash_function, CredentialsRecord, DeviceId, Secret, TenantId,
    };

    struct BasicOnly(Option<String>);

    impl ExecutionContext for BasicOnly {
        fn authorization_header(&self) -> Option<&str> {
            self.0.as_deref()
        }
        fn client_certificate_chain(&self) -> Option<&[Vec<u8>]> {
            None
        }
        fn sni_host_names(&self) -> &[String] {
            &[]
        }
    }

    fn header(user_pass: &str) -> BasicOnly {
        BasicOnly(Some(format!("Basic {}", BASE64.encode(user_pass))))
    }

    struct FixedRegistry(Result<CredentialsRecord, CredentialsLookupError>);

    #[async_trait]
    impl CredentialsClient for FixedRegistry {
        async fn get_credentials(
            &self,
            _tenant_id: &TenantId,
            _credential_type: &str,
            _auth_id: &str,
            _client_context: &ClientContext,
        ) -> Result<CredentialsRecord, CredentialsLookupError> {
            self.0.clone()
        }
    }

    fn handler(auth_id: &str, password: &str) -> BasicAuthHandler<FixedRegistry> {
        let record = CredentialsRecord::new(
            DeviceId::new("device-4711"),
            auth_id,
            credential_type::HASHED_PASSWORD,
        )
        .with_secret(Secret::hashed_password(
            hash_function::SHA256,
            Sha256PasswordEncoder::encode(password, None),
            None,
        ));
        BasicAuthHandler::new(CredentialsApiAuthProvider::new(
            Arc::new(FixedRegistry(Ok(record))),
            PasswordSecretsMatcher::new(
                Arc::new(Sha256PasswordEncoder),
                PasswordMatcherConfig::default(),
            ),
        ))
    }

    #[tokio::test]
    async fn well_formed_basic_credentials_authenticate() {
        let identity = handler("dev1", "secret")
            .authenticate(&header("dev1@tenantA:secret"))
            .await
            .unwrap();
        assert_eq!(identity.tenant_id.as_str(), "tenantA");
        assert_eq!(identity.device_id.as_str(), "device-4711");
    }

    #[tokio::test]
    async fn absent_header_is_malformed() {
        let err = handler("dev1", "secret")
            .authenticate(&BasicOnly(None))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MalformedRequest);
    }

    #[tokio::test]
    async fn non_basic_scheme_is_malformed() {
        let err = handler("dev1", "secret")
            .authenticate(&BasicOnly(Some("Bearer abc123".into())))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MalformedRequest);
    }

    #[tokio::test]
    async fn undecodable_base64_is_malformed() {
        let err = handler("dev1", "secret")
            .authenticate(&BasicOnly(Some("Basic not-base64!!".into())))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MalformedRequest);
    }

    #[tokio::test]
    async fn non_utf8_payload_is_malformed() {
        let err = handler("dev1", "secret")
            .authenticate(&BasicOnly(Some(format!(
                "Basic {}",
                BASE64.encode([0xff, 0xfe, 0x3a, 0xff])
            ))))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MalformedRequest);
    }

    #[tokio::test]
    async fn username_without_tenant_is_malformed() {
        let err = handler("dev1", "secret")
            .authenticate(&header("dev1:secret"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MalformedRequest);
    }

    #[tokio::test]
    async fn missing_colon_means_empty_password() {
        let identity = handler("dev1", "")
            .authenticate(&header("dev1@tenantA"))
            .await
            .unwrap();
        assert_eq!(identity.device_id.as_str(), "device-4711");
    }

    #[tokio::test]
    async fn credentials_tunneled_through_the_username_are_unwrapped() {
        let embedded = BASE64.encode("dev1@tenantA:secret");
        let identity = handler("dev1", "secret")
            .authenticate(&header(&format!("{embedded}:")))
            .await
            .unwrap();
        assert_eq!(identity.device_id.as_str(), "device-4711");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let err = handler("dev1", "secret")
            .authenticate(&header("dev1@tenantA:wrong"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthorized);
    }
}
