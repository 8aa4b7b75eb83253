//! The credential model: "who is trying to authenticate, and how".
//!
//! Construction is the only place structural well-formedness is checked.
//! The `create` factories return `Option` - malformed input yields no
//! credential at all, never a partially-populated one, so callers can
//! uniformly treat "bad input" as "authentication cannot proceed".

use tessera_core::{credential_type, ClientContext, TenantId};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A raw device password.
///
/// Wiped from memory on drop; `Debug` is redacted so the value can never
/// reach a log line by accident.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Common accessors over the concrete credential types.
///
/// The validation engine is generic over this, which keeps the
/// scheme-specific matching step type-safe: a password matcher can only
/// ever be handed password credentials.
pub trait Credentials: Send + Sync {
    /// The credential type identifier used for the registry lookup.
    fn credential_type(&self) -> &str;
    /// The identity the device claims.
    fn auth_id(&self) -> &str;
    /// The tenant the device claims to belong to.
    fn tenant_id(&self) -> &TenantId;
    /// Scheme-specific extra attributes for the lookup.
    fn client_context(&self) -> &ClientContext;
    /// This credential as the scheme-agnostic sum type, for collaborators
    /// (like pre-validation hooks) that handle all schemes uniformly.
    fn to_device_credentials(&self) -> DeviceCredentials;
}

/// Username/password credentials parsed from a `<authId>@<tenantId>`
/// username.
#[derive(Debug, Clone)]
pub struct UsernamePasswordCredentials {
    tenant_id: TenantId,
    auth_id: String,
    password: Password,
    client_context: ClientContext,
}

impl UsernamePasswordCredentials {
    /// Parse credentials from a username and password.
    ///
    /// The username is split around the first `@`: the part before it is
    /// the auth-id, the part after it the tenant. Returns `None` if there
    /// is no `@` or either part is empty.
    pub fn create(
        username: &str,
        password: impl Into<Password>,
        client_context: ClientContext,
    ) -> Option<Self> {
        let (auth_id, tenant_id) = username.split_once('@')?;
        if auth_id.is_empty() || tenant_id.is_empty() {
            tracing::trace!(
                username,
                "username does not match the <authId>@<tenantId> pattern"
            );
            return None;
        }
        Some(Self {
            tenant_id: TenantId::new(tenant_id),
            auth_id: auth_id.to_string(),
            password: password.into(),
            client_context,
        })
    }

    /// The password to verify against the secrets on record.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

impl Credentials for UsernamePasswordCredentials {
    fn credential_type(&self) -> &str {
        credential_type::HASHED_PASSWORD
    }

    fn auth_id(&self) -> &str {
        &self.auth_id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn client_context(&self) -> &ClientContext {
        &self.client_context
    }

    fn to_device_credentials(&self) -> DeviceCredentials {
        DeviceCredentials::UsernamePassword(self.clone())
    }
}

/// Credentials derived from a validated X.509 client certificate.
///
/// The auth-id is the certificate's subject DN, or the rendering of an
/// auth-id template when the tenant configures one. The tenant comes from
/// accompanying metadata (the extraction layer), never from the
/// certificate itself.
#[derive(Debug, Clone)]
pub struct SubjectDnCredentials {
    tenant_id: TenantId,
    auth_id: String,
    client_context: ClientContext,
}

impl SubjectDnCredentials {
    /// Build credentials for a subject DN in a tenant.
    ///
    /// When `auth_id_template` is given it is rendered with the
    /// `{{subject-dn}}` and `{{subject-cn}}` placeholders. Returns `None`
    /// if the tenant or subject DN is empty, or the template references a
    /// CN the DN does not carry.
    pub fn create(
        tenant_id: TenantId,
        subject_dn: &str,
        auth_id_template: Option<&str>,
        client_context: ClientContext,
    ) -> Option<Self> {
        if tenant_id.as_str().is_empty() || subject_dn.is_empty() {
            return None;
        }
        let auth_id = match auth_id_template {
            Some(template) => render_auth_id_template(template, subject_dn)?,
            None => subject_dn.to_string(),
        };
        Some(Self {
            tenant_id,
            auth_id,
            client_context,
        })
    }
}

impl Credentials for SubjectDnCredentials {
    fn credential_type(&self) -> &str {
        credential_type::X509_CERT
    }

    fn auth_id(&self) -> &str {
        &self.auth_id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn client_context(&self) -> &ClientContext {
        &self.client_context
    }

    fn to_device_credentials(&self) -> DeviceCredentials {
        DeviceCredentials::SubjectDn(self.clone())
    }
}

/// The closed set of credential schemes the pipeline understands.
#[derive(Debug, Clone)]
pub enum DeviceCredentials {
    UsernamePassword(UsernamePasswordCredentials),
    SubjectDn(SubjectDnCredentials),
}

impl Credentials for DeviceCredentials {
    fn credential_type(&self) -> &str {
        match self {
            Self::UsernamePassword(c) => c.credential_type(),
            Self::SubjectDn(c) => c.credential_type(),
        }
    }

    fn auth_id(&self) -> &str {
        match self {
            Self::UsernamePassword(c) => c.auth_id(),
            Self::SubjectDn(c) => c.auth_id(),
        }
    }

    fn tenant_id(&self) -> &TenantId {
        match self {
            Self::UsernamePassword(c) => c.tenant_id(),
            Self::SubjectDn(c) => c.tenant_id(),
        }
    }

    fn client_context(&self) -> &ClientContext {
        match self {
            Self::UsernamePassword(c) => c.client_context(),
            Self::SubjectDn(c) => c.client_context(),
        }
    }

    fn to_device_credentials(&self) -> DeviceCredentials {
        self.clone()
    }
}

/// Render an auth-id template against a subject DN.
///
/// Supported placeholders: `{{subject-dn}}` (the full DN) and
/// `{{subject-cn}}` (the DN's common name attribute). Returns `None` when
/// `{{subject-cn}}` is referenced but the DN has no CN attribute.
fn render_auth_id_template(template: &str, subject_dn: &str) -> Option<String> {
    let mut rendered = template.replace("{{subject-dn}}", subject_dn);
    if rendered.contains("{{subject-cn}}") {
        let cn = common_name_of(subject_dn)?;
        rendered = rendered.replace("{{subject-cn}}", cn);
    }
    Some(rendered)
}

/// The value of the first `CN=` attribute in an RFC 2253 style DN.
fn common_name_of(subject_dn: &str) -> Option<&str> {
    subject_dn
        .split(',')
        .map(str::trim)
        .find_map(|attr| attr.strip_prefix("CN="))
}
