//! Transport extraction handlers.
//!
//! One handler per credential scheme. A handler owns the full attempt:
//! it shapes raw transport material into credentials, then drives the
//! validation engine. Transport adapters only implement
//! [`ExecutionContext`] and pick the handler for the scheme their
//! session presented.

mod basic;
mod x509;

pub use basic::BasicAuthHandler;
pub use x509::X509AuthHandler;

use async_trait::async_trait;

use tessera_core::DeviceIdentity;

use crate::error::AuthError;

/// The transport adapter's view of one inbound request or session.
///
/// Adapters expose whatever proof material the transport carried;
/// handlers read only what their scheme needs.
pub trait ExecutionContext: Send + Sync {
    /// The raw `Authorization` header value, if the transport carries one.
    fn authorization_header(&self) -> Option<&str>;

    /// The peer's DER certificate chain, leaf first, as presented during
    /// the TLS handshake. `None` when the session is not TLS or the peer
    /// sent no certificate.
    fn client_certificate_chain(&self) -> Option<&[Vec<u8>]>;

    /// The SNI host names of the TLS session, empty when not applicable.
    fn sni_host_names(&self) -> &[String];
}

/// One asynchronous authentication entry point per scheme.
#[async_trait]
pub trait AuthHandler<C: ExecutionContext>: Send + Sync {
    /// Authenticate the device behind `ctx`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedRequest`] when the transport material
    ///   cannot be shaped into a credential
    /// - [`AuthError::Unauthorized`] when it can, but does not check out
    /// - [`AuthError::ServiceUnavailable`] when a collaborator is down
    async fn authenticate(&self, ctx: &C) -> Result<DeviceIdentity, AuthError>;
}
