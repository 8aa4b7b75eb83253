//! The caller-visible authentication outcome set.

/// Terminal failure of an authentication attempt.
///
/// This is the complete set of failure kinds a transport adapter can
/// observe. Everything richer (registry error detail, certificate parse
/// failures, which stage rejected the attempt) is reduced to one of these
/// three at the pipeline boundary and retained only in `tracing` output.
///
/// `Unauthorized` deliberately carries no reason: "unknown device",
/// "disabled tenant", "wrong secret" and "untrusted certificate chain"
/// are externally indistinguishable so that the endpoint cannot be used
/// to enumerate identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Transport material could not be decoded into a credential shape
    /// (bad base64, invalid UTF-8). Never retried; maps to a client
    /// error at the transport boundary.
    #[error("malformed request")]
    MalformedRequest,

    /// The credential was not accepted. Retrying with the same material
    /// will not succeed.
    #[error("unauthorized")]
    Unauthorized,

    /// The registry or supporting infrastructure could not be reached.
    /// May be retried by the caller; never proof the credential is wrong.
    #[error("service unavailable")]
    ServiceUnavailable,
}
