//! Device credential authentication for multi-tenant IoT gateways.
//!
//! This crate turns transport-level proof-of-identity material into a
//! verified [`DeviceIdentity`](tessera_core::DeviceIdentity), or a typed
//! failure. It is intentionally free of I/O of its own:
//! - No network calls
//! - No filesystem operations
//! - No TLS handshake mechanics
//!
//! External collaborators are injected via traits:
//! - [`registry::CredentialsClient`] - the remote credentials registry
//! - [`x509::TenantClient`] - the tenant directory (trust anchors)
//! - [`encoder::PasswordEncoder`] - password hash verification
//! - [`hook::PreValidationHandler`] - optional pre-validation interception
//! - [`handler::ExecutionContext`] - the transport adapter's request view
//!
//! # Pipeline
//!
//! ```text
//! transport request
//!   -> extraction handler (Basic auth / client certificate)
//!   -> pre-validation hook (optional short-circuit)
//!   -> registry lookup
//!   -> scheme-specific secret matching
//!   -> DeviceIdentity
//! ```
//!
//! Each attempt is a single forward pass; no stage is retried internally.
//! CPU-bound work (password hash checks, certificate path validation) runs
//! on the blocking pool behind a bounded semaphore so the async dispatch
//! threads are never blocked.

pub mod credentials;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod hook;
pub mod provider;
pub mod registry;
pub mod x509;

pub use credentials::{
    Credentials, DeviceCredentials, Password, SubjectDnCredentials, UsernamePasswordCredentials,
};
pub use error::AuthError;
pub use handler::{AuthHandler, BasicAuthHandler, ExecutionContext, X509AuthHandler};
pub use hook::PreValidationHandler;
pub use provider::{
    CredentialsApiAuthProvider, PasswordMatcherConfig, PasswordSecretsMatcher, SecretsMatcher,
    SubjectDnSecretsMatcher,
};
pub use registry::{CredentialsClient, CredentialsLookupError};
