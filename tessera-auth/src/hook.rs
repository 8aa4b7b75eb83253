//! Pre-validation interception.
//!
//! A hook runs after credential extraction and before the registry
//! lookup. Deployments use it for cross-cutting gates such as rejecting
//! unknown tenants, connection-rate limiting or tenant-level lockout; a
//! failing hook aborts the attempt before any network round trip is
//! paid. The hook sees only the presented credentials and the transport
//! context, never the secrets on record, so it cannot take part in the
//! secret comparison.

use async_trait::async_trait;

use crate::credentials::DeviceCredentials;
use crate::error::AuthError;
use crate::handler::ExecutionContext;

/// A gate that can veto an authentication attempt before the registry
/// lookup.
///
/// Invoked exactly once per attempt. Returning an error aborts the
/// attempt with that error.
#[async_trait]
pub trait PreValidationHandler: Send + Sync {
    async fn handle(
        &self,
        credentials: &DeviceCredentials,
        ctx: &dyn ExecutionContext,
    ) -> Result<(), AuthError>;
}
