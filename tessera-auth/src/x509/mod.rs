//! Client certificate handling.
//!
//! Two layers live here. [`chain`] is pure certificate mechanics: parsing
//! and path validation against a set of trust anchors. [`authentication`]
//! is the tenant-aware step on top: resolve the issuer DN to a tenant,
//! validate the chain against that tenant's anchors, and derive
//! credentials from the leaf's subject DN.

pub mod authentication;
pub mod chain;

pub use authentication::{
    TenantAwareX509Authentication, TenantClient, TenantLookupError, TenantTrustBundle,
    X509Authentication,
};
pub use chain::{
    CertificateChainValidator, ChainValidationError, TrustAnchor, ValidatedLeaf,
    X509CertificateChainValidator, MAX_CERT_SIZE,
};
