//! Shared value types for the tessera device authentication pipeline.
//!
//! Everything in this crate is a plain, immutable value:
//!
//! - [`TenantId`], [`DeviceId`] - identifier newtypes
//! - [`DeviceIdentity`] - the output of a successful authentication attempt
//! - [`CredentialsRecord`] / [`Secret`] - the credentials registry's answer
//!   for an identity claim
//! - [`ClientContext`] - an open mapping of scheme-specific extra attributes
//!
//! No I/O, no async, no interior mutability. Values are constructed once
//! per authentication attempt and never mutated, which keeps the pipeline
//! safe to run concurrently across unrelated requests.

mod context;
mod identity;
mod record;

pub use context::ClientContext;
pub use identity::{DeviceId, DeviceIdentity, TenantId};
pub use record::{credential_type, hash_function, CredentialsRecord, Secret, SecretDetail};
