//! The open client-context mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scheme-specific extra attributes accompanying a credential lookup.
///
/// The set of keys is intentionally open: a certificate-based extraction
/// handler may record SNI host names, an HTTP adapter may record arbitrary
/// request properties. The registry can use them to narrow a lookup; the
/// pipeline itself never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientContext(Map<String, Value>);

impl ClientContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for ClientContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
