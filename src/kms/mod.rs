//! KMS backend capability and registry.

pub mod aws;

use crate::error::KeyProviderError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub use aws::AwsKms;

/// A remote key-management backend: authenticated encrypt/decrypt of
/// short key material under a named master key. Implementations own
/// their connection handling; this service adds no retry or pooling.
#[async_trait]
pub trait KmsProvider: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8], key_id: &str) -> Result<Vec<u8>, KeyProviderError>;

    async fn decrypt(&self, ciphertext: &[u8], key_id: &str) -> Result<Vec<u8>, KeyProviderError>;
}

/// Explicit backend registry, built once at startup and read-only
/// afterwards. Passed into the service by value instead of living in
/// global state, so backend availability is decided before the first
/// request is accepted.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn KmsProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same name twice overwrites the earlier entry.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn KmsProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn KmsProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
