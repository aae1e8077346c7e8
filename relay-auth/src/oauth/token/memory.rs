//! In-memory token storage.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{Storage, TokenRecord};
use crate::error::Error;

/// Process-local token storage backed by a concurrent map.
///
/// Records do not survive a restart. Used for tests and local runs without a
/// database.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: DashMap<(String, String), TokenRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all namespaces.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, namespace: &str, key: &str, record: &TokenRecord) -> Result<(), Error> {
        debug!("Saving token record {}/{}", namespace, key);
        self.records
            .insert((namespace.to_string(), key.to_string()), record.clone());
        Ok(())
    }

    async fn load(&self, namespace: &str, key: &str) -> Result<Option<TokenRecord>, Error> {
        Ok(self
            .records
            .get(&(namespace.to_string(), key.to_string()))
            .map(|entry| entry.value().clone()))
    }
}
