//! Token storage trait for persisting token records.

use async_trait::async_trait;

use super::TokenRecord;
use crate::error::Error;

/// Trait for storing and retrieving token records.
///
/// Records are addressed by a namespace (one logical collection per token class)
/// and a key (the place id). Writes are last-write-wins per key: there is no
/// versioning and no expiry handling.
///
/// Implementations should:
/// - Make a completed `save` durable and visible to a following `load`
/// - Handle concurrent access safely
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store a record, replacing any existing record for the same key.
    ///
    /// # Arguments
    ///
    /// * `namespace` - Logical collection name
    /// * `key` - Record key, the place id
    /// * `record` - The record to store
    async fn save(&self, namespace: &str, key: &str, record: &TokenRecord) -> Result<(), Error>;

    /// Retrieve the record stored for a key.
    ///
    /// # Returns
    ///
    /// `Some(TokenRecord)` if found, `None` if not found.
    async fn load(&self, namespace: &str, key: &str) -> Result<Option<TokenRecord>, Error>;
}
