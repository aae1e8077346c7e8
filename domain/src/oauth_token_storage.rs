//! Database-backed token storage with optional encryption at rest.
//!
//! Implements `relay_auth::oauth::token::Storage` on the `oauth_tokens` table.
//! With a cipher configured, the provider entity is sealed with AES-256-GCM
//! before writing and opened on read.

use std::sync::Arc;

use async_trait::async_trait;
use log::*;
use sea_orm::DatabaseConnection;

use entity_api::oauth_token::{self, TokenWrite};
use relay_auth::{
    error::{storage_error, Error, ErrorKind, StorageErrorKind},
    oauth::token::{encryption::TokenCipher, Storage, TokenRecord},
};
use service::config::Config;

use crate::error::Error as DomainError;

pub struct DbTokenStorage {
    db: Arc<DatabaseConnection>,
    cipher: Option<TokenCipher>,
}

impl DbTokenStorage {
    pub fn new(db: Arc<DatabaseConnection>, cipher: Option<TokenCipher>) -> Self {
        Self { db, cipher }
    }

    /// Build the store, validating `TOKEN_ENCRYPTION_KEY` when one is configured.
    pub fn from_config(config: &Config, db: Arc<DatabaseConnection>) -> Result<Self, DomainError> {
        let cipher = match config.token_encryption_key() {
            Some(key) => {
                info!("Token encryption at rest enabled");
                Some(
                    TokenCipher::from_hex_key(key)
                        .map_err(|_| DomainError::config("TOKEN_ENCRYPTION_KEY is invalid"))?,
                )
            }
            None => {
                warn!("TOKEN_ENCRYPTION_KEY not set; tokens are stored unencrypted");
                None
            }
        };
        Ok(Self::new(db, cipher))
    }
}

fn storage_db_err(err: entity_api::error::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Storage(StorageErrorKind::Database),
    }
}

fn serialization_err(err: serde_json::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Storage(StorageErrorKind::Serialization),
    }
}

#[async_trait]
impl Storage for DbTokenStorage {
    async fn save(&self, namespace: &str, key: &str, record: &TokenRecord) -> Result<(), Error> {
        let token = match &self.cipher {
            Some(cipher) => cipher.seal_token(&record.token)?,
            None => serde_json::to_string(&record.token).map_err(serialization_err)?,
        };

        oauth_token::upsert(
            &self.db,
            TokenWrite {
                namespace: namespace.to_string(),
                place_id: key.to_string(),
                user_id: record.user_id.clone(),
                token,
                encrypted: self.cipher.is_some(),
            },
        )
        .await
        .map_err(storage_db_err)
    }

    async fn load(&self, namespace: &str, key: &str) -> Result<Option<TokenRecord>, Error> {
        let Some(model) = oauth_token::find_by_namespace_and_place(&self.db, namespace, key)
            .await
            .map_err(storage_db_err)?
        else {
            return Ok(None);
        };

        let token = match (model.encrypted, &self.cipher) {
            (true, Some(cipher)) => cipher.open_token(&model.token)?,
            (true, None) => {
                return Err(storage_error(
                    StorageErrorKind::DecryptionFailed,
                    "Stored token is encrypted but no key is configured",
                ))
            }
            (false, _) => serde_json::from_str(&model.token).map_err(serialization_err)?,
        };

        Ok(Some(TokenRecord::new(model.place_id, model.user_id, token)))
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity_api::{oauth_tokens::Model, Id};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn model(token: String, encrypted: bool) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            namespace: "gitHubAccessTokens".to_string(),
            place_id: "P1".to_string(),
            user_id: "U1".to_string(),
            token,
            encrypted,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn cipher() -> TokenCipher {
        TokenCipher::from_hex_key(TEST_KEY).unwrap()
    }

    #[tokio::test]
    async fn save_writes_plain_json_without_a_cipher() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results(vec![MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let storage = DbTokenStorage::new(db, None);
        let record = TokenRecord::new("P1".into(), "U1".into(), json!({"access_token": "T1"}));

        storage.save("gitHubAccessTokens", "P1", &record).await.unwrap();
    }

    #[tokio::test]
    async fn load_opens_sealed_token() {
        let token = json!({"access_token": "T1", "scope": "repo"});
        let sealed = cipher().seal_token(&token).unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![model(sealed, true)]])
                .into_connection(),
        );
        let storage = DbTokenStorage::new(db, Some(cipher()));

        let loaded = storage.load("gitHubAccessTokens", "P1").await.unwrap();
        assert_eq!(
            loaded,
            Some(TokenRecord::new("P1".into(), "U1".into(), token))
        );
    }

    #[tokio::test]
    async fn load_plain_row_ignores_cipher() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![model(r#"{"access_token":"T1"}"#.into(), false)]])
                .into_connection(),
        );
        let storage = DbTokenStorage::new(db, Some(cipher()));

        let loaded = storage.load("gitHubAccessTokens", "P1").await.unwrap().unwrap();
        assert_eq!(loaded.token, json!({"access_token": "T1"}));
    }

    #[tokio::test]
    async fn load_encrypted_row_without_key_fails() {
        let sealed = cipher().seal_token(&json!("T1")).unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![model(sealed, true)]])
                .into_connection(),
        );
        let storage = DbTokenStorage::new(db, None);

        let result = storage.load("gitHubAccessTokens", "P1").await;
        assert!(matches!(
            result,
            Err(Error {
                error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn load_missing_row_returns_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
                .into_connection(),
        );
        let storage = DbTokenStorage::new(db, None);
        assert_eq!(storage.load("gitHubAccessTokens", "P404").await.unwrap(), None);
    }
}
