//! Relay orchestration between the host platform, the OAuth2 provider and the token store.
//!
//! `web` depends only on this crate: the `relay_auth` and `entity_api` types it needs
//! are re-exported here.

pub use relay_auth::oauth::token::{MemoryStorage, Storage, TokenRecord};

pub mod authorization;
pub mod callback;
pub mod connection;
pub mod error;
pub mod oauth_relay;
pub mod oauth_token_storage;

pub use oauth_relay::OAuthRelay;
