//! # relay-auth
//!
//! OAuth 2.0 building blocks for the authorization-code relay:
//! - Opaque state encoding with optional HMAC signing
//! - Provider authorization URL construction
//! - Authorization code exchange against the provider token endpoint
//! - Token record storage trait with an in-memory implementation
//! - AES-256-GCM helpers for encrypting token records at rest
//! - HTTP client building
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_auth::{
//!     oauth::{authorize, OAuth2Configuration, StateCodec, TokenExchangeClient},
//!     oauth::token::{MemoryStorage, Storage, TokenRecord},
//!     http::HttpClientBuilder,
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
