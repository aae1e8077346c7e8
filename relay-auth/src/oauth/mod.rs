//! OAuth 2.0 authorization-code relay infrastructure.
//!
//! Builds provider authorization URLs carrying opaque state and exchanges the
//! returned authorization code for a provider token.

mod config;
mod exchange;
mod signing;
mod state;

pub mod authorize;
pub mod token;

pub use config::OAuth2Configuration;
pub use exchange::{ProviderToken, TokenExchangeClient};
pub use signing::StateSigner;
pub use state::{OpaqueState, OpaqueStateBuilder, StateCodec};
