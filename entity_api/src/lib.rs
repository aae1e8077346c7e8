pub use entity::{oauth_tokens, Id};

pub mod error;
pub mod oauth_token;
