//! Stored token record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token obtained for a place, plus the viewer who authorized it.
///
/// `token` is the provider's response entity, stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(rename = "placeID")]
    pub place_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub token: Value,
}

impl TokenRecord {
    pub fn new(place_id: String, user_id: String, token: Value) -> Self {
        Self {
            place_id,
            user_id,
            token,
        }
    }
}
