//! Connection status lookups for a place.

use serde::Serialize;

use crate::error::{Error, InputErrorKind};
use crate::oauth_relay::OAuthRelay;

/// Whether a place has a stored provider token. Never carries the token itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    #[serde(rename = "placeID")]
    pub place_id: String,
    pub connected: bool,
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl OAuthRelay {
    pub async fn connection_status(&self, place_id: &str) -> Result<ConnectionStatus, Error> {
        if place_id.is_empty() {
            return Err(Error::input(InputErrorKind::MissingParameter(
                "placeID".to_string(),
            )));
        }

        let record = self.store.load(&self.namespace, place_id).await?;

        Ok(ConnectionStatus {
            place_id: place_id.to_string(),
            connected: record.is_some(),
            user_id: record.map(|r| r.user_id),
        })
    }
}
