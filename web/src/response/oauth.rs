use domain::connection::ConnectionStatus;
use serde::Serialize;
use utoipa::ToSchema;

/// Provider authorization URL the host should redirect the user to
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorizeResponse {
    pub url: String,
}

/// Whether a place has a stored token. The token itself is never returned.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionResponse {
    #[serde(rename = "placeID")]
    pub place_id: String,
    pub connected: bool,
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<ConnectionStatus> for ConnectionResponse {
    fn from(status: ConnectionStatus) -> Self {
        Self {
            place_id: status.place_id,
            connected: status.connected,
            user_id: status.user_id,
        }
    }
}

/// Body of every locally generated error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
