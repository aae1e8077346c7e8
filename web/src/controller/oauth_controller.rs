//! Controller for the OAuth2 authorization-code relay.
//!
//! None of these endpoints are session protected: `authorize` is called by the
//! host platform, `callback` by the user's browser on its way back from the
//! provider.

use crate::extractors::jive_extension::JiveExtension;
use crate::params::oauth::{AuthorizeParams, CallbackParams, ConnectionParams};
use crate::response::oauth::{AuthorizeResponse, ConnectionResponse};
use crate::response::oauth_callback;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use domain::authorization::AuthorizeRequest;
use log::*;

/// GET /oauth/authorize
///
/// Returns the provider authorization URL carrying the caller's opaque state.
#[utoipa::path(
    get,
    path = "/oauth/authorize",
    params(AuthorizeParams),
    responses(
        (status = 200, description = "Provider authorization URL", body = AuthorizeResponse),
        (status = 400, description = "Missing identifiers or malformed JSON parameters", body = crate::response::oauth::ErrorResponse),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    JiveExtension(extension): JiveExtension,
    Query(params): Query<AuthorizeParams>,
) -> Result<impl IntoResponse, Error> {
    let origin_tenant_id = extension.and_then(|auth| auth.tenant_id);
    let request = AuthorizeRequest::try_from(params.into_domain(origin_tenant_id))?;

    let url = app_state.relay.authorize_url(&request)?;

    Ok(Json(AuthorizeResponse { url }))
}

/// GET|POST /oauth/callback
///
/// Provider redirect target. Exchanges the code, stores the token and renders the success view.
#[utoipa::path(
    get,
    path = "/oauth/callback",
    params(CallbackParams),
    responses(
        (status = 200, description = "Token stored; success page", body = String, content_type = "text/html"),
        (status = 400, description = "Missing code or state, or undecodable state", body = crate::response::oauth::ErrorResponse),
        (status = 500, description = "Token exchange or persistence failed", body = crate::response::oauth::ErrorResponse),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, Error> {
    let record = app_state
        .relay
        .complete_callback(params.code.as_deref(), params.state.as_deref())
        .await?;

    debug!("Callback completed for place {}", record.place_id);
    Ok(oauth_callback::render(&record))
}

/// GET /oauth/connection
///
/// Reports whether a token is stored for a place.
#[utoipa::path(
    get,
    path = "/oauth/connection",
    params(ConnectionParams),
    responses(
        (status = 200, description = "Connection status", body = ConnectionResponse),
        (status = 400, description = "Missing placeID", body = crate::response::oauth::ErrorResponse),
        (status = 500, description = "Token store unavailable", body = crate::response::oauth::ErrorResponse),
    )
)]
pub async fn connection(
    State(app_state): State<AppState>,
    Query(params): Query<ConnectionParams>,
) -> Result<impl IntoResponse, Error> {
    let status = app_state
        .relay
        .connection_status(params.place_id.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(ConnectionResponse::from(status)))
}
