use crate::controller::{health_check_controller, oauth_controller};
use crate::{response, AppState};
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "OAuth Relay API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::authorize,
            oauth_controller::callback,
            oauth_controller::connection,
        ),
        components(
            schemas(
                response::oauth::AuthorizeResponse,
                response::oauth::ConnectionResponse,
                response::oauth::ErrorResponse,
            )
        ),
        tags(
            (name = "oauth_relay", description = "OAuth2 authorization-code relay between the host platform and the provider")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/oauth/authorize", get(oauth_controller::authorize))
        .route(
            "/oauth/callback",
            get(oauth_controller::callback).post(oauth_controller::callback),
        )
        .route("/oauth/connection", get(oauth_controller::connection))
        .with_state(app_state)
}
