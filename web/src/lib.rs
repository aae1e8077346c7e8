use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::OAuthRelay;
use log::*;
use service::config::Config;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod extractors;
mod params;
mod response;
pub mod router;

pub use error::Error;

/// Shared by every handler. Cheap to clone: the relay is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: Arc<OAuthRelay>,
}

impl AppState {
    pub fn new(config: Config, relay: Arc<OAuthRelay>) -> Self {
        Self { config, relay }
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);
    let listener = TcpListener::bind(&server_url).await?;

    let cors_layer = cors_layer(&app_state.config.allowed_origins);

    info!(
        "Server starting... listening for connections on http://{} ({} environment)",
        server_url,
        app_state.config.runtime_env()
    );

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|_| warn!("Ignoring invalid CORS origin: {origin}"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(origins)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
}
