//! Authorization code exchange against the provider token endpoint.

use std::collections::BTreeMap;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::OAuth2Configuration;
use crate::error::{oauth_error, Error, OAuthErrorKind, ProviderRejection};

/// Provider response entity for a successful exchange.
///
/// Kept as an opaque JSON value: refresh tokens, expiry and scopes are stored
/// exactly as the provider returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderToken {
    pub status: u16,
    pub entity: Value,
}

/// Client for the provider token endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchangeClient {
    http_client: reqwest::Client,
}

impl TokenExchangeClient {
    /// Create a new exchange client.
    ///
    /// # Arguments
    ///
    /// * `http_client` - Client built with [`crate::http::HttpClientBuilder`]; its
    ///   timeout bounds the exchange
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Exchange an authorization code for a provider token.
    ///
    /// Issues exactly one form-encoded POST to `config.token_request_url`. A
    /// status in `[200, 299)` succeeds. Any other status is returned as
    /// [`OAuthErrorKind::ProviderRejected`] with the raw body so it can be passed
    /// through unchanged.
    ///
    /// # Arguments
    ///
    /// * `config` - Provider integration settings
    /// * `redirect_uri` - The same redirect URI sent in the authorization URL
    /// * `code` - Authorization code from the provider callback
    pub async fn exchange_code(
        &self,
        config: &OAuth2Configuration,
        redirect_uri: &str,
        code: &str,
    ) -> Result<ProviderToken, Error> {
        let form = exchange_form(config, redirect_uri, code);

        debug!(
            "Exchanging authorization code at {}",
            config.token_request_url
        );

        let response = self
            .http_client
            .post(&config.token_request_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .inspect_err(|e| warn!("Token exchange request failed: {:?}", e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if !(200..299).contains(&status) {
            warn!("Provider rejected token exchange with status {}", status);
            return Err(oauth_error(
                OAuthErrorKind::ProviderRejected(ProviderRejection {
                    status,
                    content_type,
                    body,
                }),
                "Provider rejected token exchange",
            ));
        }

        info!("Exchanged authorization code (status {})", status);
        Ok(ProviderToken {
            status,
            entity: parse_entity(&body),
        })
    }
}

/// Build the exchange form body. The fixed OAuth fields win over configured
/// extras that use the same key.
fn exchange_form(
    config: &OAuth2Configuration,
    redirect_uri: &str,
    code: &str,
) -> BTreeMap<String, String> {
    let mut form = config.extra_callback_params.clone();
    form.insert("grant_type".to_string(), "authorization_code".to_string());
    form.insert("redirect_uri".to_string(), redirect_uri.to_string());
    form.insert("client_id".to_string(), config.consumer_key.clone());
    form.insert(
        "client_secret".to_string(),
        config.consumer_secret.expose_secret().clone(),
    );
    form.insert("code".to_string(), code.to_string());
    form
}

/// Providers are asked for JSON, but a body that does not parse is kept as a
/// JSON string rather than dropped.
fn parse_entity(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
