//! The relay between the host platform and the OAuth2 provider.
//!
//! One `OAuthRelay` is built at startup from [`Config`] and shared by every
//! request. It owns the provider settings, the state codec, the exchange client
//! and the injected token store. The operations live next to their flows in
//! [`crate::authorization`], [`crate::callback`] and [`crate::connection`].

use std::sync::Arc;
use std::time::Duration;

use log::*;
use relay_auth::http::HttpClientBuilder;
use relay_auth::oauth::token::Storage;
use relay_auth::oauth::{OAuth2Configuration, StateCodec, StateSigner, TokenExchangeClient};
use secrecy::SecretString;
use service::config::Config;

use crate::error::{DomainErrorKind, Error, InternalErrorKind};

pub struct OAuthRelay {
    pub(crate) oauth_config: OAuth2Configuration,
    pub(crate) redirect_uri: String,
    pub(crate) codec: StateCodec,
    pub(crate) exchange_client: TokenExchangeClient,
    pub(crate) store: Arc<dyn Storage>,
    pub(crate) namespace: String,
}

impl OAuthRelay {
    /// Assemble a relay from already-built parts.
    pub fn new(
        oauth_config: OAuth2Configuration,
        service_url: &str,
        codec: StateCodec,
        exchange_client: TokenExchangeClient,
        store: Arc<dyn Storage>,
        namespace: String,
    ) -> Self {
        let redirect_uri = oauth_config.redirect_uri(service_url);
        Self {
            oauth_config,
            redirect_uri,
            codec,
            exchange_client,
            store,
            namespace,
        }
    }

    /// Build the relay from application configuration.
    ///
    /// Fails with a `Config` error when any of the authorization URL, token
    /// request URL, consumer key or consumer secret is missing.
    pub fn from_config(config: &Config, store: Arc<dyn Storage>) -> Result<Self, Error> {
        let oauth_config = oauth2_configuration(config)?;

        let codec = match config.state_signing_key() {
            Some(key) => {
                info!("State signing enabled");
                StateCodec::signed(StateSigner::new(SecretString::new(key.to_string())))
            }
            None => StateCodec::new(),
        };

        let http_client = HttpClientBuilder::new()
            .with_timeout(Duration::from_secs(config.token_exchange_timeout_secs))
            .build()
            .map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            })?;

        let relay = Self::new(
            oauth_config,
            config.service_url(),
            codec,
            TokenExchangeClient::new(http_client),
            store,
            config.token_namespace.clone(),
        );

        info!(
            "OAuth relay ready: redirect_uri={}, namespace={}",
            relay.redirect_uri, relay.namespace
        );
        Ok(relay)
    }

    /// Redirect URI sent to the provider on both legs of the flow.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

fn oauth2_configuration(config: &Config) -> Result<OAuth2Configuration, Error> {
    let authorization_url = config
        .oauth_authorization_url()
        .ok_or_else(|| Error::config("OAUTH_AUTHORIZATION_URL is not set"))?;
    let token_request_url = config
        .oauth_token_request_url()
        .ok_or_else(|| Error::config("OAUTH_TOKEN_REQUEST_URL is not set"))?;
    let consumer_key = config
        .oauth_consumer_key()
        .ok_or_else(|| Error::config("OAUTH_CONSUMER_KEY is not set"))?;
    let consumer_secret = config
        .oauth_consumer_secret()
        .ok_or_else(|| Error::config("OAUTH_CONSUMER_SECRET is not set"))?;

    Ok(OAuth2Configuration {
        authorization_url: authorization_url.to_string(),
        token_request_url: token_request_url.to_string(),
        callback_url: config.oauth_callback_url().to_string(),
        consumer_key: consumer_key.to_string(),
        consumer_secret: SecretString::new(consumer_secret.to_string()),
        scope: config.oauth_scope().map(str::to_string),
        extra_auth_params: config.oauth_extra_auth_params().clone(),
        extra_callback_params: config.oauth_extra_callback_params().clone(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support;
    use super::*;
    use clap::Parser;
    use relay_auth::oauth::token::MemoryStorage;

    #[test]
    fn relative_callback_is_resolved_against_service_url() {
        let (relay, _) = test_support::relay("https://github.com", &[]);
        assert_eq!(
            relay.redirect_uri(),
            "https://relay.example.com/oauth/callback"
        );
        assert_eq!(relay.namespace(), "gitHubAccessTokens");
    }

    #[test]
    fn absolute_callback_is_used_verbatim() {
        let (relay, _) = test_support::relay(
            "https://github.com",
            &["--oauth-callback-url", "https://cb.example.com/done"],
        );
        assert_eq!(relay.redirect_uri(), "https://cb.example.com/done");
    }

    #[test]
    fn missing_provider_settings_fail_fast() {
        let config = Config::try_parse_from([
            "oauth_relay",
            "--oauth-token-request-url",
            "https://github.com/login/oauth/access_token",
            "--oauth-consumer-key",
            "client-id",
            "--oauth-consumer-secret",
            "client-secret",
        ])
        .unwrap();
        let result = OAuthRelay::from_config(&config, Arc::new(MemoryStorage::new()));
        assert!(matches!(
            result,
            Err(Error {
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
                ..
            })
        ));
    }
}
