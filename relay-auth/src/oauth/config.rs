//! Provider integration settings.

use std::collections::BTreeMap;

use secrecy::SecretString;

/// OAuth 2.0 settings for one provider integration.
///
/// Built once at process start and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct OAuth2Configuration {
    /// Provider authorization endpoint the user is redirected to.
    pub authorization_url: String,
    /// Provider token endpoint used for the code exchange.
    pub token_request_url: String,
    /// Callback URL registered with the provider. A value starting with `/` is
    /// resolved against the service's externally reachable base URL.
    pub callback_url: String,
    /// OAuth client id.
    pub consumer_key: String,
    /// OAuth client secret.
    pub consumer_secret: SecretString,
    /// Requested scope, if any.
    pub scope: Option<String>,
    /// Extra query parameters appended to every authorization URL.
    pub extra_auth_params: BTreeMap<String, String>,
    /// Extra form fields sent with every token exchange.
    pub extra_callback_params: BTreeMap<String, String>,
}

impl OAuth2Configuration {
    /// Resolve the redirect URI sent to the provider.
    ///
    /// # Arguments
    ///
    /// * `service_url` - Externally reachable base URL of this service
    pub fn redirect_uri(&self, service_url: &str) -> String {
        if self.callback_url.starts_with('/') {
            format!("{}{}", service_url.trim_end_matches('/'), self.callback_url)
        } else {
            self.callback_url.clone()
        }
    }
}
