//! Provider authorization URL construction.

use std::collections::BTreeMap;

use super::OAuth2Configuration;

/// Build the provider authorization URL.
///
/// The query string is assembled by hand so its layout stays stable:
/// `state`, `redirect_uri`, `client_id`, `response_type`, optional `scope`, then
/// extra parameters in key order. `redirect_uri` and `scope` are percent-encoded.
/// `client_id` and the extra parameters are appended as given; callers pre-encode
/// extra values when they need to.
///
/// # Arguments
///
/// * `config` - Provider integration settings
/// * `redirect_uri` - Resolved callback URL registered with the provider
/// * `encoded_state` - Output of [`super::StateCodec::encode`]
/// * `extra_auth_params` - Per-request extra parameters; these win over the
///   configured extras on key collision
pub fn authorization_url(
    config: &OAuth2Configuration,
    redirect_uri: &str,
    encoded_state: &str,
    extra_auth_params: &BTreeMap<String, String>,
) -> String {
    let mut url = format!(
        "{}?state={}&redirect_uri={}&client_id={}&response_type=code",
        config.authorization_url,
        encoded_state,
        urlencoding::encode(redirect_uri),
        config.consumer_key,
    );

    if let Some(scope) = &config.scope {
        url.push_str("&scope=");
        url.push_str(&urlencoding::encode(scope));
    }

    let mut extras = config.extra_auth_params.clone();
    extras.extend(
        extra_auth_params
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    for (key, value) in &extras {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }

    url
}
