//! The host platform's extension `Authorization` header.
//!
//! Form: `Authorization: JiveEXTN algorithm=HmacSHA256&client_id=..&jive_url=..&tenant_id=..&timestamp=..&signature=..`.
//! Only parsed here: the header identifies the calling tenant, it does not
//! authorize anything, and its signature is not checked.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use log::*;

const SCHEME: &str = "JiveEXTN";

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct JiveExtensionAuth {
    pub(crate) tenant_id: Option<String>,
    pub(crate) jive_url: Option<String>,
    pub(crate) client_id: Option<String>,
}

/// `None` when the request carries no extension header or it does not parse.
pub(crate) struct JiveExtension(pub(crate) Option<JiveExtensionAuth>);

impl<S> FromRequestParts<S> for JiveExtension
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_authorization);
        Ok(JiveExtension(auth))
    }
}

pub(crate) fn parse_authorization(value: &str) -> Option<JiveExtensionAuth> {
    let params = value.strip_prefix(SCHEME)?.trim_start();
    if params.is_empty() {
        return None;
    }

    let mut auth = JiveExtensionAuth::default();
    for (key, value) in url::form_urlencoded::parse(params.as_bytes()) {
        match key.as_ref() {
            "tenant_id" => auth.tenant_id = Some(value.into_owned()),
            "jive_url" => auth.jive_url = Some(value.into_owned()),
            "client_id" => auth.client_id = Some(value.into_owned()),
            _ => {}
        }
    }

    trace!(
        "Extension header from tenant {:?} at {:?} (client {:?})",
        auth.tenant_id,
        auth.jive_url,
        auth.client_id
    );
    Some(auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tenant_and_instance() {
        let header = "JiveEXTN algorithm=HmacSHA256&client_id=abc.i&jive_url=https%3A%2F%2Fjive.example.com&tenant_id=T-123&timestamp=1400000000000&signature=c2ln";
        assert_eq!(
            parse_authorization(header),
            Some(JiveExtensionAuth {
                tenant_id: Some("T-123".to_string()),
                jive_url: Some("https://jive.example.com".to_string()),
                client_id: Some("abc.i".to_string()),
            })
        );
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(parse_authorization("Bearer abc"), None);
        assert_eq!(parse_authorization("JiveEXTN"), None);
    }

    #[test]
    fn header_without_tenant_still_parses() {
        let auth = parse_authorization("JiveEXTN client_id=abc").unwrap();
        assert_eq!(auth.tenant_id, None);
        assert_eq!(auth.client_id.as_deref(), Some("abc"));
    }
}
