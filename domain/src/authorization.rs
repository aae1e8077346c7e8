//! Authorization URL issuance.

use std::collections::BTreeMap;

use log::*;
use relay_auth::oauth::{authorize, OpaqueState};
use serde_json::{Map, Value};

use crate::error::{Error, InputErrorKind};
use crate::oauth_relay::OAuthRelay;

/// Raw authorize inputs as they arrive at the boundary.
///
/// `context` and `extra_auth_params` are URI-encoded JSON objects.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeParams {
    pub viewer_id: Option<String>,
    pub place_id: Option<String>,
    pub callback: Option<String>,
    pub jive_tenant_id: Option<String>,
    /// Tenant of the calling host, taken from its extension `Authorization` header.
    pub origin_tenant_id: Option<String>,
    pub context: Option<String>,
    pub extra_auth_params: Option<String>,
}

/// A validated authorize request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeRequest {
    pub viewer_id: String,
    pub place_id: String,
    /// Echoed by the host; not used to build the URL.
    pub callback: Option<String>,
    pub target_tenant_id: Option<String>,
    pub origin_tenant_id: Option<String>,
    pub context: Map<String, Value>,
    pub extra_auth_params: BTreeMap<String, String>,
}

impl TryFrom<AuthorizeParams> for AuthorizeRequest {
    type Error = Error;

    fn try_from(params: AuthorizeParams) -> Result<Self, Self::Error> {
        Ok(AuthorizeRequest {
            viewer_id: required(params.viewer_id, "viewerID")?,
            place_id: required(params.place_id, "placeID")?,
            callback: params.callback,
            target_tenant_id: params.jive_tenant_id.filter(|id| !id.is_empty()),
            origin_tenant_id: params.origin_tenant_id.filter(|id| !id.is_empty()),
            context: parse_json_object(params.context.as_deref(), InputErrorKind::InvalidContext)?,
            extra_auth_params: parse_json_object(
                params.extra_auth_params.as_deref(),
                InputErrorKind::InvalidExtraAuthParams,
            )
            .map(into_string_params)?,
        })
    }
}

impl OAuthRelay {
    /// Build the provider authorization URL for `request`.
    ///
    /// The caller's identifiers and context are packed into the opaque state so
    /// the callback can tell where to store the resulting token.
    pub fn authorize_url(&self, request: &AuthorizeRequest) -> Result<String, Error> {
        let state = OpaqueState::builder(&request.place_id, &request.viewer_id)
            .context(request.context.clone())
            .jive_tenant_id(request.target_tenant_id.clone())
            .origin_tenant_id(request.origin_tenant_id.clone())
            .build();
        let encoded_state = self.codec.encode(&state)?;

        debug!(
            "Issuing authorization URL for place {} viewer {}",
            request.place_id, request.viewer_id
        );

        Ok(authorize::authorization_url(
            &self.oauth_config,
            &self.redirect_uri,
            &encoded_state,
            &request.extra_auth_params,
        ))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::input(InputErrorKind::MissingParameter(name.to_string())))
}

/// URI-decode then parse a JSON object. An absent or empty value is an empty object.
fn parse_json_object(raw: Option<&str>, kind: InputErrorKind) -> Result<Map<String, Value>, Error> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Map::new());
    };
    let parsed = urlencoding::decode(raw)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        .and_then(|decoded| serde_json::from_str::<Value>(&decoded).map_err(|e| e.into()));

    match parsed {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => {
            warn!("Rejecting {kind:?}: JSON value is not an object");
            Err(Error::input(kind))
        }
        Err(e) => {
            warn!("Rejecting {kind:?}: {e}");
            Err(Error {
                source: Some(e),
                ..Error::input(kind)
            })
        }
    }
}

fn into_string_params(object: Map<String, Value>) -> BTreeMap<String, String> {
    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect()
}
