//! Opaque state carried through the provider redirect.
//!
//! The state is a JSON document, base64 encoded with the URL-safe alphabet so it
//! can be embedded in a query string without further escaping. Decoded values are
//! correlation hints only: they say where a token should be stored, never whether
//! the caller is allowed to store it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::StateSigner;
use crate::error::{state_error, Error, ErrorKind, StateErrorKind};

const SIGNATURE_SEPARATOR: char = '.';

const PLACE_ID_KEY: &str = "placeID";
const VIEWER_ID_KEY: &str = "viewerID";
const JIVE_TENANT_ID_KEY: &str = "jiveTenantID";
const ORIGIN_TENANT_ID_KEY: &str = "originTenantID";

/// Correlation data round-tripped through the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpaqueState {
    #[serde(rename = "placeID", default)]
    pub place_id: String,
    #[serde(rename = "viewerID", default)]
    pub viewer_id: String,
    #[serde(
        rename = "jiveTenantID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub jive_tenant_id: Option<String>,
    #[serde(
        rename = "originTenantID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_tenant_id: Option<String>,
    /// Free-form caller context, stored alongside the relay's own keys.
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

impl OpaqueState {
    pub fn builder(place_id: &str, viewer_id: &str) -> OpaqueStateBuilder {
        OpaqueStateBuilder {
            place_id: place_id.to_string(),
            viewer_id: viewer_id.to_string(),
            jive_tenant_id: None,
            origin_tenant_id: None,
            context: Map::new(),
        }
    }
}

/// Typed builder for [`OpaqueState`].
///
/// Precedence is fixed regardless of the order setters are called in: `placeID`
/// and `viewerID` always come from the request, while the tenant ids come from
/// the request only when it sets them and otherwise keep any context value.
#[derive(Debug, Clone)]
pub struct OpaqueStateBuilder {
    place_id: String,
    viewer_id: String,
    jive_tenant_id: Option<String>,
    origin_tenant_id: Option<String>,
    context: Map<String, Value>,
}

impl OpaqueStateBuilder {
    pub fn context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn jive_tenant_id(mut self, jive_tenant_id: Option<String>) -> Self {
        self.jive_tenant_id = jive_tenant_id;
        self
    }

    pub fn origin_tenant_id(mut self, origin_tenant_id: Option<String>) -> Self {
        self.origin_tenant_id = origin_tenant_id;
        self
    }

    pub fn build(mut self) -> OpaqueState {
        self.context.remove(PLACE_ID_KEY);
        self.context.remove(VIEWER_ID_KEY);
        let jive_tenant_id =
            take_tenant_id(&mut self.context, JIVE_TENANT_ID_KEY, self.jive_tenant_id);
        let origin_tenant_id =
            take_tenant_id(&mut self.context, ORIGIN_TENANT_ID_KEY, self.origin_tenant_id);

        OpaqueState {
            place_id: self.place_id,
            viewer_id: self.viewer_id,
            jive_tenant_id,
            origin_tenant_id,
            context: self.context,
        }
    }
}

/// Resolve a tenant id: the request value wins, otherwise the context value is
/// kept. Non-string context values are kept as their JSON text so the state
/// still decodes on the way back.
fn take_tenant_id(
    context: &mut Map<String, Value>,
    key: &str,
    requested: Option<String>,
) -> Option<String> {
    let from_context = context.remove(key);
    requested.or(match from_context {
        Some(Value::String(value)) => Some(value),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

/// Encodes and decodes the `state` query parameter.
///
/// Without a signer the encoded form is `base64url(json)`. With a signer it is
/// `base64url(json) + "." + hex(hmac_sha256(base64url(json)))`.
#[derive(Debug, Clone, Default)]
pub struct StateCodec {
    signer: Option<StateSigner>,
}

impl StateCodec {
    /// Create a codec that neither signs nor verifies.
    pub fn new() -> Self {
        Self { signer: None }
    }

    /// Create a codec that signs encoded state and rejects unsigned or tampered state.
    pub fn signed(signer: StateSigner) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    /// Serialize `state` to JSON and encode it for use as a query parameter value.
    pub fn encode<T: Serialize>(&self, state: &T) -> Result<String, Error> {
        let json = serde_json::to_vec(state).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::State(StateErrorKind::Encoding),
        })?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        match &self.signer {
            Some(signer) => {
                let signature = signer.sign(&payload)?;
                Ok(format!("{payload}{SIGNATURE_SEPARATOR}{signature}"))
            }
            None => Ok(payload),
        }
    }

    /// Decode a raw `state` value back into `T`.
    ///
    /// Fails when the value is not valid base64, is not valid JSON for `T`, or,
    /// for a signed codec, carries a missing or mismatched signature.
    pub fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, Error> {
        let payload = match &self.signer {
            Some(signer) => {
                let (payload, signature) =
                    raw.rsplit_once(SIGNATURE_SEPARATOR).ok_or_else(|| {
                        state_error(StateErrorKind::MissingSignature, "State is not signed")
                    })?;
                signer.verify(payload, signature)?;
                payload
            }
            None => raw,
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(normalize_alphabet(payload))
            .map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::State(StateErrorKind::Base64),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::State(StateErrorKind::Json),
        })
    }
}

/// Map standard-alphabet base64 (with optional padding) onto the URL-safe
/// alphabet. A `+` that was not percent-encoded arrives as a space once the
/// query string is decoded, so spaces are treated as `+` too.
fn normalize_alphabet(raw: &str) -> String {
    raw.trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}
