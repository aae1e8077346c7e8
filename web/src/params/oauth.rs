use domain::authorization::AuthorizeParams as DomainAuthorizeParams;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct AuthorizeParams {
    /// Host platform user requesting the connection
    #[serde(rename = "viewerID")]
    pub(crate) viewer_id: Option<String>,
    /// Place the token will be stored under
    #[serde(rename = "placeID")]
    pub(crate) place_id: Option<String>,
    /// Host callback, echoed only
    pub(crate) callback: Option<String>,
    /// Target tenant, carried in the state as `jiveTenantID`
    #[serde(rename = "jiveTenantID")]
    pub(crate) jive_tenant_id: Option<String>,
    /// URI-encoded JSON object merged into the state
    pub(crate) context: Option<String>,
    /// URI-encoded JSON object of extra authorization URL parameters
    #[serde(rename = "extraAuthParams")]
    pub(crate) extra_auth_params: Option<String>,
}

impl AuthorizeParams {
    pub(crate) fn into_domain(self, origin_tenant_id: Option<String>) -> DomainAuthorizeParams {
        DomainAuthorizeParams {
            viewer_id: self.viewer_id,
            place_id: self.place_id,
            callback: self.callback,
            jive_tenant_id: self.jive_tenant_id,
            origin_tenant_id,
            context: self.context,
            extra_auth_params: self.extra_auth_params,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CallbackParams {
    /// Authorization code issued by the provider
    pub(crate) code: Option<String>,
    /// Opaque state returned unchanged by the provider
    pub(crate) state: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ConnectionParams {
    #[serde(rename = "placeID")]
    pub(crate) place_id: Option<String>,
}
