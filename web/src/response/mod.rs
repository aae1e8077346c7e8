pub(crate) mod oauth;
pub(crate) mod oauth_callback;
