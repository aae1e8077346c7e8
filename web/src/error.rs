use std::error::Error as StdError;

use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InputErrorKind, InternalErrorKind,
    ProviderRejection,
};
use log::*;

use crate::response::oauth::ErrorResponse;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn input_message(kind: &InputErrorKind) -> String {
    match kind {
        InputErrorKind::MissingCode => "Authorization code required".to_string(),
        InputErrorKind::MissingState => "Missing state string".to_string(),
        InputErrorKind::InvalidState => "Invalid state string, cannot parse.".to_string(),
        InputErrorKind::InvalidContext => "Invalid context string, could not parse".to_string(),
        InputErrorKind::InvalidExtraAuthParams => {
            "Invalid extra auth param string, could not parse".to_string()
        }
        InputErrorKind::MissingParameter(name) => format!("Missing required parameter: {name}"),
    }
}

/// The provider's status and body go back to the caller unchanged. Without a
/// provider content type the body is labelled as JSON.
fn provider_passthrough(rejection: ProviderRejection) -> Response {
    let status = StatusCode::from_u16(rejection.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = rejection
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let mut response = (status, rejection.body).into_response();
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let source = self.0.source;
        match self.0.error_kind {
            DomainErrorKind::Input(kind) => {
                debug!("Rejecting request: {kind:?}");
                json_error(StatusCode::BAD_REQUEST, input_message(&kind))
            }
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Provider(rejection) => {
                    warn!("Provider rejected token exchange: {}", rejection.status);
                    provider_passthrough(rejection)
                }
                ExternalErrorKind::Network => {
                    error!("Token exchange failed: {source:?}");
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Token exchange failed")
                }
                ExternalErrorKind::Timeout => {
                    error!("Token exchange timed out: {source:?}");
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Token exchange timed out")
                }
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Persistence => {
                    error!("Token persistence failed: {source:?}");
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store token")
                }
                InternalErrorKind::Config => {
                    error!("Configuration error: {source:?}");
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Relay is misconfigured")
                }
                InternalErrorKind::Other(message) => {
                    error!("Internal error: {message}: {source:?}");
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn domain_error(error_kind: DomainErrorKind) -> Error {
        Error(DomainError {
            source: None,
            error_kind,
        })
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn input_errors_are_400_with_json_error() {
        let response =
            domain_error(DomainErrorKind::Input(InputErrorKind::MissingCode)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Authorization code required"}"#
        );
    }

    #[tokio::test]
    async fn provider_rejection_keeps_status_body_and_content_type() {
        let response = domain_error(DomainErrorKind::External(ExternalErrorKind::Provider(
            ProviderRejection {
                status: 401,
                content_type: Some("application/json".to_string()),
                body: r#"{"error":"bad_verification_code"}"#.to_string(),
            },
        )))
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            body_string(response).await,
            r#"{"error":"bad_verification_code"}"#
        );
    }

    #[tokio::test]
    async fn provider_rejection_without_content_type_is_labelled_json() {
        let response = domain_error(DomainErrorKind::External(ExternalErrorKind::Provider(
            ProviderRejection {
                status: 400,
                content_type: None,
                body: r#"{"error":"incorrect_client_credentials"}"#.to_string(),
            },
        )))
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn timeouts_and_persistence_failures_are_500() {
        for kind in [
            DomainErrorKind::External(ExternalErrorKind::Timeout),
            DomainErrorKind::External(ExternalErrorKind::Network),
            DomainErrorKind::Internal(InternalErrorKind::Persistence),
        ] {
            let response = domain_error(kind).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
