//! Error types for the `domain` layer.
use entity_api::error::Error as EntityApiError;
use relay_auth::error::{
    Error as RelayAuthError, ErrorKind as RelayAuthErrorKind, HttpErrorKind, OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

pub use relay_auth::error::ProviderRejection;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Lower layers (`relay_auth`, `entity_api`) are translated here so
/// that `web` only ever matches on `DomainErrorKind` to pick a status code.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    /// The caller sent something unusable. Always a client error.
    Input(InputErrorKind),
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Malformed or missing request input.
#[derive(Debug, PartialEq)]
pub enum InputErrorKind {
    MissingCode,
    MissingState,
    InvalidState,
    InvalidContext,
    InvalidExtraAuthParams,
    MissingParameter(String),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Persistence,
    Other(String),
}

/// Errors caused by the OAuth2 provider or the network path to it.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Timeout,
    /// The provider rejected the code exchange; its response is passed through.
    Provider(ProviderRejection),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Error {
    pub(crate) fn input(kind: InputErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Input(kind),
        }
    }

    pub(crate) fn config(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Persistence),
        }
    }
}

impl From<RelayAuthError> for Error {
    fn from(err: RelayAuthError) -> Self {
        let error_kind = match &err.error_kind {
            RelayAuthErrorKind::State(_) => DomainErrorKind::Input(InputErrorKind::InvalidState),
            RelayAuthErrorKind::OAuth(OAuthErrorKind::ProviderRejected(rejection)) => {
                DomainErrorKind::External(ExternalErrorKind::Provider(rejection.clone()))
            }
            RelayAuthErrorKind::Storage(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Persistence)
            }
            RelayAuthErrorKind::Http(HttpErrorKind::Timeout) => {
                DomainErrorKind::External(ExternalErrorKind::Timeout)
            }
            // Client construction fails before any network call is made.
            RelayAuthErrorKind::Http(HttpErrorKind::BuilderFailed) => DomainErrorKind::Internal(
                InternalErrorKind::Other("Failed to build HTTP client".to_string()),
            ),
            RelayAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_auth::error::{oauth_error, state_error, storage_error, StateErrorKind, StorageErrorKind};

    #[test]
    fn state_errors_become_invalid_state_input() {
        let err: Error = state_error(StateErrorKind::Base64, "bad base64").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Input(InputErrorKind::InvalidState)
        );
    }

    #[test]
    fn provider_rejection_is_carried_through() {
        let rejection = ProviderRejection {
            status: 401,
            content_type: Some("application/json".to_string()),
            body: r#"{"error":"bad_verification_code"}"#.to_string(),
        };
        let err: Error = oauth_error(
            OAuthErrorKind::ProviderRejected(rejection.clone()),
            "rejected",
        )
        .into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider(rejection))
        );
    }

    #[test]
    fn storage_errors_become_persistence_errors() {
        let err: Error = storage_error(StorageErrorKind::Database, "connection refused").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Persistence)
        );
        assert!(err.source().is_some());
    }
}
