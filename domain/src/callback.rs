//! Provider callback processing: validate, exchange, persist.

use log::*;
use relay_auth::oauth::token::TokenRecord;
use relay_auth::oauth::OpaqueState;

use crate::error::{DomainErrorKind, Error, InputErrorKind, InternalErrorKind};
use crate::oauth_relay::OAuthRelay;

impl OAuthRelay {
    /// Complete the authorization-code flow for a provider redirect.
    ///
    /// Validation happens before any outbound call: a missing `code` or `state`,
    /// or a state that does not decode to a place, fails without contacting the
    /// provider. On a successful exchange the record is written to the token
    /// store and returned once the write has completed. Nothing is written when
    /// the exchange fails.
    pub async fn complete_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<TokenRecord, Error> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::input(InputErrorKind::MissingCode))?;
        let raw_state = state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::input(InputErrorKind::MissingState))?;

        let state: OpaqueState = self.codec.decode(raw_state).inspect_err(|e| {
            warn!("Rejecting callback with undecodable state: {e}");
        })?;
        if state.place_id.is_empty() {
            warn!("Rejecting callback: state carries no placeID");
            return Err(Error::input(InputErrorKind::InvalidState));
        }

        let token = self
            .exchange_client
            .exchange_code(&self.oauth_config, &self.redirect_uri, code)
            .await?;

        let provider_status = token.status;
        let record = TokenRecord::new(state.place_id, state.viewer_id, token.entity);
        self.store
            .save(&self.namespace, &record.place_id, &record)
            .await
            .map_err(|e| {
                error!(
                    "Failed to persist token for place {}: {e}",
                    record.place_id
                );
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Persistence),
                }
            })?;

        info!(
            "Stored token for place {} (viewer {}, provider status {})",
            record.place_id, record.user_id, provider_status
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExternalErrorKind;
    use crate::oauth_relay::test_support;
    use async_trait::async_trait;
    use mockito::Server;
    use relay_auth::error::{storage_error, StorageErrorKind};
    use relay_auth::oauth::token::{MemoryStorage, Storage};
    use relay_auth::oauth::StateCodec;
    use serde_json::json;
    use std::sync::Arc;

    fn encoded_state(place_id: &str, viewer_id: &str) -> String {
        StateCodec::new()
            .encode(&OpaqueState::builder(place_id, viewer_id).build())
            .unwrap()
    }

    #[tokio::test]
    async fn successful_exchange_stores_and_returns_record() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"T1"}"#)
            .create_async()
            .await;
        let (relay, store) = test_support::relay(&server.url(), &[]);

        let record = relay
            .complete_callback(Some("abc"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap();

        let expected = TokenRecord::new(
            "P1".to_string(),
            "U1".to_string(),
            json!({"access_token": "T1"}),
        );
        assert_eq!(record, expected);
        assert_eq!(
            store.load("gitHubAccessTokens", "P1").await.unwrap(),
            Some(expected)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_code_fails_before_any_exchange() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/login/oauth/access_token")
            .expect(0)
            .create_async()
            .await;
        let (relay, store) = test_support::relay(&server.url(), &[]);

        let err = relay
            .complete_callback(None, Some(&encoded_state("P1", "U1")))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Input(InputErrorKind::MissingCode)
        );
        assert!(store.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_and_unparseable_state_are_rejected() {
        let (relay, _) = test_support::relay("http://127.0.0.1:9", &[]);

        let missing = relay.complete_callback(Some("abc"), None).await.unwrap_err();
        assert_eq!(
            missing.error_kind,
            DomainErrorKind::Input(InputErrorKind::MissingState)
        );

        let garbage = relay
            .complete_callback(Some("abc"), Some("%%%not-base64"))
            .await
            .unwrap_err();
        assert_eq!(
            garbage.error_kind,
            DomainErrorKind::Input(InputErrorKind::InvalidState)
        );

        // `{}` decodes, but names no place to store under.
        let empty = StateCodec::new().encode(&json!({})).unwrap();
        let no_place = relay
            .complete_callback(Some("abc"), Some(&empty))
            .await
            .unwrap_err();
        assert_eq!(
            no_place.error_kind,
            DomainErrorKind::Input(InputErrorKind::InvalidState)
        );
    }

    #[tokio::test]
    async fn provider_rejection_passes_through_without_write() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"bad_verification_code"}"#)
            .create_async()
            .await;
        let (relay, store) = test_support::relay(&server.url(), &[]);

        let err = relay
            .complete_callback(Some("abc"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap_err();

        match err.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Provider(rejection)) => {
                assert_eq!(rejection.status, 401);
                assert_eq!(rejection.body, r#"{"error":"bad_verification_code"}"#);
            }
            other => panic!("expected provider rejection, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn provider_redirect_is_a_rejection_without_write() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(302)
            .with_header("location", "/login")
            .create_async()
            .await;
        let (relay, store) = test_support::relay(&server.url(), &[]);

        let err = relay
            .complete_callback(Some("abc"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap_err();

        match err.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Provider(rejection)) => {
                assert_eq!(rejection.status, 302)
            }
            other => panic!("expected provider rejection, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stalled_provider_is_a_timeout_without_write() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let provider_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let (relay, store) =
            test_support::relay(&provider_url, &["--token-exchange-timeout-secs", "1"]);

        let err = relay
            .complete_callback(Some("abc"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Timeout)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn signed_relay_rejects_unsigned_state() {
        let (relay, _) = test_support::relay(
            "http://127.0.0.1:9",
            &["--state-signing-key", "state-secret"],
        );
        let err = relay
            .complete_callback(Some("abc"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Input(InputErrorKind::InvalidState)
        );
    }

    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn save(
            &self,
            _namespace: &str,
            _key: &str,
            _record: &TokenRecord,
        ) -> Result<(), relay_auth::Error> {
            Err(storage_error(StorageErrorKind::Database, "connection reset"))
        }

        async fn load(
            &self,
            _namespace: &str,
            _key: &str,
        ) -> Result<Option<TokenRecord>, relay_auth::Error> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn persistence_failure_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"access_token":"T1"}"#)
            .create_async()
            .await;
        let config = test_support::config(&server.url(), &[]);
        let relay = OAuthRelay::from_config(&config, Arc::new(FailingStorage)).unwrap();

        let err = relay
            .complete_callback(Some("abc"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Persistence)
        );
    }

    #[tokio::test]
    async fn repeated_callbacks_for_a_place_keep_the_latest_token() {
        let mut server = Server::new_async().await;
        let _first = server
            .mock("POST", "/login/oauth/access_token")
            .match_body(mockito::Matcher::UrlEncoded("code".into(), "one".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"T1"}"#)
            .create_async()
            .await;
        let _second = server
            .mock("POST", "/login/oauth/access_token")
            .match_body(mockito::Matcher::UrlEncoded("code".into(), "two".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"T2"}"#)
            .create_async()
            .await;
        let store = Arc::new(MemoryStorage::new());
        let config = test_support::config(&server.url(), &[]);
        let relay = OAuthRelay::from_config(&config, store.clone()).unwrap();

        relay
            .complete_callback(Some("one"), Some(&encoded_state("P1", "U1")))
            .await
            .unwrap();
        relay
            .complete_callback(Some("two"), Some(&encoded_state("P1", "U2")))
            .await
            .unwrap();

        let stored = store.load("gitHubAccessTokens", "P1").await.unwrap().unwrap();
        assert_eq!(stored.user_id, "U2");
        assert_eq!(stored.token, json!({"access_token": "T2"}));
        assert_eq!(store.len(), 1);
    }
}
