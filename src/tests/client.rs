// Unit Tests for the Reddit Client
//
// UNIT UNDER TEST: Reddit
//
// BUSINESS RESPONSIBILITY:
//   - Sends every API call through the injected session with a bearer token
//   - Starts in read-only mode and refuses mutating calls until it is disabled
//   - Picks the token grant from the read-only flag and the configured credentials
//   - Maps Reddit status codes onto error variants
//
// TEST COVERAGE:
//   - Construction and session user agent
//   - Read-only gating of POST and me()
//   - Token acquisition, caching and grant selection
//   - Status code mapping

use crate::client::{error_for_status, USER_AGENT_SUFFIX};
use crate::config::{Credentials, RedditConfig};
use crate::error::RedditError;
use crate::tests::helpers::{
    json_response, listing_response, no_retry_policy, token_response, ScriptedAdapter,
};
use crate::transport::Session;
use crate::Reddit;
use serde_json::json;

const TOKEN_URI: &str = "https://www.reddit.com/api/v1/access_token";
const ABOUT_URI: &str = "https://oauth.reddit.com/r/redditdev/about?raw_json=1";

fn config(credentials: Credentials) -> RedditConfig {
    let mut config = RedditConfig::new(
        "client-id",
        Some("client-secret".to_string()),
        "test-agent/1.0",
        credentials,
    );
    config.retry_policy = no_retry_policy();
    config
}

fn password_config() -> RedditConfig {
    config(Credentials::password("someone", "hunter2"))
}

#[cfg(test)]
mod construction_tests {
    use super::*;

    #[test]
    fn test_new_client_is_read_only() {
        let session = Session::with_adapter(ScriptedAdapter::new(vec![]));

        let reddit = Reddit::new(password_config(), session).unwrap();

        assert!(reddit.read_only(), "Clients must start read-only");
    }

    #[test]
    fn test_new_client_sets_session_user_agent() {
        // Arrange
        let session = Session::with_adapter(ScriptedAdapter::new(vec![]));

        // Act
        let reddit = Reddit::new(password_config(), session.clone()).unwrap();

        // Assert
        assert!(reddit.session().same_session(&session));
        assert_eq!(
            session.header("user-agent"),
            Some(format!("test-agent/1.0 {USER_AGENT_SUFFIX}"))
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = password_config();
        config.client_id.clear();

        let result = Reddit::new(config, Session::with_adapter(ScriptedAdapter::new(vec![])));

        assert!(matches!(result, Err(RedditError::ConfigurationError { .. })));
    }

    #[test]
    fn test_application_only_client_cannot_leave_read_only() {
        let mut reddit = Reddit::new(
            config(Credentials::ApplicationOnly),
            Session::with_adapter(ScriptedAdapter::new(vec![])),
        )
        .unwrap();

        let result = reddit.set_read_only(false);

        assert!(result.is_err());
        assert!(reddit.read_only());
        assert!(reddit.set_read_only(true).is_ok());
    }
}

#[cfg(test)]
mod request_tests {
    use super::*;

    #[tokio::test]
    async fn test_read_only_get_uses_client_credentials_grant() {
        // Arrange
        let adapter = ScriptedAdapter::new(vec![token_response("app-token"), listing_response(ABOUT_URI)]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();

        // Act
        let about = reddit.get("/r/redditdev/about", &[]).await.unwrap();

        // Assert
        assert_eq!(about["data"]["display_name"], "redditdev");
        let sent = adapter.requests();
        assert_eq!(sent.len(), 2);

        assert_eq!(sent[0].method, "POST");
        assert_eq!(sent[0].uri, TOKEN_URI);
        assert_eq!(sent[0].body.as_deref(), Some("grant_type=client_credentials"));
        assert_eq!(
            sent[0].header("authorization"),
            Some("Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=")
        );

        assert_eq!(sent[1].method, "GET");
        assert_eq!(sent[1].uri, ABOUT_URI);
        assert_eq!(sent[1].header("authorization"), Some("bearer app-token"));
    }

    #[tokio::test]
    async fn test_huge_token_lifetime_is_capped() {
        // Test verifies a token endpoint claiming an absurd lifetime still
        // yields a usable token

        // Arrange
        let adapter = ScriptedAdapter::new(vec![
            json_response(
                200,
                TOKEN_URI,
                json!({"access_token": "t", "token_type": "bearer", "expires_in": u64::MAX}),
            ),
            listing_response(ABOUT_URI),
        ]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();

        // Act
        let about = reddit.get("/r/redditdev/about", &[]).await.unwrap();

        // Assert
        assert_eq!(about["data"]["display_name"], "redditdev");
        assert_eq!(adapter.requests()[1].header("authorization"), Some("bearer t"));
    }

    #[tokio::test]
    async fn test_query_parameters_follow_raw_json() {
        let uri = "https://oauth.reddit.com/r/redditdev/new?raw_json=1&limit=5";
        let adapter = ScriptedAdapter::new(vec![token_response("t"), listing_response(uri)]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();

        reddit.get("r/redditdev/new", &[("limit", "5")]).await.unwrap();

        assert_eq!(adapter.requests()[1].uri, uri);
    }

    #[tokio::test]
    async fn test_access_token_is_cached_between_requests() {
        // Arrange
        let adapter = ScriptedAdapter::new(vec![
            token_response("app-token"),
            listing_response(ABOUT_URI),
            listing_response(ABOUT_URI),
        ]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();

        // Act
        reddit.get("/r/redditdev/about", &[]).await.unwrap();
        reddit.get("/r/redditdev/about", &[]).await.unwrap();

        // Assert
        let token_requests = adapter
            .requests()
            .iter()
            .filter(|r| r.uri == TOKEN_URI)
            .count();
        assert_eq!(token_requests, 1, "Token should be fetched once");
    }

    #[tokio::test]
    async fn test_post_is_refused_while_read_only() {
        // Test verifies mutating calls never reach the network in read-only mode

        // Arrange
        let adapter = ScriptedAdapter::new(vec![]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();

        // Act
        let result = reddit.post("/api/comment", &[("text", "hi")]).await;

        // Assert
        match result {
            Err(RedditError::ReadOnlyMode { operation }) => {
                assert_eq!(operation, "POST /api/comment");
            }
            other => panic!("Expected ReadOnlyMode, got {other:?}"),
        }
        assert!(adapter.requests().is_empty());
    }

    #[tokio::test]
    async fn test_post_after_disabling_read_only_uses_password_grant() {
        // Arrange
        let comment_uri = "https://oauth.reddit.com/api/comment?raw_json=1";
        let adapter = ScriptedAdapter::new(vec![
            token_response("user-token"),
            json_response(200, comment_uri, json!({"json": {"errors": []}})),
        ]);
        let mut reddit =
            Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();
        reddit.set_read_only(false).unwrap();

        // Act
        let result = reddit
            .post("/api/comment", &[("thing_id", "t3_abc"), ("text", "hi there")])
            .await
            .unwrap();

        // Assert
        assert_eq!(result["json"]["errors"], json!([]));
        let sent = adapter.requests();
        assert_eq!(
            sent[0].body.as_deref(),
            Some("grant_type=password&username=someone&password=hunter2")
        );
        assert_eq!(sent[1].method, "POST");
        assert_eq!(sent[1].uri, comment_uri);
        assert_eq!(sent[1].body.as_deref(), Some("thing_id=t3_abc&text=hi+there"));
        assert_eq!(
            sent[1].header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(sent[1].header("authorization"), Some("bearer user-token"));
    }

    #[tokio::test]
    async fn test_refresh_token_credentials_use_refresh_grant() {
        let me_uri = "https://oauth.reddit.com/api/v1/me?raw_json=1";
        let adapter = ScriptedAdapter::new(vec![
            token_response("user-token"),
            json_response(200, me_uri, json!({"name": "someone"})),
        ]);
        let mut reddit = Reddit::new(
            config(Credentials::refresh_token("refresh-abc")),
            Session::with_adapter(adapter.clone()),
        )
        .unwrap();
        reddit.set_read_only(false).unwrap();

        let me = reddit.me().await.unwrap();

        assert_eq!(me, Some(json!({"name": "someone"})));
        assert_eq!(
            adapter.requests()[0].body.as_deref(),
            Some("grant_type=refresh_token&refresh_token=refresh-abc")
        );
    }

    #[tokio::test]
    async fn test_me_is_none_while_read_only() {
        let adapter = ScriptedAdapter::new(vec![]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();

        assert_eq!(reddit.me().await.unwrap(), None);
        assert!(adapter.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_password_grant_is_authentication_failure() {
        // Arrange
        let adapter = ScriptedAdapter::new(vec![json_response(
            200,
            TOKEN_URI,
            json!({"error": "invalid_grant"}),
        )]);
        let mut reddit =
            Reddit::new(password_config(), Session::with_adapter(adapter.clone())).unwrap();
        reddit.set_read_only(false).unwrap();

        // Act
        let result = reddit.me().await;

        // Assert
        match result {
            Err(RedditError::AuthenticationFailed { message }) => {
                assert!(message.contains("invalid_grant"), "got: {message}");
            }
            other => panic!("Expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let mut empty = json_response(200, ABOUT_URI, json!({}));
        empty.body = String::new();
        let adapter = ScriptedAdapter::new(vec![token_response("t"), empty]);
        let reddit = Reddit::new(password_config(), Session::with_adapter(adapter)).unwrap();

        let value = reddit.get("/r/redditdev/about", &[]).await.unwrap();

        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let adapter = ScriptedAdapter::new(vec![
            token_response("t"),
            json_response(404, ABOUT_URI, json!({"message": "Not Found"})),
        ]);
        let mut config = password_config();
        config.retry_policy = crate::RetryPolicy::default();
        let reddit = Reddit::new(config, Session::with_adapter(adapter.clone())).unwrap();

        let result = reddit.get("/r/redditdev/about", &[]).await;

        assert!(matches!(result, Err(RedditError::ResponseError { status: 404, .. })));
        assert_eq!(adapter.requests().len(), 2, "404 must not be retried");
    }
}

#[cfg(test)]
mod status_mapping_tests {
    use super::*;

    #[test]
    fn test_success_maps_to_none() {
        assert!(error_for_status(&listing_response(ABOUT_URI)).is_none());
    }

    #[test]
    fn test_status_codes_map_to_error_variants() {
        let cases = [
            (401, "AuthenticationFailed"),
            (403, "AuthenticationFailed"),
            (404, "ResponseError"),
            (500, "ServerError"),
            (503, "ServerError"),
        ];

        for (status, expected) in cases {
            let error = error_for_status(&json_response(status, ABOUT_URI, json!({}))).unwrap();
            let actual = match error {
                RedditError::AuthenticationFailed { .. } => "AuthenticationFailed",
                RedditError::ResponseError { .. } => "ResponseError",
                RedditError::ServerError { .. } => "ServerError",
                _ => "other",
            };
            assert_eq!(actual, expected, "status {status}");
        }
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut response = json_response(429, ABOUT_URI, json!({}));
        response
            .headers
            .insert("retry-after".to_string(), "7".to_string());

        let error = error_for_status(&response).unwrap();

        assert!(matches!(
            error,
            RedditError::RateLimitExceeded {
                retry_after_seconds: 7
            }
        ));
    }

    #[test]
    fn test_rate_limit_defaults_to_sixty_seconds() {
        let error = error_for_status(&json_response(429, ABOUT_URI, json!({}))).unwrap();

        assert!(matches!(
            error,
            RedditError::RateLimitExceeded {
                retry_after_seconds: 60
            }
        ));
    }
}
