//! Test helper utilities for reddit-cassette integration tests
//!
//! This module provides reusable wiremock fixtures shared across the test
//! files in this directory.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use reddit_cassette::recorder::{AccessTokenFilter, RecorderConfig};
use reddit_cassette::testing::Placeholders;
use reddit_cassette::{Credentials, RedditConfig, RetryPolicy};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "secret-access-token";

/// Retry policy with millisecond delays so retry tests stay fast
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(2),
    }
}

/// Credentials that look real, so scrubbing can be checked on disk
pub fn recording_placeholders() -> Placeholders {
    Placeholders {
        client_id: "real-client-id".to_string(),
        client_secret: "real-client-secret".to_string(),
        username: "real-user".to_string(),
        password: "real-password".to_string(),
        user_agent: "real-agent/1.0".to_string(),
        ..Placeholders::default()
    }
}

/// Point a configuration at the mock server for both token and API calls
pub fn point_at(mut config: RedditConfig, server: &MockServer) -> RedditConfig {
    config.reddit_url = server.uri();
    config.oauth_url = server.uri();
    config.retry_policy = fast_retry_policy();
    config
}

/// Password configuration talking to the mock server
pub fn mock_config(server: &MockServer) -> RedditConfig {
    point_at(
        RedditConfig::new(
            "client-id",
            Some("client-secret".to_string()),
            "integration-agent/1.0",
            Credentials::password("someone", "hunter2"),
        ),
        server,
    )
}

/// Recorder configuration the fixture would build for `placeholders`
pub fn recorder_config(dir: &Path, placeholders: &Placeholders) -> RecorderConfig {
    RecorderConfig::new(dir)
        .with_placeholders(placeholders.cassette_placeholders())
        .with_before_record(Arc::new(AccessTokenFilter::default()))
}

pub fn token_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 86400,
        "scope": "*",
    })
}

pub fn about_body() -> Value {
    json!({
        "kind": "t5",
        "data": {
            "display_name": "redditdev",
            "title": "reddit Development",
        }
    })
}

pub fn me_body() -> Value {
    json!({ "name": "real-user", "link_karma": 1 })
}

/// Mount a token endpoint answering with `token`
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .mount(server)
        .await;
}

/// Mount a `GET` endpoint answering with `body`
pub async fn mount_get(server: &MockServer, api_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(api_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
