//! Test helper utilities for unit tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

use crate::error::{RedditError, RedditResult};
use crate::retry::RetryPolicy;
use crate::testing::Placeholders;
use crate::transport::{HttpAdapter, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Adapter answering from a fixed script and remembering what it was sent
#[derive(Default)]
pub struct ScriptedAdapter {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedAdapter {
    pub fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpAdapter for ScriptedAdapter {
    async fn send(&self, request: &HttpRequest) -> RedditResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RedditError::request_failed("script exhausted", None))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn json_response(status: u16, url: &str, body: serde_json::Value) -> HttpResponse {
    let mut headers = BTreeMap::new();
    headers.insert(
        "content-type".to_string(),
        "application/json; charset=UTF-8".to_string(),
    );
    HttpResponse {
        status,
        reason: if status == 200 { "OK" } else { "" }.to_string(),
        headers,
        body: body.to_string(),
        url: url.to_string(),
    }
}

pub fn token_response(token: &str) -> HttpResponse {
    json_response(
        200,
        "https://www.reddit.com/api/v1/access_token",
        serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*",
        }),
    )
}

pub fn listing_response(uri: &str) -> HttpResponse {
    json_response(
        200,
        uri,
        serde_json::json!({"kind": "t5", "data": {"display_name": "redditdev"}}),
    )
}

pub fn no_retry_policy() -> RetryPolicy {
    RetryPolicy::no_retry()
}

/// Placeholders with a real-looking refresh token
pub fn placeholders_with_refresh_token() -> Placeholders {
    Placeholders {
        refresh_token: "real-refresh-token".to_string(),
        ..Placeholders::default()
    }
}
