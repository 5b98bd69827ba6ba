//! Live network adapter over `reqwest`.

use crate::error::{RedditError, RedditResult};
use crate::logging::log_error;
use crate::transport::{HttpAdapter, HttpRequest, HttpResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::collections::BTreeMap;

/// Sends requests over the network.
#[derive(Debug, Clone, Default)]
pub struct ReqwestAdapter {
    client: reqwest::Client,
}

impl ReqwestAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_headers(request: &HttpRequest) -> RedditResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RedditError::request_failed(format!("Invalid header name {name}: {e}"), None)
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                RedditError::request_failed(format!("Invalid value for header {name}: {e}"), None)
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl HttpAdapter for ReqwestAdapter {
    async fn send(&self, request: &HttpRequest) -> RedditResult<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            RedditError::request_failed(format!("Invalid method {}: {e}", request.method), None)
        })?;

        let mut builder = self
            .client
            .request(method, &request.uri)
            .headers(Self::build_headers(request)?);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            log_error!(
                uri = %request.uri,
                error = %e,
                "HTTP request failed"
            );
            RedditError::request_failed(format!("Request failed: {e}"), Some(Box::new(e)))
        })?;

        let status = response.status();
        let url = response.url().to_string();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let body = response.text().await.map_err(|e| {
            log_error!(
                error = %e,
                "Failed to read response body"
            );
            RedditError::response_parsing_error(format!("Failed to read response: {e}"))
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            url,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
