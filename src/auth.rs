//! OAuth2 token acquisition for the Reddit client.
//!
//! Every API call carries a bearer token from `/api/v1/access_token`. The
//! grant depends on the mode the client is in:
//!
//! | Mode | Grant |
//! |------|-------|
//! | read-only | `client_credentials` |
//! | password credentials | `password` |
//! | refresh token credentials | `refresh_token` |

use crate::client::error_for_status;
use crate::config::{Credentials, RedditConfig};
use crate::error::{RedditError, RedditResult};
use crate::internals::retry::RetryExecutor;
use crate::logging::{log_debug, log_info};
use crate::transport::{HttpRequest, Session};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Path of the token endpoint, relative to `reddit_url`.
pub const ACCESS_TOKEN_PATH: &str = "/api/v1/access_token";

// Refresh a little before Reddit considers the token expired.
const EXPIRY_MARGIN: Duration = Duration::from_secs(10);

// Upper bound on a token lifetime, whatever the server claims.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(86_400 * 365);

/// Base64 credential used in the `Authorization: Basic` header.
pub fn basic_auth_credential(client_id: &str, client_secret: Option<&str>) -> String {
    STANDARD.encode(format!("{client_id}:{}", client_secret.unwrap_or_default()))
}

#[derive(Debug, Clone)]
enum Grant {
    ClientCredentials,
    Password { username: String, password: String },
    RefreshToken { refresh_token: String },
}

impl Grant {
    fn name(&self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    fn form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![("grant_type", self.name())];
        match self {
            Self::ClientCredentials => {}
            Self::Password { username, password } => {
                form.push(("username", username));
                form.push(("password", password));
            }
            Self::RefreshToken { refresh_token } => {
                form.push(("refresh_token", refresh_token));
            }
        }
        form
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_valid(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// Fetches and caches bearer tokens for one grant.
#[derive(Debug)]
pub(crate) struct Authorizer {
    grant: Grant,
    token: Mutex<Option<AccessToken>>,
}

impl Authorizer {
    pub fn read_only() -> Self {
        Self::with_grant(Grant::ClientCredentials)
    }

    /// Authorizer acting as a user; `None` for application-only credentials.
    pub fn for_user(credentials: &Credentials) -> Option<Self> {
        let grant = match credentials {
            Credentials::Password { username, password } => Grant::Password {
                username: username.clone(),
                password: password.clone(),
            },
            Credentials::RefreshToken { refresh_token } => Grant::RefreshToken {
                refresh_token: refresh_token.clone(),
            },
            Credentials::ApplicationOnly => return None,
        };
        Some(Self::with_grant(grant))
    }

    fn with_grant(grant: Grant) -> Self {
        Self {
            grant,
            token: Mutex::new(None),
        }
    }

    /// Return a cached token, requesting a new one when missing or expired.
    pub async fn access_token(
        &self,
        session: &Session,
        config: &RedditConfig,
        retry: &RetryExecutor,
    ) -> RedditResult<String> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.value.clone());
        }

        let token = retry
            .execute(|| self.request_token(session, config))
            .await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    async fn request_token(
        &self,
        session: &Session,
        config: &RedditConfig,
    ) -> RedditResult<AccessToken> {
        let body = serde_urlencoded::to_string(self.grant.form()).map_err(|e| {
            RedditError::configuration_error(format!("Cannot encode token request: {e}"))
        })?;
        let credential =
            basic_auth_credential(&config.client_id, config.client_secret.as_deref());
        let request = HttpRequest::new(
            "POST",
            format!("{}{ACCESS_TOKEN_PATH}", config.reddit_url.trim_end_matches('/')),
        )
        .with_header("authorization", format!("Basic {credential}"))
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_body(body);

        log_debug!(grant = self.grant.name(), "Requesting access token");

        let response = session.send(request).await?;
        if let Some(error) = error_for_status(&response) {
            return Err(error);
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            RedditError::response_parsing_error(format!("Invalid token response: {e}"))
        })?;
        // Reddit reports bad passwords as 200 with an `error` field.
        if let Some(error) = parsed.error {
            return Err(RedditError::authentication_failed(format!(
                "{} grant rejected: {error}",
                self.grant.name()
            )));
        }
        let value = parsed.access_token.ok_or_else(|| {
            RedditError::response_parsing_error("Token response has no access_token")
        })?;
        let expires_in =
            Duration::from_secs(parsed.expires_in.unwrap_or(3600)).min(MAX_TOKEN_LIFETIME);

        log_info!(
            grant = self.grant.name(),
            expires_in_seconds = expires_in.as_secs(),
            "Access token acquired"
        );

        Ok(AccessToken {
            value,
            expires_at: Instant::now() + expires_in,
        })
    }

    pub fn grant_name(&self) -> &'static str {
        self.grant.name()
    }
}
