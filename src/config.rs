use crate::error::{RedditError, RedditResult};
use crate::logging::log_debug;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default endpoint for the token exchange.
pub const DEFAULT_REDDIT_URL: &str = "https://www.reddit.com";

/// Default endpoint for authenticated API calls.
pub const DEFAULT_OAUTH_URL: &str = "https://oauth.reddit.com";

/// How the client authenticates for non-read-only calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Credentials {
    /// Script app acting as a user.
    Password { username: String, password: String },
    /// Previously authorized user, refreshed on demand.
    RefreshToken { refresh_token: String },
    /// Client credentials only; the client can never leave read-only mode.
    ApplicationOnly,
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn refresh_token(refresh_token: impl Into<String>) -> Self {
        Self::RefreshToken {
            refresh_token: refresh_token.into(),
        }
    }

    /// Whether these credentials can authorize a user (and thus mutating calls).
    pub fn authorizes_user(&self) -> bool {
        !matches!(self, Self::ApplicationOnly)
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
            Self::ApplicationOnly => "application_only",
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::RefreshToken { .. } => f
                .debug_struct("RefreshToken")
                .field("refresh_token", &"***")
                .finish(),
            Self::ApplicationOnly => f.write_str("ApplicationOnly"),
        }
    }
}

/// Reddit client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub user_agent: String,
    pub credentials: Credentials,
    /// Base URL of the token endpoint host
    pub reddit_url: String,
    /// Base URL for authenticated API calls
    pub oauth_url: String,
    pub retry_policy: RetryPolicy,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            user_agent: String::new(),
            credentials: Credentials::ApplicationOnly,
            reddit_url: DEFAULT_REDDIT_URL.to_string(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl RedditConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        user_agent: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            user_agent: user_agent.into(),
            credentials,
            ..Self::default()
        }
    }

    /// Validate the configuration is complete
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::ConfigurationError`] if:
    /// - `client_id` or `user_agent` is empty
    /// - password credentials have an empty username or password
    /// - refresh token credentials have an empty token
    /// - a base URL is not absolute http(s)
    pub fn validate(&self) -> RedditResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(RedditError::configuration_error("client_id is required"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(RedditError::configuration_error("user_agent is required"));
        }

        match &self.credentials {
            Credentials::Password { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(RedditError::configuration_error(
                        "username and password must both be set",
                    ));
                }
            }
            Credentials::RefreshToken { refresh_token } => {
                if refresh_token.is_empty() {
                    return Err(RedditError::configuration_error(
                        "refresh_token must not be empty",
                    ));
                }
            }
            Credentials::ApplicationOnly => {}
        }

        for (name, url) in [("reddit_url", &self.reddit_url), ("oauth_url", &self.oauth_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RedditError::configuration_error(format!(
                    "{name} must be an absolute http(s) URL, got {url:?}"
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from `praw_*` environment variables
    ///
    /// `praw_refresh_token` takes precedence over `praw_username` and
    /// `praw_password`; with neither the client is application-only.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::ConfigurationError`] if the resulting
    /// configuration fails [`validate`](Self::validate).
    pub fn from_env() -> RedditResult<Self> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let credentials = match (
            var("praw_refresh_token"),
            var("praw_username"),
            var("praw_password"),
        ) {
            (Some(refresh_token), _, _) => Credentials::RefreshToken { refresh_token },
            (None, Some(username), Some(password)) => Credentials::Password { username, password },
            _ => Credentials::ApplicationOnly,
        };

        let mut config = Self::new(
            var("praw_client_id").unwrap_or_default(),
            var("praw_client_secret"),
            var("praw_user_agent").unwrap_or_default(),
            credentials,
        );
        if let Some(url) = var("praw_reddit_url") {
            config.reddit_url = url;
        }
        if let Some(url) = var("praw_oauth_url") {
            config.oauth_url = url;
        }

        config.validate()?;

        log_debug!(
            credentials = config.credentials.mode_name(),
            has_client_secret = config.client_secret.is_some(),
            oauth_url = %config.oauth_url,
            "Reddit configuration loaded from environment"
        );

        Ok(config)
    }
}
