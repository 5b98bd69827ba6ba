//! Credentials used by recorded tests.
//!
//! Each key is read from `prawtest_{key}` and falls back to
//! `placeholder_{key}`, so replaying cassettes needs no real secrets.

use crate::auth::basic_auth_credential;
use crate::config::{Credentials, RedditConfig};
use crate::recorder::Placeholder;
use serde::{Deserialize, Serialize};

/// Value of `refresh_token` when no real token is configured.
pub const PLACEHOLDER_REFRESH_TOKEN: &str = "placeholder_refresh_token";

const ENV_PREFIX: &str = "prawtest_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    pub auth_code: String,
    pub client_id: String,
    pub client_secret: String,
    pub password: String,
    pub redirect_uri: String,
    pub test_subreddit: String,
    pub user_agent: String,
    pub username: String,
    pub refresh_token: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Placeholders {
    /// Read every key from `prawtest_{key}`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).unwrap_or_else(|| format!("placeholder_{key}"));
        Self {
            auth_code: value("auth_code"),
            client_id: value("client_id"),
            client_secret: value("client_secret"),
            password: value("password"),
            redirect_uri: value("redirect_uri"),
            test_subreddit: value("test_subreddit"),
            user_agent: value("user_agent"),
            username: value("username"),
            refresh_token: value("refresh_token"),
        }
    }

    /// Key/value pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("auth_code", self.auth_code.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("password", self.password.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("test_subreddit", self.test_subreddit.as_str()),
            ("user_agent", self.user_agent.as_str()),
            ("username", self.username.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
        ]
    }

    /// Whether a real refresh token is configured.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token != PLACEHOLDER_REFRESH_TOKEN
    }

    /// Cassette placeholders: `<CLIENT_ID>` and friends, plus `<BASIC_AUTH>`
    /// for the encoded client credentials.
    pub fn cassette_placeholders(&self) -> Vec<Placeholder> {
        let mut placeholders: Vec<Placeholder> = self
            .entries()
            .into_iter()
            .map(|(key, value)| Placeholder::new(format!("<{}>", key.to_uppercase()), value))
            .collect();
        placeholders.push(Placeholder::new(
            "<BASIC_AUTH>",
            basic_auth_credential(&self.client_id, Some(&self.client_secret)),
        ));
        placeholders
    }

    /// Client configuration acting as the test user with a password.
    pub fn password_config(&self) -> RedditConfig {
        RedditConfig::new(
            &self.client_id,
            Some(self.client_secret.clone()),
            &self.user_agent,
            Credentials::password(&self.username, &self.password),
        )
    }

    /// Client configuration acting as the test user with the refresh token.
    pub fn refresh_token_config(&self) -> RedditConfig {
        RedditConfig::new(
            &self.client_id,
            Some(self.client_secret.clone()),
            &self.user_agent,
            Credentials::refresh_token(&self.refresh_token),
        )
    }
}
