use crate::auth::Authorizer;
use crate::config::RedditConfig;
use crate::error::{RedditError, RedditResult};
use crate::internals::retry::RetryExecutor;
use crate::logging::log_debug;
use crate::transport::{HttpRequest, HttpResponse, Session};
use serde_json::Value;

/// Suffix appended to the configured user agent.
pub const USER_AGENT_SUFFIX: &str = concat!("reddit-cassette/", env!("CARGO_PKG_VERSION"));

/// Map a non-success response to the matching error
///
/// Returns `None` for 2xx responses.
pub(crate) fn error_for_status(response: &HttpResponse) -> Option<RedditError> {
    match response.status {
        200..=299 => None,
        401 | 403 => Some(RedditError::authentication_failed(format!(
            "{} {} for {}",
            response.status, response.reason, response.url
        ))),
        429 => {
            let retry_after_seconds = response
                .header("retry-after")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(60);
            Some(RedditError::rate_limit_exceeded(retry_after_seconds))
        }
        500..=599 => Some(RedditError::server_error(response.status)),
        status => Some(RedditError::response_error(status, response.body.clone())),
    }
}

/// Reddit API client
///
/// The client sends every request through an injected [`Session`], so a
/// recorder mounted on that session sees all traffic, token requests
/// included. A new client starts in read-only mode: `GET` requests use an
/// application token and mutating requests are refused until
/// [`set_read_only(false)`](Self::set_read_only).
#[derive(Debug)]
pub struct Reddit {
    config: RedditConfig,
    session: Session,
    read_only: bool,
    retry: RetryExecutor,
    read_only_authorizer: Authorizer,
    user_authorizer: Option<Authorizer>,
}

impl Reddit {
    /// Create a client on top of an existing session
    ///
    /// Sets the session `User-Agent` header.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::ConfigurationError`] if the configuration fails
    /// [`RedditConfig::validate`].
    pub fn new(config: RedditConfig, session: Session) -> RedditResult<Self> {
        config.validate()?;

        session.set_header(
            "user-agent",
            format!("{} {USER_AGENT_SUFFIX}", config.user_agent),
        );

        log_debug!(
            credentials = config.credentials.mode_name(),
            has_client_secret = config.client_secret.is_some(),
            oauth_url = %config.oauth_url,
            "Reddit client created"
        );

        Ok(Self {
            retry: RetryExecutor::new(config.retry_policy.clone()),
            read_only_authorizer: Authorizer::read_only(),
            user_authorizer: Authorizer::for_user(&config.credentials),
            read_only: true,
            config,
            session,
        })
    }

    /// Create a client from `praw_*` environment variables on a live session
    pub fn from_env() -> RedditResult<Self> {
        Self::new(RedditConfig::from_env()?, Session::new())
    }

    pub fn config(&self) -> &RedditConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Switch read-only mode on or off
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::ConfigurationError`] when disabling read-only
    /// mode on a client that only has application credentials.
    pub fn set_read_only(&mut self, read_only: bool) -> RedditResult<()> {
        if !read_only && self.user_authorizer.is_none() {
            return Err(RedditError::configuration_error(
                "read_only cannot be disabled: only application credentials are configured",
            ));
        }
        log_debug!(read_only = read_only, "Reddit read-only mode changed");
        self.read_only = read_only;
        Ok(())
    }

    fn authorizer(&self) -> &Authorizer {
        match (&self.user_authorizer, self.read_only) {
            (Some(user), false) => user,
            _ => &self.read_only_authorizer,
        }
    }

    fn api_url(&self, path: &str, params: &[(&str, &str)]) -> RedditResult<String> {
        let base = format!(
            "{}/{}",
            self.config.oauth_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let pairs = std::iter::once(("raw_json", "1")).chain(params.iter().copied());
        reqwest::Url::parse_with_params(&base, pairs)
            .map(String::from)
            .map_err(|e| RedditError::configuration_error(format!("Invalid API URL {base}: {e}")))
    }

    async fn send_once(
        &self,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> RedditResult<HttpResponse> {
        let token = self
            .authorizer()
            .access_token(&self.session, &self.config, &self.retry)
            .await?;
        let mut request =
            HttpRequest::new(method, uri).with_header("authorization", format!("bearer {token}"));
        if let Some(body) = body {
            request = request
                .with_header("content-type", "application/x-www-form-urlencoded")
                .with_body(body);
        }

        let response = self.session.send(request).await?;
        match error_for_status(&response) {
            Some(error) => Err(error),
            None => Ok(response),
        }
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&[(&str, &str)]>,
    ) -> RedditResult<Value> {
        let uri = self.api_url(path, params)?;
        let body = form
            .map(serde_urlencoded::to_string)
            .transpose()
            .map_err(|e| RedditError::configuration_error(format!("Cannot encode form: {e}")))?;

        let (uri, body) = (uri.as_str(), body.as_deref());
        let response = self
            .retry
            .execute(|| self.send_once(method, uri, body))
            .await?;

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| {
            RedditError::response_parsing_error(format!("Invalid JSON from {path}: {e}"))
        })
    }

    /// `GET` an API path, e.g. `/r/redditdev/about`
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> RedditResult<Value> {
        self.request("GET", path, params, None).await
    }

    /// `POST` a form to an API path
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::ReadOnlyMode`] without touching the network
    /// while the client is read-only.
    pub async fn post(&self, path: &str, data: &[(&str, &str)]) -> RedditResult<Value> {
        if self.read_only {
            return Err(RedditError::read_only_mode(format!("POST {path}")));
        }
        self.request("POST", path, &[], Some(data)).await
    }

    /// The authenticated account, or `None` while read-only
    pub async fn me(&self) -> RedditResult<Option<Value>> {
        if self.read_only {
            return Ok(None);
        }
        self.get("/api/v1/me", &[]).await.map(Some)
    }
}
