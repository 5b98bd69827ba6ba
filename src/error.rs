//! Error types for Reddit client and cassette operations.
//!
//! This module provides structured error handling for the client, the
//! recorder and the test fixture, including categorization, severity levels
//! and retry guidance.
//!
//! # Error Types
//!
//! The main error type is [`RedditError`], which covers all failure modes:
//! - Configuration errors (missing client id, missing credentials)
//! - Request failures (network issues, non-success responses)
//! - Rate limiting and timeouts
//! - Authentication failures
//! - Mutating calls attempted in read-only mode
//! - Cassette playback, storage and format errors
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use reddit_cassette::{RedditError, error::ErrorCategory};
//!
//! fn handle_error(err: RedditError) {
//!     if err.is_retryable() {
//!         println!("Retryable error: {}", err);
//!     }
//!
//!     match err.category() {
//!         ErrorCategory::Transient => println!("Temporary issue, try again later"),
//!         ErrorCategory::Client => println!("Fix the request and try again"),
//!         _ => println!("Service or test setup issue"),
//!     }
//! }
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
///
/// Use [`RedditError::category()`] to get the category for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Reddit or the network had an issue.
    External,

    /// Something is wrong with the local test setup (cassettes on disk,
    /// cassette contents that no longer match the code under test).
    Fixture,

    /// The caller made a mistake that they can fix (bad credentials,
    /// mutating call in read-only mode, invalid configuration).
    Client,

    /// Temporary failures that should be retried with backoff.
    Transient,
}

/// Severity level for logging decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Action failed and needs investigation.
    Error,

    /// Unexpected but recoverable situation.
    Warning,

    /// Expected refusal (e.g. read-only mode).
    Info,
}

// ============================================================================
// Reddit error types
// ============================================================================

/// Convenient result type for client, recorder and fixture operations.
pub type RedditResult<T> = std::result::Result<T, RedditError>;

/// Errors that can occur while talking to Reddit or replaying cassettes.
///
/// Use the constructor methods, which log the error at creation:
///
/// ```rust
/// use reddit_cassette::RedditError;
///
/// let err = RedditError::configuration_error("client_id is required");
/// let err = RedditError::read_only_mode("POST /api/comment");
/// ```
///
/// | Variant | Category | Retryable |
/// |---------|----------|-----------|
/// | `ConfigurationError` | Client | No |
/// | `RequestFailed` | External | Yes |
/// | `ResponseParsingError` | External | No |
/// | `RateLimitExceeded` | Transient | Yes |
/// | `Timeout` | Transient | Yes |
/// | `ServerError` | Transient | Yes |
/// | `ResponseError` | Client | No |
/// | `AuthenticationFailed` | Client | No |
/// | `ReadOnlyMode` | Client | No |
/// | `CassetteMismatch` | Fixture | No |
/// | `CassetteIo` | Fixture | No |
/// | `CassetteFormat` | Fixture | No |
/// | `CassetteAlreadyActive` | Fixture | No |
#[derive(Error, Debug)]
pub enum RedditError {
    /// Client configuration is invalid or incomplete.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The HTTP request could not be performed.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reddit returned a body that could not be parsed.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// Reddit is throttling requests.
    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        /// Recommended wait time before retrying.
        retry_after_seconds: u64,
    },

    /// Request timed out.
    #[error("Request timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },

    /// Reddit answered with a 5xx status.
    #[error("Server error {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// Reddit rejected the request with a non-success status.
    #[error("Response error {status}: {body}")]
    ResponseError {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The token endpoint or the API refused the credentials.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Details about the authentication failure.
        message: String,
    },

    /// A mutating call was attempted while the client is read-only.
    #[error("Client is in read-only mode, refusing {operation}")]
    ReadOnlyMode {
        /// The refused operation, e.g. `POST /api/comment`.
        operation: String,
    },

    /// Playback found no recorded interaction for a request.
    #[error("Cassette {cassette} has no interaction matching {method} {uri}")]
    CassetteMismatch {
        /// Name of the active cassette.
        cassette: String,
        /// Request method.
        method: String,
        /// Request URI.
        uri: String,
    },

    /// Reading, writing or renaming a cassette file failed.
    #[error("Cassette I/O failed for {path}: {source}")]
    CassetteIo {
        /// The file involved.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A cassette file could not be decoded or encoded.
    #[error("Cassette {cassette} is malformed: {message}")]
    CassetteFormat {
        /// Name of the cassette.
        cassette: String,
        /// Details about the problem.
        message: String,
    },

    /// A cassette was requested while another one is still mounted on the
    /// same session.
    #[error("Cannot insert cassette {cassette}: another cassette is active on this session")]
    CassetteAlreadyActive {
        /// Name of the refused cassette.
        cassette: String,
    },
}

impl RedditError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
            Self::RateLimitExceeded { .. } => ErrorCategory::Transient,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::ServerError { .. } => ErrorCategory::Transient,
            Self::ResponseError { .. } => ErrorCategory::Client,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
            Self::ReadOnlyMode { .. } => ErrorCategory::Client,
            Self::CassetteMismatch { .. } => ErrorCategory::Fixture,
            Self::CassetteIo { .. } => ErrorCategory::Fixture,
            Self::CassetteFormat { .. } => ErrorCategory::Fixture,
            Self::CassetteAlreadyActive { .. } => ErrorCategory::Fixture,
        }
    }

    /// Get the error severity for logging.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::ResponseParsingError { .. } => ErrorSeverity::Warning,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::ServerError { .. } => ErrorSeverity::Warning,
            Self::ResponseError { .. } => ErrorSeverity::Warning,
            Self::AuthenticationFailed { .. } => ErrorSeverity::Error,
            Self::ReadOnlyMode { .. } => ErrorSeverity::Info,
            Self::CassetteMismatch { .. } => ErrorSeverity::Error,
            Self::CassetteIo { .. } => ErrorSeverity::Error,
            Self::CassetteFormat { .. } => ErrorSeverity::Error,
            Self::CassetteAlreadyActive { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether this error is transient and should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. }
                | Self::Timeout { .. }
                | Self::RequestFailed { .. }
                | Self::ServerError { .. }
        )
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Reddit client configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "HTTP request execution failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Reddit response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn rate_limit_exceeded(retry_after_seconds: u64) -> Self {
        log_warn!(
            error_type = "rate_limit_exceeded",
            retry_after_seconds = retry_after_seconds,
            "Reddit rate limit exceeded"
        );
        Self::RateLimitExceeded {
            retry_after_seconds,
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Reddit request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn server_error(status: u16) -> Self {
        log_warn!(
            error_type = "server_error",
            status = status,
            "Reddit returned a server error"
        );
        Self::ServerError { status }
    }

    pub fn response_error(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        log_warn!(
            error_type = "response_error",
            status = status,
            body = %body,
            "Reddit rejected the request"
        );
        Self::ResponseError { status, body }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            message = %message,
            "Reddit authentication failed"
        );
        Self::AuthenticationFailed { message }
    }

    pub fn read_only_mode(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        log_warn!(
            error_type = "read_only_mode",
            operation = %operation,
            "Refusing mutating call in read-only mode"
        );
        Self::ReadOnlyMode { operation }
    }

    pub fn cassette_mismatch(
        cassette: impl Into<String>,
        method: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        let cassette = cassette.into();
        let method = method.into();
        let uri = uri.into();
        log_error!(
            error_type = "cassette_mismatch",
            cassette = %cassette,
            method = %method,
            uri = %uri,
            "No recorded interaction matches the request"
        );
        Self::CassetteMismatch {
            cassette,
            method,
            uri,
        }
    }

    pub fn cassette_io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().display().to_string();
        log_error!(
            error_type = "cassette_io",
            path = %path,
            error = %source,
            "Cassette file operation failed"
        );
        Self::CassetteIo { path, source }
    }

    pub fn cassette_format(cassette: impl Into<String>, message: impl Into<String>) -> Self {
        let cassette = cassette.into();
        let message = message.into();
        log_error!(
            error_type = "cassette_format",
            cassette = %cassette,
            message = %message,
            "Cassette contents could not be processed"
        );
        Self::CassetteFormat { cassette, message }
    }

    pub fn cassette_already_active(cassette: impl Into<String>) -> Self {
        let cassette = cassette.into();
        log_error!(
            error_type = "cassette_already_active",
            cassette = %cassette,
            "Refusing to insert a cassette over an active one"
        );
        Self::CassetteAlreadyActive { cassette }
    }
}
