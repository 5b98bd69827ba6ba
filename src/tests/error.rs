// Unit Tests for Reddit Error Handling
//
// UNIT UNDER TEST: RedditError
//
// BUSINESS RESPONSIBILITY:
//   - Categorizes failures so callers can tell network trouble from fixture trouble
//   - Decides which failures the retry executor may retry
//   - Preserves context (status codes, cassette names, sources) for debugging
//
// TEST COVERAGE:
//   - Category and severity mapping for client, transient and fixture errors
//   - Retry classification
//   - Display messages carry the context a failing test needs

use crate::error::{ErrorCategory, ErrorSeverity, RedditError};
use std::error::Error as _;

#[cfg(test)]
mod reddit_error_tests {
    use super::*;

    #[test]
    fn test_read_only_mode_is_a_non_retryable_client_error() {
        // Arrange & Act
        let error = RedditError::read_only_mode("POST /api/comment");

        // Assert
        assert_eq!(error.category(), ErrorCategory::Client);
        assert_eq!(error.severity(), ErrorSeverity::Info);
        assert!(!error.is_retryable(), "Refusals must not be retried");
        assert_eq!(
            error.to_string(),
            "Client is in read-only mode, refusing POST /api/comment"
        );
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        let errors = [
            RedditError::rate_limit_exceeded(30),
            RedditError::timeout(16),
            RedditError::server_error(503),
            RedditError::request_failed("connection reset", None),
        ];

        for error in errors {
            assert!(error.is_retryable(), "{error} should be retryable");
        }
    }

    #[test]
    fn test_server_error_is_transient_but_response_error_is_client() {
        assert_eq!(
            RedditError::server_error(502).category(),
            ErrorCategory::Transient
        );
        assert_eq!(
            RedditError::response_error(404, "{}").category(),
            ErrorCategory::Client
        );
        assert!(!RedditError::response_error(404, "{}").is_retryable());
    }

    #[test]
    fn test_cassette_errors_are_fixture_errors() {
        // Test verifies cassette problems are reported as test setup issues,
        // never retried against the network

        let mismatch = RedditError::cassette_mismatch(
            "TestSubreddit.test_about",
            "GET",
            "https://oauth.reddit.com/r/redditdev/about?raw_json=1",
        );
        let io = RedditError::cassette_io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let format = RedditError::cassette_format("TestSubreddit.test_about", "EOF");
        let active = RedditError::cassette_already_active("TestSubreddit.test_about");

        for error in [&mismatch, &io, &format, &active] {
            assert_eq!(error.category(), ErrorCategory::Fixture);
            assert_eq!(error.severity(), ErrorSeverity::Error);
            assert!(!error.is_retryable());
        }
        assert!(mismatch.to_string().contains("TestSubreddit.test_about"));
        assert!(mismatch.to_string().contains("GET"));
    }

    #[test]
    fn test_cassette_io_keeps_source_error() {
        // Arrange
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        // Act
        let error = RedditError::cassette_io("/cassettes/a.json", source);

        // Assert
        assert!(error.source().is_some(), "I/O source should be preserved");
        assert!(error.to_string().contains("/cassettes/a.json"));
    }

    #[test]
    fn test_request_failed_keeps_optional_source() {
        let without = RedditError::request_failed("boom", None);
        assert!(without.source().is_none());

        let with = RedditError::request_failed(
            "boom",
            Some(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))),
        );
        assert!(with.source().is_some());
        assert_eq!(with.category(), ErrorCategory::External);
    }

    #[test]
    fn test_authentication_failed_is_client_error() {
        let error = RedditError::authentication_failed("invalid_grant");

        assert_eq!(error.category(), ErrorCategory::Client);
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "Authentication failed: invalid_grant");
    }
}
