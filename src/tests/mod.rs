// Test modules for reddit-cassette
//
// Each source module has a corresponding test file that focuses on the
// behavior callers rely on.

// Scripted transport and canned responses shared by the unit tests
pub mod helpers;

pub mod client;
pub mod error;

// NOTE: Tests that talk HTTP to a mock server live in tests/ (wiremock)
