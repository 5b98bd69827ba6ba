//! Internal utilities for reddit-cassette
//!
//! Implementation details that are not part of the public API. `RetryPolicy`
//! is re-exported through `lib.rs` for configuration.

pub mod retry;
