//! Logging utilities for reddit-cassette
//!
//! Re-exports tracing macros with log_* naming so call sites read the same
//! across the client, the recorder and the test fixture.

pub(crate) use tracing::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
