//! # reddit-cassette
//!
//! Reddit API client with cassette-based HTTP record/replay for integration
//! tests.
//!
//! ## Key Features
//!
//! - **Injectable transport**: the client sends everything through a shared
//!   [`Session`], so anything mounted on the session sees all traffic
//! - **Read-only by default**: mutating calls are refused until explicitly
//!   enabled
//! - **Cassettes**: record HTTP exchanges once, replay them in every later
//!   run, with secrets replaced by placeholders on disk
//! - **Test fixture**: [`testing::IntegrationTest`] names each cassette after
//!   the test that uses it
//!
//! ## Example
//!
//! ```rust,no_run
//! use reddit_cassette::{Credentials, Reddit, RedditConfig, Session};
//!
//! # async fn example() -> reddit_cassette::RedditResult<()> {
//! let config = RedditConfig::new(
//!     "client-id",
//!     Some("client-secret".to_string()),
//!     "my-bot/0.1 by u/someone",
//!     Credentials::password("someone", "hunter2"),
//! );
//! let mut reddit = Reddit::new(config, Session::new())?;
//! let about = reddit.get("/r/rust/about", &[]).await?;
//! println!("{}", about["data"]["title"]);
//!
//! reddit.set_read_only(false)?;
//! let me = reddit.me().await?;
//! # Ok(())
//! # }
//! ```

// Errors are documented on the error type and its constructors
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub(crate) mod internals;

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod recorder;
pub mod testing;
pub mod transport;

#[cfg(test)]
pub mod tests;

pub use internals::retry;

// Re-export main types
pub use client::Reddit;
pub use config::{Credentials, RedditConfig};
pub use error::{RedditError, RedditResult};
pub use retry::RetryPolicy;
pub use transport::{HttpAdapter, HttpRequest, HttpResponse, ReqwestAdapter, Session};
