//! Integration test fixture
//!
//! [`IntegrationTest`] wires a [`Reddit`](crate::Reddit) client and a
//! [`Recorder`](crate::recorder::Recorder) onto one session and opens the
//! cassette named after the running test:
//!
//! ```rust,no_run
//! use reddit_cassette::testing::{FixtureConfig, IntegrationTest, Placeholders};
//! use reddit_cassette::{cassette_dir, test_case};
//!
//! #[tokio::test]
//! async fn test_about() -> reddit_cassette::RedditResult<()> {
//!     let mut fixture = IntegrationTest::setup(
//!         test_case!("TestSubreddit"),
//!         Placeholders::from_env(),
//!         FixtureConfig::from_env(cassette_dir!()),
//!     )?;
//!     let cassette = fixture.use_cassette(None, Default::default())?;
//!     let about = fixture.reddit().get("/r/redditdev/about", &[]).await?;
//!     assert_eq!(about["data"]["display_name"], "redditdev");
//!     cassette.eject()
//! }
//! ```

pub mod fixture;
pub mod placeholders;

pub use fixture::{
    FixtureConfig, IntegrationTest, IntegrationTestBuilder, TestCase, MOVE_CASSETTES_ENV,
};
pub use placeholders::{Placeholders, PLACEHOLDER_REFRESH_TOKEN};
