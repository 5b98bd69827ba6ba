//! Replay example: answer API calls from a checked-in cassette.
//!
//! This example shows how to:
//! - Build the integration test fixture outside a test
//! - Replay `tests/cassettes/TestSubreddit.test_about.json` with placeholder credentials
//! - Refuse any request the cassette does not cover
//!
//! # Running
//!
//! ```bash
//! cargo run --example replay_cassette
//!
//! # See the recorder at work
//! RUST_LOG=reddit_cassette=debug cargo run --example replay_cassette
//! ```

use reddit_cassette::recorder::{CassetteOptions, RecordMode};
use reddit_cassette::testing::{FixtureConfig, IntegrationTest, Placeholders, TestCase};
use reddit_cassette::cassette_dir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = FixtureConfig {
        record_mode: RecordMode::None,
        ..FixtureConfig::new(cassette_dir!())
    };
    let mut fixture = IntegrationTest::setup(
        TestCase::new("TestSubreddit", "test_about"),
        Placeholders::default(),
        config,
    )?;

    let cassette = fixture.use_cassette(None, CassetteOptions::default())?;
    let about = fixture.reddit().get("/r/redditdev/about", &[]).await?;
    cassette.eject()?;

    println!(
        "r/{}: {}",
        about["data"]["display_name"].as_str().unwrap_or_default(),
        about["data"]["title"].as_str().unwrap_or_default()
    );
    Ok(())
}
