use crate::client::Reddit;
use crate::error::{RedditError, RedditResult};
use crate::logging::{log_debug, log_info, log_warn};
use crate::recorder::{
    AccessTokenFilter, CassetteGuard, CassetteOptions, RecordMode, Recorder, RecorderConfig,
};
use crate::testing::placeholders::Placeholders;
use crate::transport::Session;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Any non-empty value moves mismatched cassette files to their derived name.
pub const MOVE_CASSETTES_ENV: &str = "PRAWTEST_MOVE_CASSETTES";

/// Name of the enclosing function, evaluated where the macro is expanded.
///
/// Works inside `async fn` and `#[tokio::test]` bodies.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        $crate::testing::fixture::enclosing_function_name(::std::any::type_name_of_val(&__here))
    }};
}

/// [`TestCase`] for the enclosing test function in suite `$suite`.
///
/// Must be expanded directly in the test function, not in a shared helper:
/// the function it names is the one it is written in.
#[macro_export]
macro_rules! test_case {
    ($suite:expr) => {
        $crate::testing::TestCase::new($suite, $crate::function_name!())
    };
}

/// `tests/cassettes` under the manifest directory of the calling crate.
#[macro_export]
macro_rules! cassette_dir {
    () => {
        ::std::path::PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/cassettes"))
    };
}

#[doc(hidden)]
pub fn enclosing_function_name(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::__here").unwrap_or(path);
    let path = path.trim_end_matches("::{{closure}}");
    path.rsplit("::").next().unwrap_or(path)
}

/// Identity of the running test
///
/// The cassette name is `{suite}.{name}`. Build it with [`test_case!`] so the
/// name always follows the test function, wherever `use_cassette` is called
/// from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestCase {
    suite: String,
    name: String,
}

impl TestCase {
    pub fn new(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
        }
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cassette_name(&self) -> String {
        format!("{}.{}", self.suite, self.name)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.suite, self.name)
    }
}

/// Where cassettes live and how they may change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    pub cassette_dir: PathBuf,
    /// Rename cassettes whose explicit name differs from the derived one
    pub move_cassettes: bool,
    pub record_mode: RecordMode,
}

impl FixtureConfig {
    pub fn new(cassette_dir: impl Into<PathBuf>) -> Self {
        Self {
            cassette_dir: cassette_dir.into(),
            move_cassettes: false,
            record_mode: RecordMode::Once,
        }
    }

    /// Read [`MOVE_CASSETTES_ENV`]; under `CI` cassettes are replay-only.
    pub fn from_env(cassette_dir: impl Into<PathBuf>) -> Self {
        let is_set = |key: &str| std::env::var_os(key).is_some_and(|v| !v.is_empty());

        let mut config = Self::new(cassette_dir);
        config.move_cassettes = is_set(MOVE_CASSETTES_ENV);
        if is_set("CI") {
            config.record_mode = RecordMode::None;
        }
        config
    }
}

type RedditFactory = Box<dyn FnOnce(&Session, &Placeholders) -> RedditResult<Reddit>>;
type RecorderCustomizer = Box<dyn FnOnce(RecorderConfig) -> RecorderConfig>;

/// Builder for [`IntegrationTest`]
pub struct IntegrationTestBuilder {
    test_case: TestCase,
    placeholders: Placeholders,
    config: FixtureConfig,
    session: Option<Session>,
    reddit_factory: Option<RedditFactory>,
    recorder_customizer: Option<RecorderCustomizer>,
}

impl IntegrationTestBuilder {
    pub fn config(mut self, config: FixtureConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an existing session instead of a live one.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client with a custom factory.
    ///
    /// A fixture with a custom client never rebinds it in
    /// [`IntegrationTest::set_up_record`].
    pub fn with_reddit<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Session, &Placeholders) -> RedditResult<Reddit> + 'static,
    {
        self.reddit_factory = Some(Box::new(factory));
        self
    }

    /// Adjust the recorder configuration derived from the fixture config.
    pub fn configure_recorder<F>(mut self, customize: F) -> Self
    where
        F: FnOnce(RecorderConfig) -> RecorderConfig + 'static,
    {
        self.recorder_customizer = Some(Box::new(customize));
        self
    }

    pub fn build(self) -> RedditResult<IntegrationTest> {
        let session = self.session.unwrap_or_default();

        let (mut reddit, overrode_reddit_setup) = match self.reddit_factory {
            Some(factory) => (factory(&session, &self.placeholders)?, true),
            None => (
                Reddit::new(self.placeholders.password_config(), session.clone())?,
                false,
            ),
        };

        let mut recorder_config = RecorderConfig::new(&self.config.cassette_dir)
            .with_record_mode(self.config.record_mode)
            .with_placeholders(self.placeholders.cassette_placeholders())
            .with_before_record(Arc::new(AccessTokenFilter::default()));
        if let Some(customize) = self.recorder_customizer {
            recorder_config = customize(recorder_config);
        }
        let recorder = Recorder::new(session.clone(), recorder_config);

        // Uncompressed responses keep cassette bodies readable.
        session.set_header("accept-encoding", "identity");

        // Tests opt out of read-only mode explicitly.
        reddit.set_read_only(true)?;

        log_debug!(
            test = %self.test_case,
            cassette_dir = %self.config.cassette_dir.display(),
            custom_reddit = overrode_reddit_setup,
            "Integration test fixture ready"
        );

        Ok(IntegrationTest {
            test_case: self.test_case,
            placeholders: self.placeholders,
            config: self.config,
            session,
            reddit,
            recorder,
            overrode_reddit_setup,
        })
    }
}

/// Per-test fixture: a client, its session and a recorder bound to both
pub struct IntegrationTest {
    test_case: TestCase,
    placeholders: Placeholders,
    config: FixtureConfig,
    session: Session,
    reddit: Reddit,
    recorder: Recorder,
    overrode_reddit_setup: bool,
}

impl fmt::Debug for IntegrationTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationTest")
            .field("test_case", &self.test_case)
            .field("config", &self.config)
            .field("read_only", &self.reddit.read_only())
            .field("overrode_reddit_setup", &self.overrode_reddit_setup)
            .finish()
    }
}

impl IntegrationTest {
    pub fn builder(test_case: TestCase, placeholders: Placeholders) -> IntegrationTestBuilder {
        let config = FixtureConfig::new(PathBuf::from("cassettes"));
        IntegrationTestBuilder {
            test_case,
            placeholders,
            config,
            session: None,
            reddit_factory: None,
            recorder_customizer: None,
        }
    }

    /// Standard setup: live session, password client, read-only on
    pub fn setup(
        test_case: TestCase,
        placeholders: Placeholders,
        config: FixtureConfig,
    ) -> RedditResult<Self> {
        Self::builder(test_case, placeholders).config(config).build()
    }

    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reddit(&self) -> &Reddit {
        &self.reddit
    }

    pub fn reddit_mut(&mut self) -> &mut Reddit {
        &mut self.reddit
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Cassette name derived from the running test.
    pub fn cassette_name(&self) -> String {
        self.test_case.cassette_name()
    }

    /// Rebind the client to the configured refresh token before recording
    ///
    /// Returns whether the client was replaced. Nothing happens when the
    /// fixture was built with a custom client or the refresh token is the
    /// placeholder. The new client keeps the current read-only setting.
    pub fn set_up_record(&mut self) -> RedditResult<bool> {
        if self.overrode_reddit_setup || !self.placeholders.has_refresh_token() {
            return Ok(false);
        }

        let read_only = self.reddit.read_only();
        let mut reddit = Reddit::new(
            self.placeholders.refresh_token_config(),
            self.session.clone(),
        )?;
        reddit.set_read_only(read_only)?;
        self.reddit = reddit;

        log_info!(
            test = %self.test_case,
            "Client rebound to refresh token for recording"
        );
        Ok(true)
    }

    /// Open the cassette for the running test
    ///
    /// `cassette_name` is accepted for older tests that name their cassette
    /// explicitly. When it differs from the derived name the cassette is
    /// either moved to the derived name (with [`FixtureConfig::move_cassettes`])
    /// or used as given with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::CassetteIo`] when moving the cassette fails,
    /// and propagates recorder and rebinding errors.
    pub fn use_cassette(
        &mut self,
        cassette_name: Option<&str>,
        options: CassetteOptions,
    ) -> RedditResult<CassetteGuard> {
        let dynamic_name = self.cassette_name();
        let mut name = dynamic_name.clone();

        if let Some(explicit) = cassette_name.filter(|n| !n.is_empty()) {
            log_debug!(
                test = %dynamic_name,
                cassette = %explicit,
                "Static cassette name provided"
            );

            if explicit != dynamic_name {
                if self.config.move_cassettes {
                    let from = self.recorder.cassette_path(explicit);
                    let to = self.recorder.cassette_path(&dynamic_name);
                    std::fs::rename(&from, &to).map_err(|e| RedditError::cassette_io(&from, e))?;
                    log_warn!(
                        from = %explicit,
                        to = %dynamic_name,
                        "Cassette {} has been moved to {}",
                        explicit,
                        dynamic_name
                    );
                } else {
                    log_warn!(
                        test = %dynamic_name,
                        cassette = %explicit,
                        "Dynamic cassette name for function {} does not match the provided cassette name: {}",
                        dynamic_name,
                        explicit
                    );
                    name = explicit.to_string();
                }
            }
        }

        if self.recorder.will_record(&name, &options) {
            self.set_up_record()?;
        }
        self.recorder.use_cassette(&name, options)
    }
}
