use crate::recorder::hooks::BeforeRecord;
use crate::recorder::matchers::MatchOn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// When a cassette may hit the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMode {
    /// Record only if the cassette file does not exist yet, otherwise replay.
    #[default]
    Once,
    /// Replay recorded interactions and record anything unmatched.
    NewEpisodes,
    /// Replay only; unmatched requests fail.
    None,
    /// Ignore existing interactions and record everything again.
    All,
}

/// A secret and the token that stands in for it inside cassette files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Token written to disk, e.g. `<CLIENT_ID>`.
    pub placeholder: String,
    /// Real value replaced by the token.
    pub replace: String,
}

impl Placeholder {
    pub fn new(placeholder: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            replace: replace.into(),
        }
    }
}

/// Per-call options for [`Recorder::use_cassette`](crate::recorder::Recorder::use_cassette)
///
/// Unset fields fall back to the [`RecorderConfig`] defaults; placeholders
/// are added to the recorder-wide ones.
#[derive(Debug, Clone, Default)]
pub struct CassetteOptions {
    pub record_mode: Option<RecordMode>,
    pub match_requests_on: Option<Vec<MatchOn>>,
    pub allow_playback_repeats: Option<bool>,
    pub placeholders: Vec<Placeholder>,
}

impl CassetteOptions {
    pub fn record_mode(mut self, mode: RecordMode) -> Self {
        self.record_mode = Some(mode);
        self
    }

    pub fn match_requests_on(mut self, rules: impl Into<Vec<MatchOn>>) -> Self {
        self.match_requests_on = Some(rules.into());
        self
    }

    pub fn allow_playback_repeats(mut self, allow: bool) -> Self {
        self.allow_playback_repeats = Some(allow);
        self
    }

    pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholders.push(placeholder);
        self
    }
}

/// Recorder-wide configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory holding `{name}.json` cassette files
    pub cassette_library_dir: PathBuf,
    pub default_record_mode: RecordMode,
    pub default_match_requests_on: Vec<MatchOn>,
    pub allow_playback_repeats: bool,
    pub placeholders: Vec<Placeholder>,
    pub before_record: Vec<Arc<dyn BeforeRecord>>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            cassette_library_dir: PathBuf::from("cassettes"),
            default_record_mode: RecordMode::Once,
            default_match_requests_on: vec![MatchOn::Uri, MatchOn::Method],
            allow_playback_repeats: false,
            placeholders: Vec::new(),
            before_record: Vec::new(),
        }
    }
}

impl RecorderConfig {
    pub fn new(cassette_library_dir: impl Into<PathBuf>) -> Self {
        Self {
            cassette_library_dir: cassette_library_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_placeholders(mut self, placeholders: impl IntoIterator<Item = Placeholder>) -> Self {
        self.placeholders.extend(placeholders);
        self
    }

    pub fn with_before_record(mut self, hook: Arc<dyn BeforeRecord>) -> Self {
        self.before_record.push(hook);
        self
    }

    pub fn with_record_mode(mut self, mode: RecordMode) -> Self {
        self.default_record_mode = mode;
        self
    }
}
