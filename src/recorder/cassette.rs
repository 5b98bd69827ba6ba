//! Cassette file format and the in-memory cassette.
//!
//! Files are pretty-printed JSON with a stable key order so diffs of
//! re-recorded cassettes stay readable:
//!
//! ```json
//! {
//!   "http_interactions": [
//!     {
//!       "recorded_at": "2024-01-01T00:00:00",
//!       "request": {
//!         "body": { "encoding": "utf-8", "string": "" },
//!         "headers": { "user-agent": ["<USER_AGENT> reddit-cassette/0.1.0"] },
//!         "method": "GET",
//!         "uri": "https://oauth.reddit.com/r/redditdev/about?raw_json=1"
//!       },
//!       "response": {
//!         "body": { "encoding": "utf-8", "string": "{...}" },
//!         "headers": { "content-type": ["application/json; charset=UTF-8"] },
//!         "status": { "code": 200, "message": "OK" },
//!         "url": "https://oauth.reddit.com/r/redditdev/about?raw_json=1"
//!       }
//!     }
//!   ],
//!   "recorded_with": "reddit-cassette/0.1.0"
//! }
//! ```

use crate::error::{RedditError, RedditResult};
use crate::logging::log_debug;
use crate::recorder::hooks::BeforeRecord;
use crate::recorder::matchers::MatchOn;
use crate::recorder::options::{Placeholder, RecordMode};
use crate::transport::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BODY_ENCODING: &str = "utf-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedBody {
    pub encoding: String,
    pub string: String,
}

impl RecordedBody {
    fn new(body: &str) -> Self {
        Self {
            encoding: BODY_ENCODING.to_string(),
            string: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub body: RecordedBody,
    pub headers: BTreeMap<String, Vec<String>>,
    pub method: String,
    pub uri: String,
}

impl From<&HttpRequest> for RecordedRequest {
    fn from(request: &HttpRequest) -> Self {
        Self {
            body: RecordedBody::new(request.body.as_deref().unwrap_or_default()),
            headers: split_headers(&request.headers),
            method: request.method.clone(),
            uri: request.uri.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedStatus {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub body: RecordedBody,
    pub headers: BTreeMap<String, Vec<String>>,
    pub status: RecordedStatus,
    pub url: String,
}

impl From<&HttpResponse> for RecordedResponse {
    fn from(response: &HttpResponse) -> Self {
        Self {
            body: RecordedBody::new(&response.body),
            headers: split_headers(&response.headers),
            status: RecordedStatus {
                code: response.status,
                message: response.reason.clone(),
            },
            url: response.url.clone(),
        }
    }
}

impl RecordedResponse {
    pub fn to_http(&self) -> HttpResponse {
        HttpResponse {
            status: self.status.code,
            reason: self.status.message.clone(),
            headers: self
                .headers
                .iter()
                .map(|(name, values)| (name.to_ascii_lowercase(), values.join(", ")))
                .collect(),
            body: self.body.string.clone(),
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedInteraction {
    pub recorded_at: String,
    pub request: RecordedRequest,
    pub response: RecordedResponse,
}

impl RecordedInteraction {
    pub fn new(request: &HttpRequest, response: &HttpResponse) -> Self {
        Self {
            recorded_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            request: request.into(),
            response: response.into(),
        }
    }
}

/// Top-level structure of a cassette file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CassetteFile {
    pub http_interactions: Vec<RecordedInteraction>,
    pub recorded_with: String,
}

fn split_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, Vec<String>> {
    headers
        .iter()
        .map(|(name, value)| (name.clone(), vec![value.clone()]))
        .collect()
}

/// `value` as it appears between the quotes of a JSON string.
fn json_escaped(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Placeholders in the order they are applied when saving: longest value
/// first, empty values skipped.
fn insertion_order(placeholders: &[Placeholder]) -> Vec<&Placeholder> {
    let mut ordered: Vec<&Placeholder> =
        placeholders.iter().filter(|p| !p.replace.is_empty()).collect();
    ordered.sort_by(|a, b| b.replace.len().cmp(&a.replace.len()));
    ordered
}

/// Swap real values for their placeholder tokens in serialized cassette text.
///
/// Longer values are replaced first so a secret containing another secret
/// is not split.
pub fn insert_placeholders(text: &str, placeholders: &[Placeholder]) -> String {
    insertion_order(placeholders)
        .into_iter()
        .fold(text.to_string(), |text, p| {
            text.replace(&json_escaped(&p.replace), &json_escaped(&p.placeholder))
        })
}

/// Swap placeholder tokens back to real values in serialized cassette text.
///
/// Applied in reverse of [`insert_placeholders`], so a value that was
/// substituted inside an earlier token is restored before that token.
pub fn remove_placeholders(text: &str, placeholders: &[Placeholder]) -> String {
    insertion_order(placeholders)
        .into_iter()
        .rev()
        .filter(|p| !p.placeholder.is_empty())
        .fold(text.to_string(), |text, p| {
            text.replace(&json_escaped(&p.placeholder), &json_escaped(&p.replace))
        })
}

#[derive(Debug, Clone)]
struct Interaction {
    recorded: RecordedInteraction,
    used: bool,
}

/// Settings a cassette is opened with, after merging per-call options
/// over recorder defaults.
#[derive(Debug, Clone)]
pub struct CassetteSettings {
    pub record_mode: RecordMode,
    pub match_requests_on: Vec<MatchOn>,
    pub allow_playback_repeats: bool,
    pub placeholders: Vec<Placeholder>,
}

/// An open cassette
#[derive(Debug)]
pub struct Cassette {
    name: String,
    path: PathBuf,
    settings: CassetteSettings,
    existed: bool,
    interactions: Vec<Interaction>,
    recorded: usize,
}

impl Cassette {
    /// Open `path`, loading recorded interactions when the file exists
    ///
    /// With [`RecordMode::All`] existing interactions are not loaded; the
    /// file is rewritten from scratch.
    pub fn load(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        settings: CassetteSettings,
    ) -> RedditResult<Self> {
        let name = name.into();
        let path = path.into();
        let existed = path.is_file();

        let interactions = if existed && settings.record_mode != RecordMode::All {
            let text =
                std::fs::read_to_string(&path).map_err(|e| RedditError::cassette_io(&path, e))?;
            let text = remove_placeholders(&text, &settings.placeholders);
            let file: CassetteFile = serde_json::from_str(&text)
                .map_err(|e| RedditError::cassette_format(&name, e.to_string()))?;
            file.http_interactions
                .into_iter()
                .map(|recorded| Interaction {
                    recorded,
                    used: false,
                })
                .collect()
        } else {
            Vec::new()
        };

        log_debug!(
            cassette = %name,
            path = %path.display(),
            existed = existed,
            interactions = interactions.len(),
            record_mode = ?settings.record_mode,
            "Cassette loaded"
        );

        Ok(Self {
            name,
            path,
            settings,
            existed,
            interactions,
            recorded: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_mode(&self) -> RecordMode {
        self.settings.record_mode
    }

    /// Whether the file existed when the cassette was opened.
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Whether unmatched requests may go to the network.
    pub fn is_recording(&self) -> bool {
        match self.settings.record_mode {
            RecordMode::All | RecordMode::NewEpisodes => true,
            RecordMode::Once => !self.existed,
            RecordMode::None => false,
        }
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    /// Number of interactions recorded since the cassette was opened.
    pub fn recorded_count(&self) -> usize {
        self.recorded
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.settings.placeholders
    }

    pub fn add_placeholder(&mut self, placeholder: Placeholder) {
        if !self.settings.placeholders.contains(&placeholder) {
            self.settings.placeholders.push(placeholder);
        }
    }

    /// Run `hooks` over interactions loaded from disk, so placeholders they
    /// register also cover replayed interactions.
    pub fn apply_hooks(&mut self, hooks: &[Arc<dyn BeforeRecord>]) {
        for index in 0..self.interactions.len() {
            let mut recorded = self.interactions[index].recorded.clone();
            for hook in hooks {
                hook.before_record(&mut recorded, self);
            }
            self.interactions[index].recorded = recorded;
        }
    }

    /// Find a recorded response for `request`, marking it used.
    pub fn playback(&mut self, request: &HttpRequest) -> Option<HttpResponse> {
        if self.settings.record_mode == RecordMode::All {
            return None;
        }

        let repeats = self.settings.allow_playback_repeats;
        let rules = &self.settings.match_requests_on;
        let interaction = self.interactions.iter_mut().find(|interaction| {
            (repeats || !interaction.used)
                && MatchOn::all(rules, request, &interaction.recorded.request)
        })?;
        interaction.used = true;
        Some(interaction.recorded.response.to_http())
    }

    pub fn record(&mut self, interaction: RecordedInteraction) {
        self.interactions.push(Interaction {
            recorded: interaction,
            used: true,
        });
        self.recorded += 1;
    }

    pub fn to_file(&self) -> CassetteFile {
        CassetteFile {
            http_interactions: self
                .interactions
                .iter()
                .map(|interaction| interaction.recorded.clone())
                .collect(),
            recorded_with: crate::client::USER_AGENT_SUFFIX.to_string(),
        }
    }

    /// Write the cassette if anything was recorded. Returns whether it wrote.
    pub fn save(&self) -> RedditResult<bool> {
        if self.recorded == 0 {
            return Ok(false);
        }

        let text = serde_json::to_string_pretty(&self.to_file())
            .map_err(|e| RedditError::cassette_format(&self.name, e.to_string()))?;
        let text = insert_placeholders(&text, &self.settings.placeholders);

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| RedditError::cassette_io(dir, e))?;
        }
        std::fs::write(&self.path, text + "\n")
            .map_err(|e| RedditError::cassette_io(&self.path, e))?;

        log_debug!(
            cassette = %self.name,
            path = %self.path.display(),
            interactions = self.interactions.len(),
            recorded = self.recorded,
            "Cassette saved"
        );
        Ok(true)
    }
}
