use crate::error::{RedditError, RedditResult};
use crate::logging::{log_debug, log_info, log_warn};
use crate::recorder::adapter::{CassetteAdapter, ADAPTER_NAME};
use crate::recorder::cassette::{Cassette, CassetteSettings};
use crate::recorder::options::{CassetteOptions, RecordMode, RecorderConfig};
use crate::transport::{HttpAdapter, Session};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Records and replays the HTTP traffic of one session
#[derive(Debug, Clone)]
pub struct Recorder {
    session: Session,
    config: RecorderConfig,
}

impl Recorder {
    pub fn new(session: Session, config: RecorderConfig) -> Self {
        Self { session, config }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn cassette_path(&self, name: &str) -> PathBuf {
        self.config
            .cassette_library_dir
            .join(format!("{name}.json"))
    }

    fn settings(&self, options: CassetteOptions) -> CassetteSettings {
        let mut placeholders = self.config.placeholders.clone();
        placeholders.extend(options.placeholders);

        CassetteSettings {
            record_mode: options
                .record_mode
                .unwrap_or(self.config.default_record_mode),
            match_requests_on: options
                .match_requests_on
                .unwrap_or_else(|| self.config.default_match_requests_on.clone()),
            allow_playback_repeats: options
                .allow_playback_repeats
                .unwrap_or(self.config.allow_playback_repeats),
            placeholders,
        }
    }

    /// Whether a cassette opened with these options would record new
    /// interactions from the network.
    pub fn will_record(&self, name: &str, options: &CassetteOptions) -> bool {
        let exists = self.cassette_path(name).is_file();
        match options
            .record_mode
            .unwrap_or(self.config.default_record_mode)
        {
            RecordMode::All | RecordMode::NewEpisodes => true,
            RecordMode::Once => !exists,
            RecordMode::None => false,
        }
    }

    /// Open cassette `name` and route the session through it
    ///
    /// The cassette stays active until the returned guard is ejected or
    /// dropped. Only one cassette may be active on a session at a time.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::CassetteAlreadyActive`] while another cassette
    /// is mounted on the session.
    ///
    /// Returns [`RedditError::CassetteIo`](crate::RedditError::CassetteIo) or
    /// [`RedditError::CassetteFormat`](crate::RedditError::CassetteFormat)
    /// when an existing cassette file cannot be read.
    pub fn use_cassette(&self, name: &str, options: CassetteOptions) -> RedditResult<CassetteGuard> {
        if self.session.adapter().name() == ADAPTER_NAME {
            return Err(RedditError::cassette_already_active(name));
        }

        let mut cassette =
            Cassette::load(name, self.cassette_path(name), self.settings(options))?;
        cassette.apply_hooks(&self.config.before_record);
        let recording = cassette.is_recording();
        let cassette = Arc::new(Mutex::new(cassette));

        let inner = self.session.adapter();
        let adapter = CassetteAdapter::new(
            Arc::clone(&cassette),
            inner,
            self.config.before_record.clone(),
        );
        let previous = self.session.mount(Arc::new(adapter));

        log_info!(
            cassette = %name,
            recording = recording,
            "Cassette inserted"
        );

        Ok(CassetteGuard {
            name: name.to_string(),
            cassette,
            session: self.session.clone(),
            previous: Some(previous),
        })
    }
}

/// Active cassette
///
/// Ejecting (or dropping) the guard restores the session's previous adapter
/// and writes newly recorded interactions to disk. Prefer
/// [`eject`](Self::eject) to see write errors; drop only logs them.
#[must_use = "the cassette is ejected as soon as the guard is dropped"]
pub struct CassetteGuard {
    name: String,
    cassette: Arc<Mutex<Cassette>>,
    session: Session,
    previous: Option<Arc<dyn HttpAdapter>>,
}

impl std::fmt::Debug for CassetteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CassetteGuard")
            .field("name", &self.name)
            .field("active", &self.previous.is_some())
            .finish()
    }
}

impl CassetteGuard {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_recording(&self) -> bool {
        self.with_cassette(Cassette::is_recording)
    }

    pub fn interaction_count(&self) -> usize {
        self.with_cassette(Cassette::interaction_count)
    }

    pub fn recorded_count(&self) -> usize {
        self.with_cassette(Cassette::recorded_count)
    }

    pub fn path(&self) -> PathBuf {
        self.with_cassette(|c| c.path().to_path_buf())
    }

    fn with_cassette<T>(&self, f: impl FnOnce(&Cassette) -> T) -> T {
        let cassette = self.cassette.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*cassette)
    }

    /// Restore the session and persist new interactions.
    pub fn eject(mut self) -> RedditResult<()> {
        self.finish()
    }

    fn finish(&mut self) -> RedditResult<()> {
        let Some(previous) = self.previous.take() else {
            return Ok(());
        };
        self.session.mount(previous);

        let written = self.with_cassette(Cassette::save)?;
        log_debug!(
            cassette = %self.name,
            written = written,
            "Cassette ejected"
        );
        Ok(())
    }
}

impl Drop for CassetteGuard {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log_warn!(
                cassette = %self.name,
                error = %e,
                "Failed to eject cassette"
            );
        }
    }
}
