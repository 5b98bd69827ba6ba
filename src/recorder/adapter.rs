use crate::error::{RedditError, RedditResult};
use crate::logging::log_debug;
use crate::recorder::cassette::{Cassette, RecordedInteraction};
use crate::recorder::hooks::BeforeRecord;
use crate::transport::{HttpAdapter, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Name the cassette adapter reports through [`HttpAdapter::name`].
pub const ADAPTER_NAME: &str = "cassette";

/// Session adapter answering from a cassette and recording misses
///
/// Lookups and recording take the cassette lock briefly; the lock is never
/// held while the wrapped adapter is awaited.
pub struct CassetteAdapter {
    cassette: Arc<Mutex<Cassette>>,
    inner: Arc<dyn HttpAdapter>,
    hooks: Vec<Arc<dyn BeforeRecord>>,
}

impl CassetteAdapter {
    pub fn new(
        cassette: Arc<Mutex<Cassette>>,
        inner: Arc<dyn HttpAdapter>,
        hooks: Vec<Arc<dyn BeforeRecord>>,
    ) -> Self {
        Self {
            cassette,
            inner,
            hooks,
        }
    }

    fn cassette(&self) -> MutexGuard<'_, Cassette> {
        self.cassette.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HttpAdapter for CassetteAdapter {
    async fn send(&self, request: &HttpRequest) -> RedditResult<HttpResponse> {
        {
            let mut cassette = self.cassette();
            if let Some(response) = cassette.playback(request) {
                log_debug!(
                    cassette = %cassette.name(),
                    method = %request.method,
                    uri = %request.uri,
                    "Replaying recorded interaction"
                );
                return Ok(response);
            }
            if !cassette.is_recording() {
                return Err(RedditError::cassette_mismatch(
                    cassette.name(),
                    &request.method,
                    &request.uri,
                ));
            }
        }

        let response = self.inner.send(request).await?;

        let mut interaction = RecordedInteraction::new(request, &response);
        let mut cassette = self.cassette();
        for hook in &self.hooks {
            hook.before_record(&mut interaction, &mut cassette);
        }
        log_debug!(
            cassette = %cassette.name(),
            method = %request.method,
            uri = %request.uri,
            status = response.status,
            "Recording interaction"
        );
        cassette.record(interaction);

        Ok(response)
    }

    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }
}
