//! Session handle and the request/response types that flow through it.

use crate::error::RedditResult;
use crate::logging::log_debug;
use crate::transport::ReqwestAdapter;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// An outgoing HTTP request. Header names are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            uri: uri.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A received HTTP response. Header names are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub url: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Something that can turn an [`HttpRequest`] into an [`HttpResponse`].
///
/// The live implementation is [`ReqwestAdapter`]; the recorder mounts its
/// own adapter on the session while a cassette is active.
#[async_trait]
pub trait HttpAdapter: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> RedditResult<HttpResponse>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

struct SessionInner {
    headers: RwLock<BTreeMap<String, String>>,
    adapter: RwLock<Arc<dyn HttpAdapter>>,
}

/// Clonable transport handle.
///
/// Every clone shares default headers and the mounted adapter, so a header
/// set by the test fixture is seen by the client, and an adapter mounted by
/// the recorder intercepts the client's requests.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("headers", &self.headers())
            .field("adapter", &self.adapter().name())
            .finish()
    }
}

impl Session {
    /// Session backed by the live network.
    pub fn new() -> Self {
        Self::with_adapter(Arc::new(ReqwestAdapter::new()))
    }

    pub fn with_adapter(adapter: Arc<dyn HttpAdapter>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                headers: RwLock::new(BTreeMap::new()),
                adapter: RwLock::new(adapter),
            }),
        }
    }

    pub fn set_header(&self, name: &str, value: impl Into<String>) {
        let mut headers = self
            .inner
            .headers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove_header(&self, name: &str) -> Option<String> {
        let mut headers = self
            .inner
            .headers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        headers.remove(&name.to_ascii_lowercase())
    }

    pub fn header(&self, name: &str) -> Option<String> {
        let headers = self
            .inner
            .headers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        headers.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn headers(&self) -> BTreeMap<String, String> {
        self.inner
            .headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the adapter, returning the one previously mounted.
    pub fn mount(&self, adapter: Arc<dyn HttpAdapter>) -> Arc<dyn HttpAdapter> {
        let mut slot = self
            .inner
            .adapter
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        log_debug!(
            previous = slot.name(),
            next = adapter.name(),
            "Mounting session adapter"
        );
        std::mem::replace(&mut *slot, adapter)
    }

    pub fn adapter(&self) -> Arc<dyn HttpAdapter> {
        Arc::clone(
            &self
                .inner
                .adapter
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Whether two handles share the same underlying session.
    pub fn same_session(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Send a request through the mounted adapter.
    ///
    /// Session default headers are applied first; headers already present
    /// on the request take precedence.
    pub async fn send(&self, mut request: HttpRequest) -> RedditResult<HttpResponse> {
        for (name, value) in self.headers() {
            request.headers.entry(name).or_insert(value);
        }

        let adapter = self.adapter();
        log_debug!(
            method = %request.method,
            uri = %request.uri,
            adapter = adapter.name(),
            "Sending request"
        );
        adapter.send(&request).await
    }
}
