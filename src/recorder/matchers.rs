//! Rules deciding whether a live request matches a recorded one.

use crate::recorder::cassette::RecordedRequest;
use crate::transport::HttpRequest;
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOn {
    Method,
    /// Full URI, byte for byte.
    Uri,
    Host,
    Path,
    /// Query parameters, order-insensitive.
    Query,
    Body,
}

impl MatchOn {
    pub fn matches(&self, request: &HttpRequest, recorded: &RecordedRequest) -> bool {
        match self {
            Self::Method => request.method.eq_ignore_ascii_case(&recorded.method),
            Self::Uri => request.uri == recorded.uri,
            Self::Host => compare_urls(&request.uri, &recorded.uri, |u| {
                u.host_str().map(str::to_string)
            }),
            Self::Path => compare_urls(&request.uri, &recorded.uri, |u| Some(u.path().to_string())),
            Self::Query => compare_urls(&request.uri, &recorded.uri, |u| {
                let mut pairs: Vec<(String, String)> = u.query_pairs().into_owned().collect();
                pairs.sort();
                Some(pairs)
            }),
            Self::Body => request.body.as_deref().unwrap_or_default() == recorded.body.string,
        }
    }

    /// Whether every rule in `rules` matches.
    pub fn all(rules: &[MatchOn], request: &HttpRequest, recorded: &RecordedRequest) -> bool {
        rules.iter().all(|rule| rule.matches(request, recorded))
    }
}

fn compare_urls<T, F>(left: &str, right: &str, key: F) -> bool
where
    T: PartialEq,
    F: Fn(&Url) -> Option<T>,
{
    match (Url::parse(left), Url::parse(right)) {
        (Ok(left), Ok(right)) => key(&left) == key(&right),
        _ => left == right,
    }
}
