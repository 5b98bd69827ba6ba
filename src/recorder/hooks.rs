//! Hooks run on each newly recorded interaction before it joins the cassette.

use crate::auth::ACCESS_TOKEN_PATH;
use crate::logging::log_debug;
use crate::recorder::cassette::{Cassette, RecordedInteraction};
use crate::recorder::options::Placeholder;
use std::fmt::Debug;

/// Inspect or rewrite an interaction before it is stored.
///
/// Hooks may register extra placeholders on the cassette; those are applied
/// when the cassette is written.
pub trait BeforeRecord: Debug + Send + Sync {
    fn before_record(&self, interaction: &mut RecordedInteraction, cassette: &mut Cassette);
}

/// Keeps bearer tokens out of cassette files.
///
/// When a token request succeeds, the returned `access_token` becomes a
/// cassette placeholder, which also scrubs it from the `Authorization`
/// headers of every later request in the same cassette.
#[derive(Debug, Clone)]
pub struct AccessTokenFilter {
    placeholder: String,
}

impl Default for AccessTokenFilter {
    fn default() -> Self {
        Self {
            placeholder: "<ACCESS_TOKEN>".to_string(),
        }
    }
}

impl BeforeRecord for AccessTokenFilter {
    fn before_record(&self, interaction: &mut RecordedInteraction, cassette: &mut Cassette) {
        let response = &interaction.response;
        if !interaction.request.uri.contains(ACCESS_TOKEN_PATH) || response.status.code != 200 {
            return;
        }

        let Ok(body) = serde_json::from_str::<serde_json::Value>(&response.body.string) else {
            return;
        };
        let Some(token) = body.get("access_token").and_then(|t| t.as_str()) else {
            return;
        };

        log_debug!(
            cassette = %cassette.name(),
            "Registering access token placeholder"
        );
        cassette.add_placeholder(Placeholder::new(self.placeholder.clone(), token));
    }
}
