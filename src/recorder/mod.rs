//! Cassette-based HTTP record and replay
//!
//! A [`Recorder`] is bound to a [`Session`](crate::transport::Session).
//! [`Recorder::use_cassette`] loads `{library_dir}/{name}.json` and mounts a
//! [`CassetteAdapter`] on the session; requests that match a recorded
//! interaction are answered from the cassette, the rest go to the network
//! when the [`RecordMode`] allows it. Ejecting the returned
//! [`CassetteGuard`] writes new interactions back to disk with secrets
//! replaced by [`Placeholder`] tokens.
//!
//! - `cassette` - on-disk format and the in-memory cassette
//! - `matchers` - request matching rules
//! - `options` - record modes, placeholders, per-call and recorder-wide options
//! - `hooks` - before-record hooks
//! - `adapter` - the session adapter that records and replays
//! - `engine` - the recorder and the cassette guard

pub mod adapter;
pub mod cassette;
pub mod engine;
pub mod hooks;
pub mod matchers;
pub mod options;

pub use adapter::CassetteAdapter;
pub use cassette::{
    Cassette, CassetteFile, RecordedBody, RecordedInteraction, RecordedRequest, RecordedResponse,
    RecordedStatus,
};
pub use engine::{CassetteGuard, Recorder};
pub use hooks::{AccessTokenFilter, BeforeRecord};
pub use matchers::MatchOn;
pub use options::{CassetteOptions, Placeholder, RecordMode, RecorderConfig};
