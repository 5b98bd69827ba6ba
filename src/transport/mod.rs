//! HTTP transport shared by the client and the recorder
//!
//! ```text
//! Reddit ──┐
//!          ├── Session (default headers + mounted adapter)
//! Recorder ┘        │
//!                   ├── ReqwestAdapter   <- live network
//!                   └── CassetteAdapter  <- record / replay (see recorder)
//! ```

pub mod reqwest_adapter;
pub mod session;

pub use reqwest_adapter::ReqwestAdapter;
pub use session::{HttpAdapter, HttpRequest, HttpResponse, Session};
