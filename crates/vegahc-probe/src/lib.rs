//! vegahc-probe — the HTTP probe used by every health check.
//!
//! A probe is one `GET` against a dependency endpoint. It reports the
//! status code, the time until the response headers arrived, and the
//! response headers, or a classified failure. Callers that expect a
//! JSON body use [`ProbeClient::get_json`], which distinguishes a body
//! that cannot be decoded from a dependency that cannot be reached.
//!
//! ```text
//! ProbeClient
//!   ├── get(url)       → ProbeResponse | ProbeError
//!   └── get_json(url)  → (ProbeResponse, T) | ProbeError::Decode
//! ```

pub mod client;
pub mod error;

pub use client::{ProbeClient, ProbeResponse, DEFAULT_TIMEOUT};
pub use error::{ProbeError, ProbeResult};
