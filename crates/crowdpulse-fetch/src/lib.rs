//! Rate-limited fetch layer for community discussion sources.
//!
//! [`FetchClient`] wraps `reqwest` with a concurrency ceiling, randomized
//! pacing, a hard per-request timeout and an optional retry policy. Failures
//! are typed as [`FetchError`] and classified by [`FetchErrorKind`]; callers
//! are expected to absorb transient ones.

pub mod client;
pub mod error;
pub mod rate_limit;
pub mod session;
pub mod types;

pub use client::{FetchClient, FetchConfig};
pub use error::{FetchError, FetchErrorKind};
pub use rate_limit::Pacing;
pub use session::SessionToken;
pub use types::{FetchRequest, RawPayload};
