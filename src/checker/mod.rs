//! Stream checking: fetch a status page and decide online/listeners.
//!
//! The fetch sits behind [`Probe`] and the page wording behind
//! [`StatusParser`], so the monitor can be driven by scripted probes and a
//! format change upstream only touches [`parser`].

mod http;
pub mod parser;

pub use http::{HttpProbe, HttpProbeBuilder, DEFAULT_TIMEOUT};
pub use parser::{ShoutcastParser, StatusParser};

use async_trait::async_trait;

use crate::data::{Source, StreamStatus};

/// Checks one source. Implementations never fail: an unreachable or
/// unreadable page is reported as [`StreamStatus::offline`].
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, source: &Source) -> StreamStatus;
}
