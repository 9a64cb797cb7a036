//! HTTP probe for status pages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use super::parser::{ShoutcastParser, StatusParser};
use super::Probe;
use crate::data::{Source, StreamStatus};
use crate::error::CheckError;

/// Default bound on a single status page request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches a source's status page and parses it.
///
/// Any failure (connect, timeout, non-success status, unreadable body) is
/// logged and reported as offline with zero listeners.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
    parser: Arc<dyn StatusParser>,
}

impl HttpProbe {
    /// Create a new builder for configuring the probe.
    pub fn builder() -> HttpProbeBuilder {
        HttpProbeBuilder::default()
    }

    /// GET the page and return its body.
    pub async fn fetch(&self, url: &str) -> Result<String, CheckError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl std::fmt::Debug for HttpProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProbe").finish_non_exhaustive()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self, source: &Source) -> StreamStatus {
        match self.fetch(&source.url).await {
            Ok(body) => self.parser.parse(&body),
            Err(e) => {
                warn!(source = %source.name, url = %source.url, "check failed: {}", e);
                StreamStatus::offline()
            }
        }
    }
}

/// Builder for [`HttpProbe`].
pub struct HttpProbeBuilder {
    timeout: Duration,
    parser: Arc<dyn StatusParser>,
}

impl Default for HttpProbeBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            parser: Arc::new(ShoutcastParser),
        }
    }
}

impl HttpProbeBuilder {
    /// Bound on each request, connect included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the page parser.
    pub fn parser(mut self, parser: impl StatusParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Build the probe.
    pub fn build(self) -> Result<HttpProbe, CheckError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpProbe {
            client,
            parser: self.parser,
        })
    }
}
