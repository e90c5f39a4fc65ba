use std::fmt;
use std::time::Duration;

use ng_core::{Error, Result};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to talk to the upstream. Built once at startup and
/// handed to the client; nothing below this reads the environment.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("News API key is required".to_string()));
        }
        Ok(Self {
            api_key,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// `Url::join` drops the last path segment unless the base ends with a slash.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid base URL {}: {}", raw, e)))
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
