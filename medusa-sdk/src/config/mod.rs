//! Runtime configuration for the store client.
//!
//! Loading and validating the configuration file is left to the binary;
//! this type only holds the validated values.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Upper bound on any single API round trip unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the store lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root URL of the commerce server, without the `/store` prefix.
    pub base_url: Url,
    /// Sent as `x-publishable-api-key` on every request.
    pub publishable_api_key: String,
    /// Per-request timeout; expiry surfaces as a network failure.
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: Url, publishable_api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            publishable_api_key: publishable_api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The key is kept out of debug output so it cannot reach the logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("publishable_api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
