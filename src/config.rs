use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `ScrapingOptions` struct holds the settings for one scraper instance.
/// It includes the request timeout, retry count, rate-limit delay, user agent, and optional credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingOptions {
    /// The deadline for a single HTTP request, in milliseconds.
    pub timeout_ms: u64,
    /// The number of retries after the first attempt on transient failure.
    pub retries: u32,
    /// The minimum spacing between outbound requests, in milliseconds.
    pub delay_ms: u64,
    /// The user agent string to be used in HTTP requests.
    pub user_agent: String,
    /// Optional account credentials. Public profiles never need them.
    pub credentials: Option<Credentials>,
}

/// Username/password pair for a LinkedIn account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for ScrapingOptions {
    /// Provides default values for the `ScrapingOptions` struct.
    ///
    /// # Returns
    ///
    /// A `ScrapingOptions` instance with default settings and no credentials.
    fn default() -> Self {
        Self {
            timeout_ms: crate::DEFAULT_TIMEOUT.as_millis() as u64,
            retries: crate::DEFAULT_RETRIES,
            delay_ms: crate::DEFAULT_DELAY.as_millis() as u64,
            user_agent: String::from(crate::DEFAULT_USER_AGENT),
            credentials: None,
        }
    }
}

impl ScrapingOptions {
    /// Loads options from layered sources: defaults, then an optional config file, then
    /// `SCRAPER_*` environment variables.
    ///
    /// # Arguments
    ///
    /// * `path` - Config file name without extension (e.g. `"scraper"` for `scraper.toml`).
    ///   A missing file is not an error.
    ///
    /// # Returns
    ///
    /// A `Result` containing the merged options, or the `config` error if a source is malformed.
    pub fn load(path: &str) -> std::result::Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SCRAPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}
