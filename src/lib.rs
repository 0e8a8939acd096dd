use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod extract;
pub mod fetcher;
pub mod linkedin_url;
pub mod login_wall;
pub mod rate_limit;
pub mod scraper;
pub mod types;

// Re-export commonly used types
// `config` and `scraper` also name extern crates, so every path is crate-qualified.
pub use crate::config::{Credentials, ScrapingOptions};
pub use crate::fetcher::{HttpClient, HttpResponse, ReqwestClient, TransportError};
pub use crate::scraper::{scrape_company, scrape_company_by_name, CompanyScraper};
pub use crate::types::{CompanyData, ScrapingResult};

/// Machine-readable classification of a failed scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidUrl,
    FetchFailed,
    NotFound,
    LoginRequired,
    ClientError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::FetchFailed => "FETCH_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::LoginRequired => "LOGIN_REQUIRED",
            ErrorCode::ClientError => "CLIENT_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `ScrapingError` enum represents the pipeline-stage failures that abort a scrape.
///
/// Field-level extraction misses are never errors; they surface as `None` in
/// [`CompanyData`].
#[derive(Error, Debug)]
pub enum ScrapingError {
    /// The URL does not look like a LinkedIn company profile.
    #[error("invalid LinkedIn company URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Transient failures exhausted every attempt.
    #[error("failed to fetch {url} after {attempts} attempt(s): {message}")]
    FetchFailed {
        url: String,
        attempts: u32,
        message: String,
    },
    /// The server answered with a non-retryable status, or the page holds no profile.
    #[error("company profile not found at {url} (HTTP {status})")]
    NotFound { url: String, status: u16 },
    /// The response is an authentication interstitial instead of the profile.
    #[error("LinkedIn requires sign-in to view {url}")]
    LoginRequired { url: String },
    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

impl ScrapingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScrapingError::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            ScrapingError::FetchFailed { .. } => ErrorCode::FetchFailed,
            ScrapingError::NotFound { .. } => ErrorCode::NotFound,
            ScrapingError::LoginRequired { .. } => ErrorCode::LoginRequired,
            ScrapingError::Client(_) => ErrorCode::ClientError,
        }
    }
}

/// A type alias for `Result` with the `ScrapingError` error type.
pub type Result<T> = std::result::Result<T, ScrapingError>;

// Constants

/// The default deadline for a single HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// The default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 2;
/// The default minimum spacing between outbound requests.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1_500);
/// The default desktop-browser user agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ScrapingError::InvalidUrl {
            url: "https://example.com".to_string(),
            reason: "wrong host".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::InvalidUrl);
        assert!(err.to_string().contains("invalid"));

        let err = ScrapingError::LoginRequired {
            url: "https://www.linkedin.com/company/acme/".to_string(),
        };
        assert_eq!(err.code().as_str(), "LOGIN_REQUIRED");
    }

    #[test]
    fn test_error_code_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::FetchFailed).unwrap();
        assert_eq!(json, "\"FETCH_FAILED\"");
    }
}
