use crate::rate_limit::RateLimiter;
use crate::{Result, ScrapingError, ScrapingOptions};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// A fetched page: final status, final URL after redirects, and the body text.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

/// A failure below HTTP: timeout, refused or reset connection, unreadable body.
/// Always treated as transient.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(format!("request timed out: {}", e))
        } else if e.is_connect() {
            Self::new(format!("connection failed: {}", e))
        } else {
            Self::new(e.to_string())
        }
    }
}

/// The HTTP GET capability the scraper needs.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError>;
}

/// The `ReqwestClient` performs real requests with browser-like headers.
pub struct ReqwestClient {
    /// The HTTP client used for making requests.
    client: Client,
    /// Replaces scheme, host and port of every request when set.
    origin: Option<Url>,
}

impl ReqwestClient {
    /// Creates a new `ReqwestClient` from the scraping options.
    ///
    /// # Arguments
    ///
    /// * `options` - Supplies the user agent and per-request timeout.
    ///
    /// # Returns
    ///
    /// A `Result` containing the client, or `ScrapingError::Client` if reqwest cannot build one.
    pub fn new(options: &ScrapingOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&options.user_agent)
            .timeout(options.timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            origin: None,
        })
    }

    /// Sends every request to `origin` instead of the URL's own host, keeping path and query.
    pub fn with_origin(mut self, origin: &str) -> Result<Self> {
        let parsed = Url::parse(origin).map_err(|e| ScrapingError::InvalidUrl {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;
        self.origin = Some(parsed);
        Ok(self)
    }

    fn resolve(&self, url: &str) -> String {
        let Some(origin) = &self.origin else {
            return url.to_string();
        };
        match Url::parse(url) {
            Ok(parsed) => {
                let mut target = format!("{}{}", origin.as_str().trim_end_matches('/'), parsed.path());
                if let Some(query) = parsed.query() {
                    target.push('?');
                    target.push_str(query);
                }
                target
            }
            Err(_) => url.to_string(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError> {
        let target = self.resolve(url);
        debug!("GET {}", target);

        let response = self
            .client
            .get(&target)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Connection", "keep-alive")
            .header("Upgrade-Insecure-Requests", "1")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .send()
            .await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        debug!("Response status: {}", status);

        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            url: final_url,
            body,
        })
    }
}

/// 5xx, 429 and LinkedIn's bot-throttling 999 are worth another attempt.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status == 999 || (500..600).contains(&status)
}

/// Fetches a company page, retrying transient failures.
///
/// Every attempt, the first included, waits on the rate limiter. A non-retryable
/// non-2xx status ends the loop at once with `NotFound`.
///
/// # Arguments
///
/// * `client` - The HTTP client to use.
/// * `limiter` - Spaces out attempts.
/// * `url` - The page to fetch.
/// * `retries` - Extra attempts after the first.
///
/// # Returns
///
/// The 2xx response, or `FetchFailed` carrying the last transient error once all
/// `retries + 1` attempts are spent.
#[instrument(skip(client, limiter))]
pub async fn fetch_company_page<C: HttpClient + ?Sized>(
    client: &C,
    limiter: &RateLimiter,
    url: &str,
    retries: u32,
) -> Result<HttpResponse> {
    let attempts = retries.saturating_add(1);
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=attempts {
        limiter.respect_rate_limit().await;

        match client.get(url).await {
            Ok(response) if (200..300).contains(&response.status) => {
                debug!(attempt, "Fetched {} ({} bytes)", url, response.body.len());
                return Ok(response);
            }
            Ok(response) if is_retryable_status(response.status) => {
                warn!(attempt, attempts, "HTTP {} from {}", response.status, url);
                last_error = format!("HTTP {}", response.status);
            }
            Ok(response) => {
                return Err(ScrapingError::NotFound {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            Err(e) => {
                warn!(attempt, attempts, "Request to {} failed: {}", url, e);
                last_error = e.message;
            }
        }
    }

    Err(ScrapingError::FetchFailed {
        url: url.to_string(),
        attempts,
        message: last_error,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    pub(crate) type Scripted = std::result::Result<HttpResponse, TransportError>;

    /// Replays canned responses in order; the last one repeats once the script runs out.
    pub(crate) struct ScriptedClient {
        script: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedClient {
        pub(crate) fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn ok(body: &str) -> Scripted {
            Self::status(200, body)
        }

        pub(crate) fn status(status: u16, body: &str) -> Scripted {
            Ok(HttpResponse {
                status,
                url: "https://www.linkedin.com/company/acme-corp/".to_string(),
                body: body.to_string(),
            })
        }

        pub(crate) fn transport(message: &str) -> Scripted {
            Err(TransportError::new(message))
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }

        pub(crate) fn requested_urls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), Instant::now()));
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Err(TransportError::new("script exhausted")))
            }
        }
    }
}
