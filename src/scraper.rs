use crate::extract::extract_company;
use crate::fetcher::{fetch_company_page, HttpClient, ReqwestClient};
use crate::linkedin_url::{build_linkedin_url, canonical_company_url, validate_linkedin_url};
use crate::login_wall::{has_login_prompt, is_auth_wall_url};
use crate::rate_limit::RateLimiter;
use crate::{CompanyData, Result, ScrapingError, ScrapingOptions, ScrapingResult};
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};

/// The `CompanyScraper` turns LinkedIn company URLs or names into [`CompanyData`].
///
/// Each instance owns its own rate limiter, so independent scrapers never slow
/// each other down, while calls on one instance are spaced by `options.delay`.
pub struct CompanyScraper<C: HttpClient = ReqwestClient> {
    /// The HTTP client used for making requests.
    client: C,
    /// The options this scraper was built with.
    options: ScrapingOptions,
    /// Spaces out every outbound request, retries included.
    rate_limiter: RateLimiter,
}

impl CompanyScraper<ReqwestClient> {
    /// Creates a new `CompanyScraper` backed by a reqwest client.
    ///
    /// # Arguments
    ///
    /// * `options` - Timeout, retries, delay and user agent for this scraper.
    ///
    /// # Returns
    ///
    /// A `Result` containing the scraper, or an error if the HTTP client could not be created.
    pub fn new(options: ScrapingOptions) -> Result<Self> {
        let client = ReqwestClient::new(&options)?;
        Ok(Self::with_client(client, options))
    }
}

impl<C: HttpClient> CompanyScraper<C> {
    /// Creates a scraper over any [`HttpClient`].
    pub fn with_client(client: C, options: ScrapingOptions) -> Self {
        if let Some(credentials) = &options.credentials {
            warn!(
                username = %credentials.username,
                "Credentials supplied but only public profiles are scraped; continuing logged out"
            );
        }

        let rate_limiter = RateLimiter::new(options.delay());
        debug!(
            delay = ?rate_limiter.delay(),
            retries = options.retries,
            "Scraper ready"
        );

        Self {
            client,
            rate_limiter,
            options,
        }
    }

    pub fn options(&self) -> &ScrapingOptions {
        &self.options
    }

    /// Scrapes one company profile.
    ///
    /// Never fails: every pipeline error comes back as a failed [`ScrapingResult`]
    /// carrying the message and its [`crate::ErrorCode`].
    #[instrument(skip(self))]
    pub async fn scrape_company(&self, linkedin_url: &str) -> ScrapingResult<CompanyData> {
        let result = self.try_scrape_company(linkedin_url).await;

        match &result {
            Ok(data) => info!("Scraped '{}' from {}", data.name, data.linkedin_url),
            Err(e) => error!(code = %e.code(), "Scrape of {} failed: {}", linkedin_url, e),
        }

        result.into()
    }

    /// Guesses the profile URL from a company name and scrapes it.
    ///
    /// There is no search step: a name whose slug differs from the real profile's
    /// ends in `NOT_FOUND` or `LOGIN_REQUIRED` like any other bad URL.
    #[instrument(skip(self))]
    pub async fn scrape_company_by_name(&self, company_name: &str) -> ScrapingResult<CompanyData> {
        let url = build_linkedin_url(company_name);
        debug!("Resolved '{}' to {}", company_name, url);
        self.scrape_company(&url).await
    }

    async fn try_scrape_company(&self, linkedin_url: &str) -> Result<CompanyData> {
        let parsed = validate_linkedin_url(linkedin_url)?;
        let canonical = canonical_company_url(&parsed).unwrap_or_else(|| parsed.to_string());

        let response = fetch_company_page(
            &self.client,
            &self.rate_limiter,
            parsed.as_str(),
            self.options.retries,
        )
        .await?;

        if is_auth_wall_url(&response.url) || has_login_prompt(&response.body) {
            warn!("Login wall served for {}", parsed);
            return Err(ScrapingError::LoginRequired {
                url: parsed.to_string(),
            });
        }

        extract_from_body(&response.body, &canonical).ok_or_else(|| {
            debug!("No company name found in {} byte page", response.body.len());
            ScrapingError::NotFound {
                url: parsed.to_string(),
                status: response.status,
            }
        })
    }
}

/// Parses and extracts in one synchronous step so the document never lives across an await.
fn extract_from_body(body: &str, linkedin_url: &str) -> Option<CompanyData> {
    let document = Html::parse_document(body);
    extract_company(&document, linkedin_url)
}

/// One-shot variant of [`CompanyScraper::scrape_company`] with its own fresh rate limiter.
pub async fn scrape_company(
    linkedin_url: &str,
    options: Option<ScrapingOptions>,
) -> ScrapingResult<CompanyData> {
    match CompanyScraper::new(options.unwrap_or_default()) {
        Ok(scraper) => scraper.scrape_company(linkedin_url).await,
        Err(e) => ScrapingResult::err(&e),
    }
}

/// One-shot variant of [`CompanyScraper::scrape_company_by_name`].
pub async fn scrape_company_by_name(
    company_name: &str,
    options: Option<ScrapingOptions>,
) -> ScrapingResult<CompanyData> {
    match CompanyScraper::new(options.unwrap_or_default()) {
        Ok(scraper) => scraper.scrape_company_by_name(company_name).await,
        Err(e) => ScrapingResult::err(&e),
    }
}
