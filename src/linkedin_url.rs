//! Building and validating LinkedIn company profile URLs.
//!
//! Everything here is pure: no I/O, deterministic output.

use crate::{Result, ScrapingError};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const COMPANY_BASE_URL: &str = "https://www.linkedin.com/company/";

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%-]+$").expect("slug regex is valid"));

/// Turns a human-entered company name into a URL-safe slug.
///
/// Letters and digits are lowercased and kept, apostrophes are dropped, and every
/// other run of characters collapses into a single `-`. Non-ASCII letters survive
/// percent-encoded.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c == '\'' || c == '\u{2019}' {
            continue;
        } else {
            pending_dash = true;
        }
    }

    urlencoding::encode(&slug).into_owned()
}

/// Builds the candidate profile URL for a company name or an existing slug.
///
/// A name without any letters or digits produces a URL with an empty slug, which
/// [`validate_linkedin_url`] rejects.
pub fn build_linkedin_url(company_name_or_slug: &str) -> String {
    format!("{}{}/", COMPANY_BASE_URL, slugify(company_name_or_slug))
}

/// Checks that `url` points at a LinkedIn company profile.
///
/// Accepted shape: `http(s)://[sub.]linkedin.com/company/<slug>[/<subpage>][/]`.
///
/// # Returns
///
/// The parsed URL, or `ScrapingError::InvalidUrl` describing the first rule it breaks.
pub fn validate_linkedin_url(url: &str) -> Result<Url> {
    let invalid = |reason: &str| ScrapingError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
        return Err(invalid("host is not linkedin.com"));
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        ["company", slug] | ["company", slug, _] if SLUG_RE.is_match(slug) => Ok(parsed),
        ["company"] => Err(invalid("missing company slug")),
        ["company", ..] => Err(invalid("malformed company path")),
        _ => Err(invalid("path is not a /company/ profile")),
    }
}

/// Extracts the company slug from an already validated profile URL.
pub fn company_slug(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .nth(1)
        .map(|s| s.to_ascii_lowercase())
}

/// Normalises a profile URL to `https://www.linkedin.com/company/<slug>/`,
/// dropping subpages, query, and fragment.
pub fn canonical_company_url(url: &Url) -> Option<String> {
    company_slug(url).map(|slug| format!("{}{}/", COMPANY_BASE_URL, slug))
}
