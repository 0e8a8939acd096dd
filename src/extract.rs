//! Field extractors for LinkedIn company pages.
//!
//! Each extractor pulls one field out of a parsed document and returns `None` when
//! the field is absent or unparseable. Extractors share no state and never call
//! one another, apart from the label lookup and redirect unwrapping helpers.

use crate::types::CompanyData;
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

/// Parses selectors the same way for every extractor, skipping any that fail to parse.
fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

static NAME_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "h1.org-top-card-summary__title",
        "h1.top-card-layout__title",
        "[data-test-id='org-name']",
    ])
});

static DESCRIPTION_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[data-test-id='about-us__description']",
        "p.about-us__description",
        "p.org-about-us-organization-description__text",
    ])
});

static WEBSITE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[data-test-id='about-us__website'] a[href]",
        "a[data-tracking-control-name='about_website']",
    ])
});

static LOGO_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "img.top-card-layout__entity-image",
        "img.org-top-card-primary-content__logo",
        "img[data-test-id='org-logo']",
    ])
});

static FOLLOWER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        ".top-card-layout__first-subline",
        ".org-top-card-summary-info-list",
        "[data-test-id='followers']",
    ])
});

static META_TITLE: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["meta[property='og:title']", "title"]));
static META_DESCRIPTION: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "meta[name='description']",
        "meta[property='og:description']",
    ])
});
static META_IMAGE: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["meta[property='og:image']"]));
static CANONICAL: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["link[rel='canonical']", "meta[property='og:url']"]));

static DT: Lazy<Selector> = Lazy::new(|| Selector::parse("dt").expect("dt selector is valid"));
static LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("link selector is valid"));

static TITLE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\s*(\|\s*LinkedIn|:\s*(Overview|About|Jobs|People|Posts|Life)))+\s*$")
        .expect("title suffix regex is valid")
});
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("year regex is valid"));
static FOLLOWERS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d[\d,.]*)\s*([KM])?\s+followers").expect("followers regex is valid")
});

const REDIRECT_PARAMS: &[&str] = &["url", "dest", "destination", "q", "u"];
const EARLIEST_FOUNDED_YEAR: i32 = 1800;

/// Runs every extractor against the document and assembles the profile.
///
/// # Returns
///
/// `None` only when no company name can be found, since a profile without a name
/// is not a profile.
#[instrument(skip(document))]
pub fn extract_company(document: &Html, linkedin_url: &str) -> Option<CompanyData> {
    let name = extract_company_name(document)?;

    Some(CompanyData {
        name,
        description: extract_description(document),
        website: extract_website(document),
        company_url: extract_company_url(document),
        industry: extract_industry(document),
        company_size: extract_company_size(document),
        headquarters: extract_headquarters(document),
        founded: extract_founded_year(document),
        specialties: extract_specialties(document),
        logo: extract_logo(document),
        linkedin_url: linkedin_url.to_string(),
        followers: extract_followers(document),
    })
}

pub fn extract_company_name(document: &Html) -> Option<String> {
    first_text(document, &NAME_SELECTORS).or_else(|| {
        let title = first_content_or_text(document, &META_TITLE)?;
        let name = TITLE_SUFFIX_RE.replace(&title, "").trim().to_string();
        let lowered = name.to_lowercase();
        if name.is_empty() || lowered == "linkedin" || lowered.starts_with("sign up") {
            None
        } else {
            Some(name)
        }
    })
}

/// Prefers the About section body, then the page's meta description with the
/// "Name | N followers on LinkedIn." preamble removed.
pub fn extract_description(document: &Html) -> Option<String> {
    first_text(document, &DESCRIPTION_SELECTORS).or_else(|| {
        let meta = first_content_or_text(document, &META_DESCRIPTION)?;
        let description = if meta.contains("on LinkedIn") {
            meta.rsplit(" | ").next().unwrap_or_default().trim().to_string()
        } else {
            meta
        };
        non_empty(description)
    })
}

pub fn extract_website(document: &Html) -> Option<String> {
    for selector in WEBSITE_SELECTORS.iter() {
        for element in document.select(selector) {
            if let Some(url) = element.value().attr("href").and_then(extract_redirect_url) {
                return Some(url);
            }
        }
    }

    extract_website_from_data_table(document)
}

/// Reads the website from a "Website" row of the about table, for layouts without
/// the tracked about-link.
pub fn extract_website_from_data_table(document: &Html) -> Option<String> {
    let value = find_value_element(document, "Website")?;

    if let Some(url) = value
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .find_map(extract_redirect_url)
    {
        return Some(url);
    }

    let text = element_text(&value);
    if text.contains(char::is_whitespace) || !text.contains('.') {
        return None;
    }
    if text.starts_with("http://") || text.starts_with("https://") {
        extract_redirect_url(&text)
    } else {
        extract_redirect_url(&format!("https://{}", text))
    }
}

/// Unwraps LinkedIn/tracker redirect links into their real destination.
///
/// Relative links resolve against linkedin.com. A link whose query carries an
/// absolute http(s) URL in `url`, `dest`, `destination`, `q` or `u` yields that
/// URL (unwrapped again if it is itself a redirect). Anything that is not http(s)
/// yields `None`.
pub fn extract_redirect_url(href: &str) -> Option<String> {
    let base = Url::parse("https://www.linkedin.com/").ok()?;
    let parsed = base.join(href.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let wrapped = parsed
        .query_pairs()
        .find(|(key, value)| {
            REDIRECT_PARAMS.contains(&&**key)
                && (value.starts_with("http://") || value.starts_with("https://"))
        })
        .map(|(_, value)| value.into_owned());

    match wrapped {
        Some(destination) if destination != href => {
            debug!("Unwrapped redirect {} -> {}", href, destination);
            extract_redirect_url(&destination)
        }
        _ => {
            let host = parsed.host_str().unwrap_or_default();
            let is_linkedin_redirect = (host == "linkedin.com" || host.ends_with(".linkedin.com"))
                && parsed.path().starts_with("/redir");
            if is_linkedin_redirect {
                None
            } else {
                Some(parsed.to_string())
            }
        }
    }
}

pub fn extract_industry(document: &Html) -> Option<String> {
    extract_info_by_label(document, "Industry")
        .or_else(|| extract_info_by_label(document, "Industries"))
}

pub fn extract_company_size(document: &Html) -> Option<String> {
    extract_info_by_label(document, "Company size")
}

pub fn extract_headquarters(document: &Html) -> Option<String> {
    extract_info_by_label(document, "Headquarters")
}

/// Reads the "Founded" row as a year; values outside 1800..=this year are dropped.
pub fn extract_founded_year(document: &Html) -> Option<i32> {
    let text = extract_info_by_label(document, "Founded")?;
    let year: i32 = YEAR_RE.captures(&text)?.get(1)?.as_str().parse().ok()?;
    let current_year = chrono::Utc::now().year();

    if (EARLIEST_FOUNDED_YEAR..=current_year).contains(&year) {
        Some(year)
    } else {
        debug!("Ignoring implausible founded year {}", year);
        None
    }
}

/// Splits the "Specialties" row into a trimmed list, keeping the first spelling of
/// case-insensitive duplicates.
pub fn extract_specialties(document: &Html) -> Option<Vec<String>> {
    let text = extract_info_by_label(document, "Specialties")?;
    let mut seen = HashSet::new();

    let specialties: Vec<String> = text
        .split(',')
        .map(|s| {
            let s = s.trim();
            match s.get(..4) {
                Some(prefix) if prefix.eq_ignore_ascii_case("and ") => s[4..].trim(),
                _ => s,
            }
        })
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect();

    if specialties.is_empty() {
        None
    } else {
        Some(specialties)
    }
}

/// Looks up the value paired with `label` in the page's `<dt>`/`<dd>` tables.
///
/// Labels match case-insensitively, ignoring surrounding whitespace and a trailing
/// colon. The first non-empty `<dd>` following the label wins.
pub fn extract_info_by_label(document: &Html, label: &str) -> Option<String> {
    find_value_element(document, label)
        .map(|dd| element_text(&dd))
        .and_then(non_empty)
}

fn find_value_element<'a>(document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    document
        .select(&DT)
        .filter(|dt| {
            element_text(dt)
                .trim_end_matches(':')
                .trim()
                .eq_ignore_ascii_case(label)
        })
        .find_map(|dt| {
            dt.next_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|el| el.value().name() != "dt")
                .find(|el| el.value().name() == "dd" && !element_text(el).is_empty())
        })
}

pub fn extract_logo(document: &Html) -> Option<String> {
    for selector in LOGO_SELECTORS.iter() {
        for element in document.select(selector) {
            let attrs = ["data-delayed-url", "src", "data-ghost-url"];
            if let Some(src) = attrs
                .iter()
                .filter_map(|attr| element.value().attr(attr))
                .find(|src| is_http_url(src))
            {
                return Some(src.to_string());
            }
        }
    }

    first_content_or_text(document, &META_IMAGE).filter(|src| is_http_url(src))
}

/// Follower count from the top card, falling back to the meta description.
/// Understands thousands separators and `K`/`M` suffixes.
pub fn extract_followers(document: &Html) -> Option<u64> {
    let top_card = FOLLOWER_SELECTORS
        .iter()
        .flat_map(|selector| document.select(selector))
        .map(|element| element_text(&element));
    let meta = first_content_or_text(document, &META_DESCRIPTION);

    top_card.chain(meta).find_map(|text| parse_followers(&text))
}

fn parse_followers(text: &str) -> Option<u64> {
    let caps = FOLLOWERS_RE.captures(text)?;
    let number = caps.get(1)?.as_str().trim_end_matches(['.', ',']);

    match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(suffix) => {
            let value: f64 = number.replace(',', "").parse().ok()?;
            let multiplier = if suffix == "M" { 1_000_000.0 } else { 1_000.0 };
            Some((value * multiplier).round() as u64)
        }
        None => number.replace([',', '.'], "").parse().ok(),
    }
}

pub fn extract_company_url(document: &Html) -> Option<String> {
    CANONICAL
        .iter()
        .flat_map(|selector| document.select(selector))
        .filter_map(|el| el.value().attr("href").or_else(|| el.value().attr("content")))
        .find(|href| is_http_url(href))
        .map(|href| href.trim().to_string())
}

fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| document.select(selector))
        .map(|element| element_text(&element))
        .find(|text| !text.is_empty())
}

fn first_content_or_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| document.select(selector))
        .filter_map(|element| match element.value().attr("content") {
            Some(content) => non_empty(clean_text(content)),
            None => non_empty(element_text(&element)),
        })
        .next()
}

fn element_text(element: &ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Collapses all whitespace runs into single spaces.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("https://") || value.starts_with("http://")
}
