use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

/// Markers that only appear when LinkedIn swaps the profile for an auth wall.
const HARD_MARKERS: &[&str] = &[
    "linkedin.com/authwall",
    "/authwall?",
    "authwall-join-form",
];

/// Sign-in form targets. Logged-out profiles embed a sign-in modal, so these only
/// count when no profile content is present.
const FORM_MARKERS: &[&str] = &["uas/login-submit", "checkpoint/lg/login-submit"];

/// Phrases a logged-out view uses; only conclusive when no profile content is present.
const SOFT_MARKERS: &[&str] = &[
    "sign in to see",
    "join now to see",
    "sign in to view",
    "join linkedin to see",
    "you need to sign in",
];

static LOGIN_FORM_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "form.login__form, form#join-form, form[action*='login-submit'], input#session_password",
    )
    .expect("login form selector is valid")
});

static PROFILE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "h1.org-top-card-summary__title, h1.top-card-layout__title, \
         section.top-card-layout, [data-test-id='about-us'], section.org-top-card",
    )
    .expect("profile selector is valid")
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector is valid"));

/// Reports whether the markup is an authentication interstitial rather than a profile.
pub fn has_login_prompt(html: &str) -> bool {
    let lowered = html.to_lowercase();
    if let Some(marker) = HARD_MARKERS.iter().find(|m| lowered.contains(*m)) {
        debug!("Login wall marker found: {}", marker);
        return true;
    }

    let document = Html::parse_document(html);
    let has_profile = document.select(&PROFILE_SELECTOR).next().is_some();
    if has_profile {
        return false;
    }

    if document.select(&LOGIN_FORM_SELECTOR).next().is_some()
        || FORM_MARKERS.iter().any(|m| lowered.contains(m))
    {
        debug!("Login form found in place of profile content");
        return true;
    }

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().to_lowercase())
        .unwrap_or_default();
    if title.contains("sign up") || title.contains("log in") || title.contains("sign in") {
        debug!("Login page title: {}", title.trim());
        return true;
    }

    SOFT_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Reports whether a (post-redirect) URL is one of LinkedIn's sign-in endpoints.
pub fn is_auth_wall_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let host = parsed.host_str().unwrap_or_default();
    if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
        return false;
    }
    let path = parsed.path();
    ["/authwall", "/login", "/uas/login", "/signup", "/checkpoint/"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
}
