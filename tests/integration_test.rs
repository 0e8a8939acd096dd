use linkedin_scraper::{
    CompanyScraper, ErrorCode, ReqwestClient, ScrapingOptions,
};
use mockito::Server;
use std::time::Duration;

const PROFILE_HTML: &str = include_str!("fixtures/company_about.html");
const AUTHWALL_HTML: &str = include_str!("fixtures/authwall.html");

fn options() -> ScrapingOptions {
    ScrapingOptions::default()
        .with_delay(Duration::from_millis(10))
        .with_retries(2)
        .with_timeout(Duration::from_secs(5))
        .with_user_agent("linkedin-scraper-tests/1.0")
}

fn scraper_for(server: &Server, options: ScrapingOptions) -> CompanyScraper {
    let client = ReqwestClient::new(&options)
        .unwrap()
        .with_origin(&server.url())
        .unwrap();
    CompanyScraper::with_client(client, options)
}

#[tokio::test]
async fn test_scrape_company_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/company/acme-corp/")
        .match_header("user-agent", "linkedin-scraper-tests/1.0")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(PROFILE_HTML)
        .expect(1)
        .create_async()
        .await;

    let scraper = scraper_for(&server, options());
    let result = scraper.scrape_company_by_name("Acme Corp").await;

    mock.assert_async().await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    let data = result.data.unwrap();
    assert_eq!(data.name, "Acme Corp");
    assert_eq!(data.industry.as_deref(), Some("Manufacturing"));
    assert_eq!(
        data.specialties.unwrap(),
        vec!["Rockets", "Anvils", "Giant Magnets", "Portable Holes"]
    );
    assert_eq!(data.linkedin_url, "https://www.linkedin.com/company/acme-corp/");
}

#[tokio::test]
async fn test_missing_profile_is_not_found_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/company/no-such-company/")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let scraper = scraper_for(&server, options());
    let result = scraper.scrape_company_by_name("No Such Company").await;

    mock.assert_async().await;
    assert!(!result.success);
    assert_eq!(result.error_code, Some(ErrorCode::NotFound));
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/company/acme-corp/")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let scraper = scraper_for(&server, options());
    let result = scraper
        .scrape_company("https://www.linkedin.com/company/acme-corp/")
        .await;

    mock.assert_async().await;
    assert!(!result.success);
    assert_eq!(result.error_code, Some(ErrorCode::FetchFailed));
    assert!(result.error.unwrap().contains("HTTP 503"));
}

#[tokio::test]
async fn test_login_wall_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/company/acme-corp/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(AUTHWALL_HTML)
        .expect(1)
        .create_async()
        .await;

    let scraper = scraper_for(&server, options());
    let result = scraper
        .scrape_company("https://www.linkedin.com/company/acme-corp/")
        .await;

    mock.assert_async().await;
    assert!(!result.success);
    assert_eq!(result.error_code, Some(ErrorCode::LoginRequired));
}

#[tokio::test]
async fn test_envelope_serializes_for_cli() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/company/acme-corp/")
        .with_status(200)
        .with_body(PROFILE_HTML)
        .create_async()
        .await;

    let scraper = scraper_for(&server, options());
    let result = scraper.scrape_company_by_name("acme corp").await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["name"], "Acme Corp");
    assert_eq!(json["data"]["companySize"], "201-500 employees");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/company/acme-corp/")
        .with_status(200)
        .with_body(PROFILE_HTML)
        .expect(2)
        .create_async()
        .await;

    let scraper = scraper_for(&server, options().with_delay(Duration::from_millis(1000)));

    let start = std::time::Instant::now();
    scraper.scrape_company_by_name("Acme Corp").await;
    scraper.scrape_company_by_name("Acme Corp").await;

    assert!(start.elapsed() >= Duration::from_millis(1000));
}
