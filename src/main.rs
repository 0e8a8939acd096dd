use indicatif::{ProgressBar, ProgressStyle};
use linkedin_scraper::{CompanyScraper, ScrapingOptions};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// The main entry point of the `run-scraper` binary.
///
/// Takes a company name (or a LinkedIn company URL) from the command line, scrapes
/// the profile, and prints the JSON envelope on success or the error message on failure.
/// Options come from an optional `scraper.toml` and `SCRAPER_*` environment variables.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Everything after the binary name is the company, so unquoted names work too
    let target = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let target = target.trim();
    if target.is_empty() {
        eprintln!("Usage: run-scraper <company name | linkedin company url>");
        return Ok(ExitCode::from(2));
    }

    // Load configuration
    let options = ScrapingOptions::load("scraper")?;
    let scraper = CompanyScraper::new(options)?;
    debug!(options = ?scraper.options(), "Loaded scraping options");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scraping '{}'...", target));

    let start_time = Instant::now();
    let result = if target.starts_with("http://") || target.starts_with("https://") {
        scraper.scrape_company(target).await
    } else {
        scraper.scrape_company_by_name(target).await
    };
    spinner.finish_and_clear();
    debug!("Processing time: {:.2?}", start_time.elapsed());

    if result.success {
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(ExitCode::SUCCESS)
    } else {
        let message = result.error.unwrap_or_else(|| "unknown error".to_string());
        error!("Scrape failed: {}", message);
        eprintln!("{}", message);
        Ok(ExitCode::FAILURE)
    }
}
