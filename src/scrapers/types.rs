use serde::{Deserialize, Serialize};

use crate::models::JobListing;

/// Scrape settings for a run against the job board.
///
/// Site-specific literals (URLs, the cookie-consent selector, the badge text
/// marking promoted listings) live here rather than in the extraction code,
/// so a site tweak is a config change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Listing index page to start from
    pub jobs_url: String,
    /// Pages to scrape before stopping
    pub max_pages: usize,
    /// CSS selector of the cookie-consent agree control
    pub cookie_consent_selector: String,
    /// Badge text that marks a promoted listing card; those cards are
    /// skipped entirely
    pub featured_badge: String,
    /// Wait after the initial page load, milliseconds
    pub settle_ms: u64,
    /// Wait between result pages, milliseconds
    pub page_delay_ms: u64,
    /// Visit each listing's own page for summary/description
    pub fetch_details: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            jobs_url: "https://www.brightermonday.co.ke/jobs/".to_string(),
            max_pages: 5,
            cookie_consent_selector: "div.button.js-cookie-consent-agree".to_string(),
            featured_badge: "Featured".to_string(),
            settle_ms: 5_000,
            page_delay_ms: 1_000,
            fetch_details: true,
        }
    }
}

/// What a scrape run produced.
///
/// `had_error` means the run stopped early on a page-level failure; `jobs`
/// still holds everything collected up to that point.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub jobs: Vec<JobListing>,
    pub pages_scraped: usize,
    pub had_error: bool,
}
