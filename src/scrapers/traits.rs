use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::scrapers::types::ScrapeOutcome;

/// Common trait for job-board scrapers
/// This allows easy addition of new boards (Fuzu, MyJobMag, etc) in the future
#[async_trait]
pub trait JobScraper: Send {
    /// Run the scrape and return whatever was collected, together with the
    /// error flag for runs that stopped early
    async fn scrape(&mut self) -> ScrapeOutcome;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}

/// The browser capabilities the pagination loop needs.
///
/// The loop only ever sees rendered markup as strings, so tests drive it
/// with canned pages instead of a live Chrome session.
pub trait PageDriver {
    /// Navigate the main context to `url` and wait for it to settle
    fn open(&mut self, url: &str) -> Result<()>;

    /// Current rendered markup of the main context
    fn markup(&mut self) -> Result<String>;

    /// Click the first element matching `selector` in the main context.
    /// Returns false when no such control exists.
    fn click(&mut self, selector: &str) -> Result<bool>;

    /// Fetch a page in an auxiliary context (opened, rendered, closed)
    /// without disturbing the main context
    fn fetch_page(&mut self, url: &str) -> Result<String>;

    /// Block for `wait` to let a page settle
    fn settle(&mut self, wait: Duration);
}
