use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::models::{self, JobListing};
use crate::scrapers::traits::{JobScraper, PageDriver};
use crate::scrapers::types::{ScrapeConfig, ScrapeOutcome};

/// Structural signature of one listing card and its sub-elements.
const CARD_SELECTOR: &str = "article.search-result";
const TITLE_LINK_SELECTOR: &str = "a.search-result__job-title";
const TITLE_TEXT_SELECTOR: &str = "h3";
const LOCATION_SELECTOR: &str = "div.search-result__location";
const SALARY_BLOCK_SELECTOR: &str = "div.job-header__salary";
const SALARY_CURRENCY_SELECTOR: &str = "span.text--bold";
const SALARY_AMOUNT_SELECTOR: &str = "span.margin-right--5";
const JOB_TYPE_SELECTOR: &str = "span.search-result__job-type";
const POSTER_SELECTOR: &str = "div.search-result__job-meta";
const CATEGORY_BLOCK_SELECTOR: &str = "div.search-result__job-function";
const CATEGORY_TEXT_SELECTOR: &str = "span.padding-lr-10";
const DATE_POSTED_SELECTOR: &str = "div.top-jobs__content__time";
const NEXT_PAGE_SELECTOR: &str = "a[rel='next']";

/// Labels of the sections pulled from a listing's own page.
const SUMMARY_HEADING: &str = "Job Summary";
const DESCRIPTION_HEADING: &str = "Job Description";

/// Scraper for the BrighterMonday job board.
///
/// Drives a [`PageDriver`] through the listing index, extracts every card on
/// each page and follows the next-page control up to the configured bound.
/// Tests swap in a driver that replays canned markup.
pub struct BrighterMondayScraper<D: PageDriver> {
    driver: D,
    cfg: ScrapeConfig,
}

impl<D: PageDriver> BrighterMondayScraper<D> {
    pub fn new(driver: D, cfg: ScrapeConfig) -> Self {
        Self { driver, cfg }
    }

    /// Run the scrape. Page-level failures stop the loop and set
    /// `had_error`; everything collected up to that point is kept.
    pub fn run(&mut self) -> ScrapeOutcome {
        let mut out = ScrapeOutcome::default();

        if let Err(e) = self.driver.open(&self.cfg.jobs_url) {
            warn!("Failed to open {}: {:#}", self.cfg.jobs_url, e);
            out.had_error = true;
            return out;
        }

        // Cookie consent banner shows up on fresh sessions; dismissing it is
        // best effort and a miss is not an error.
        if let Ok(true) = self.driver.click(&self.cfg.cookie_consent_selector) {
            info!("Cookie consent dismissed");
            self.driver
                .settle(Duration::from_millis(self.cfg.page_delay_ms));
        }

        for page in 1..=self.cfg.max_pages {
            let html = match self.driver.markup() {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to read page {}: {:#}", page, e);
                    out.had_error = true;
                    break;
                }
            };

            let mut page_jobs = extract_listings(&html, &self.cfg, out.jobs.len());
            info!("Scraping page {}: {} listings", page, page_jobs.len());

            if self.cfg.fetch_details {
                for job in &mut page_jobs {
                    self.enrich(job);
                }
            }

            // A page's records land only once the whole page parsed, so an
            // aborted run never holds a partial page.
            out.jobs.append(&mut page_jobs);
            out.pages_scraped = page;

            if page == self.cfg.max_pages {
                break;
            }

            match self.driver.click(NEXT_PAGE_SELECTOR) {
                Ok(true) => {
                    self.driver
                        .settle(Duration::from_millis(self.cfg.page_delay_ms));
                }
                Ok(false) => {
                    info!("No other pages found. Finishing scraping job.");
                    break;
                }
                Err(e) => {
                    warn!("Failed to advance past page {}: {:#}", page, e);
                    out.had_error = true;
                    break;
                }
            }
        }

        info!(
            "Collected {} listings across {} page(s)",
            out.jobs.len(),
            out.pages_scraped
        );
        out
    }

    /// Visit the listing's own page for its summary and description.
    /// Fire and forget: any failure leaves the sentinels in place.
    fn enrich(&mut self, job: &mut JobListing) {
        if job.link == models::NO_LINK {
            return;
        }
        match self.driver.fetch_page(&job.link) {
            Ok(html) => {
                let (summary, description) = parse_detail_sections(&html);
                if let Some(summary) = summary {
                    job.summary = summary;
                }
                if let Some(description) = description {
                    job.description = description;
                }
            }
            Err(e) => {
                warn!("Detail fetch failed for '{}': {:#}", job.title, e);
            }
        }
    }
}

#[async_trait]
impl<D: PageDriver + Send> JobScraper for BrighterMondayScraper<D> {
    async fn scrape(&mut self) -> ScrapeOutcome {
        self.run()
    }

    fn source_name(&self) -> &'static str {
        "BrighterMonday"
    }
}

/// Extract every listing card from one index page, in card order.
///
/// Each field is pulled independently and falls back to its sentinel, so a
/// card missing half its markup still yields a complete record. Promoted
/// cards (badge text matches the configured label) are skipped entirely.
/// `seq_start` numbers fallback IDs across pages.
pub(crate) fn extract_listings(
    html: &str,
    cfg: &ScrapeConfig,
    seq_start: usize,
) -> Vec<JobListing> {
    let document = Html::parse_document(html);
    let card_sel = Selector::parse(CARD_SELECTOR).unwrap();
    let title_link_sel = Selector::parse(TITLE_LINK_SELECTOR).unwrap();
    let title_text_sel = Selector::parse(TITLE_TEXT_SELECTOR).unwrap();
    let location_sel = Selector::parse(LOCATION_SELECTOR).unwrap();
    let salary_block_sel = Selector::parse(SALARY_BLOCK_SELECTOR).unwrap();
    let currency_sel = Selector::parse(SALARY_CURRENCY_SELECTOR).unwrap();
    let amount_sel = Selector::parse(SALARY_AMOUNT_SELECTOR).unwrap();
    let job_type_sel = Selector::parse(JOB_TYPE_SELECTOR).unwrap();
    let poster_sel = Selector::parse(POSTER_SELECTOR).unwrap();
    let category_block_sel = Selector::parse(CATEGORY_BLOCK_SELECTOR).unwrap();
    let category_text_sel = Selector::parse(CATEGORY_TEXT_SELECTOR).unwrap();
    let date_sel = Selector::parse(DATE_POSTED_SELECTOR).unwrap();
    let badge_sel = Selector::parse("span").unwrap();

    let mut jobs = Vec::new();

    for card in document.select(&card_sel) {
        let featured = card
            .select(&badge_sel)
            .any(|span| span.text().collect::<String>().trim() == cfg.featured_badge);
        if featured {
            debug!("Skipping promoted listing card");
            continue;
        }

        let mut job = JobListing::default();

        if let Some(anchor) = card.select(&title_link_sel).next() {
            if let Some(title) = anchor.select(&title_text_sel).next().and_then(clean_text) {
                job.title = title;
            }
            if let Some(href) = anchor.value().attr("href") {
                let href = href.trim();
                if !href.is_empty() {
                    job.link = href.to_string();
                }
            }
        }

        if let Some(location) = select_text(card, &location_sel) {
            job.location = location;
        }

        if let Some(block) = card.select(&salary_block_sel).next() {
            let currency = select_text(block, &currency_sel).unwrap_or_default();
            // Amount is the element's own text only; nested spans carry
            // unrelated qualifiers like "per month".
            let amount = block
                .select(&amount_sel)
                .next()
                .and_then(direct_text)
                .unwrap_or_default();
            if !currency.is_empty() || !amount.is_empty() {
                job.salary = format!("{currency}{amount}");
            }
        }

        if let Some(job_type) = select_text(card, &job_type_sel) {
            job.job_type = job_type;
        }

        if let Some(poster) = select_text(card, &poster_sel) {
            job.poster = poster;
        }

        if let Some(block) = card.select(&category_block_sel).next() {
            if let Some(category) = select_text(block, &category_text_sel) {
                job.category = category;
            }
        }

        if let Some(date_posted) = select_text(card, &date_sel) {
            job.date_posted = date_posted;
        }

        job.id = listing_id(&job.link, seq_start + jobs.len() + 1);
        jobs.push(job);
    }

    jobs
}

/// Pull the "Job Summary" / "Job Description" blocks out of a listing's
/// own page: the first element following the matching heading.
pub(crate) fn parse_detail_sections(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);
    (
        section_after(&document, SUMMARY_HEADING),
        section_after(&document, DESCRIPTION_HEADING),
    )
}

fn section_after(document: &Html, label: &str) -> Option<String> {
    let heading_sel = Selector::parse("h1, h2, h3, h4").unwrap();
    for heading in document.select(&heading_sel) {
        let text = heading.text().collect::<String>();
        if !text.trim().eq_ignore_ascii_case(label) {
            continue;
        }
        let block = heading.next_siblings().filter_map(ElementRef::wrap).next();
        if let Some(content) = block.and_then(clean_text) {
            return Some(content);
        }
    }
    None
}

/// Listing ID: last path segment of the link, or a scrape-order tag when
/// the card had no link.
fn listing_id(link: &str, seq: usize) -> String {
    if link != models::NO_LINK {
        if let Some(slug) = link
            .trim_end_matches('/')
            .rsplit('/')
            .find(|s| !s.is_empty())
        {
            return slug.to_string();
        }
    }
    format!("job-{seq}")
}

fn select_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(clean_text)
}

/// All descendant text, whitespace-normalized. Rendered markup splits text
/// across nodes and indentation, so raw collection is full of noise.
fn clean_text(element: ElementRef) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Only the element's own text nodes, ignoring children.
fn direct_text(element: ElementRef) -> Option<String> {
    let text: String = element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|t| &**t)
        .collect();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::Result;

    use super::*;
    use crate::models;

    const CARD_FULL: &str = r#"
        <article class="search-result">
          <a class="search-result__job-title"
             href="https://www.brightermonday.co.ke/job/senior-developer-nairobi">
            <h3>Senior Developer</h3>
          </a>
          <div class="search-result__location">Nairobi</div>
          <div class="job-header__salary">
            <span class="text--bold">KSh</span>
            <span class="margin-right--5">150,000 - 200,000<span>per month</span></span>
          </div>
          <span class="search-result__job-type">Full Time</span>
          <div class="search-result__job-meta">BrighterMonday Consulting</div>
          <div class="search-result__job-function">
            Job Function: <span class="padding-lr-10">Software &amp; Data</span>
          </div>
          <div class="top-jobs__content__time">2h</div>
        </article>"#;

    const CARD_SPARSE: &str = r#"
        <article class="search-result">
          <div class="search-result__location">Mombasa</div>
        </article>"#;

    const CARD_FEATURED: &str = r#"
        <article class="search-result">
          <span class="search-result__tag">Featured</span>
          <a class="search-result__job-title"
             href="https://www.brightermonday.co.ke/job/promoted-role">
            <h3>Promoted Role</h3>
          </a>
        </article>"#;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <h3>Job Summary</h3>
          <div>Build and ship the product.</div>
          <h3>Job Description</h3>
          <div><p>Own the roadmap.</p><p>Lead a small team.</p></div>
        </body></html>"#;

    fn page(cards: &[&str]) -> String {
        format!("<html><body>{}</body></html>", cards.join("\n"))
    }

    fn config() -> ScrapeConfig {
        ScrapeConfig {
            fetch_details: false,
            ..ScrapeConfig::default()
        }
    }

    #[test]
    fn full_card_extracts_every_field() {
        let jobs = extract_listings(&page(&[CARD_FULL]), &config(), 0);
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.id, "senior-developer-nairobi");
        assert_eq!(job.title, "Senior Developer");
        assert_eq!(
            job.link,
            "https://www.brightermonday.co.ke/job/senior-developer-nairobi"
        );
        assert_eq!(job.location, "Nairobi");
        assert_eq!(job.salary, "KSh150,000 - 200,000");
        assert_eq!(job.job_type, "Full Time");
        assert_eq!(job.poster, "BrighterMonday Consulting");
        assert_eq!(job.category, "Software & Data");
        assert_eq!(job.date_posted, "2h");
        assert_eq!(job.summary, models::NO_SUMMARY);
        assert_eq!(job.description, models::NO_DESCRIPTION);
    }

    #[test]
    fn missing_elements_fall_back_to_sentinels_independently() {
        let jobs = extract_listings(&page(&[CARD_SPARSE]), &config(), 0);
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.title, models::NO_TITLE);
        assert_eq!(job.link, models::NO_LINK);
        assert_eq!(job.location, "Mombasa");
        assert_eq!(job.salary, models::NO_SALARY);
        assert_eq!(job.job_type, models::NO_TYPE);
        assert_eq!(job.poster, models::NO_POSTER);
        assert_eq!(job.category, models::NO_CATEGORY);
        assert_eq!(job.date_posted, models::NO_DATE);
        assert_eq!(job.id, "job-1");
    }

    #[test]
    fn featured_card_is_skipped_and_order_is_preserved() {
        let jobs = extract_listings(
            &page(&[CARD_FULL, CARD_FEATURED, CARD_SPARSE]),
            &config(),
            0,
        );
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Senior Developer");
        assert_eq!(jobs[1].location, "Mombasa");
        // Fallback IDs count emitted records, not skipped cards
        assert_eq!(jobs[1].id, "job-2");
    }

    #[test]
    fn badge_text_is_configuration() {
        let cfg = ScrapeConfig {
            featured_badge: "Promoted".to_string(),
            ..config()
        };
        // "Featured" badge no longer matches, so the card is extracted
        let jobs = extract_listings(&page(&[CARD_FEATURED]), &cfg, 0);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Promoted Role");
    }

    #[test]
    fn detail_sections_are_label_matched() {
        let (summary, description) = parse_detail_sections(DETAIL_PAGE);
        assert_eq!(summary.as_deref(), Some("Build and ship the product."));
        assert_eq!(
            description.as_deref(),
            Some("Own the roadmap. Lead a small team.")
        );

        let (none_summary, none_description) =
            parse_detail_sections("<html><body><h3>Other</h3><p>x</p></body></html>");
        assert_eq!(none_summary, None);
        assert_eq!(none_description, None);
    }

    /// Replays canned pages through the driver interface.
    struct FakeDriver {
        pages: Vec<String>,
        details: HashMap<String, String>,
        current: usize,
        fail_markup_at: Option<usize>,
        fail_details: bool,
        detail_fetches: usize,
    }

    impl FakeDriver {
        fn new(pages: Vec<String>) -> Self {
            Self {
                pages,
                details: HashMap::new(),
                current: 0,
                fail_markup_at: None,
                fail_details: false,
                detail_fetches: 0,
            }
        }
    }

    impl PageDriver for FakeDriver {
        fn open(&mut self, _url: &str) -> Result<()> {
            self.current = 0;
            Ok(())
        }

        fn markup(&mut self) -> Result<String> {
            if self.fail_markup_at == Some(self.current) {
                anyhow::bail!("markup read failed");
            }
            Ok(self.pages[self.current].clone())
        }

        fn click(&mut self, selector: &str) -> Result<bool> {
            if selector != NEXT_PAGE_SELECTOR {
                return Ok(false);
            }
            if self.current + 1 < self.pages.len() {
                self.current += 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        fn fetch_page(&mut self, url: &str) -> Result<String> {
            self.detail_fetches += 1;
            if self.fail_details {
                anyhow::bail!("detail fetch failed");
            }
            self.details
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no canned page for {url}"))
        }

        fn settle(&mut self, _wait: Duration) {}
    }

    fn scraper_with(driver: FakeDriver, cfg: ScrapeConfig) -> BrighterMondayScraper<FakeDriver> {
        BrighterMondayScraper::new(
            driver,
            ScrapeConfig {
                settle_ms: 0,
                page_delay_ms: 0,
                ..cfg
            },
        )
    }

    #[test]
    fn stops_at_the_page_bound() {
        let pages = vec![
            page(&[CARD_FULL]),
            page(&[CARD_SPARSE]),
            page(&[CARD_FULL]),
        ];
        let cfg = ScrapeConfig {
            max_pages: 2,
            ..config()
        };
        let outcome = scraper_with(FakeDriver::new(pages), cfg).run();
        assert_eq!(outcome.pages_scraped, 2);
        assert_eq!(outcome.jobs.len(), 2);
        assert!(!outcome.had_error);
    }

    #[test]
    fn stops_early_when_no_next_control() {
        let pages = vec![page(&[CARD_FULL]), page(&[CARD_SPARSE])];
        let cfg = ScrapeConfig {
            max_pages: 5,
            ..config()
        };
        let outcome = scraper_with(FakeDriver::new(pages), cfg).run();
        assert_eq!(outcome.pages_scraped, 2);
        assert_eq!(outcome.jobs.len(), 2);
        assert!(!outcome.had_error);
    }

    #[test]
    fn page_failure_keeps_exactly_the_completed_pages() {
        let pages = vec![
            page(&[CARD_FULL]),
            page(&[CARD_SPARSE]),
            page(&[CARD_FULL]),
        ];
        let mut driver = FakeDriver::new(pages);
        driver.fail_markup_at = Some(2);
        let cfg = ScrapeConfig {
            max_pages: 5,
            ..config()
        };
        let outcome = scraper_with(driver, cfg).run();
        assert!(outcome.had_error);
        assert_eq!(outcome.pages_scraped, 2);
        assert_eq!(outcome.jobs.len(), 2);
        assert_eq!(outcome.jobs[0].title, "Senior Developer");
        assert_eq!(outcome.jobs[1].location, "Mombasa");
    }

    #[test]
    fn detail_pages_enrich_summary_and_description() {
        let mut driver = FakeDriver::new(vec![page(&[CARD_FULL])]);
        driver.details.insert(
            "https://www.brightermonday.co.ke/job/senior-developer-nairobi".to_string(),
            DETAIL_PAGE.to_string(),
        );
        let cfg = ScrapeConfig {
            max_pages: 1,
            fetch_details: true,
            ..ScrapeConfig::default()
        };
        let outcome = scraper_with(driver, cfg).run();
        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.jobs[0].summary, "Build and ship the product.");
        assert_eq!(
            outcome.jobs[0].description,
            "Own the roadmap. Lead a small team."
        );
        assert!(!outcome.had_error);
    }

    #[test]
    fn detail_failure_keeps_sentinels_and_continues() {
        let mut driver = FakeDriver::new(vec![page(&[CARD_FULL, CARD_FULL])]);
        driver.fail_details = true;
        let cfg = ScrapeConfig {
            max_pages: 1,
            fetch_details: true,
            ..ScrapeConfig::default()
        };
        let outcome = scraper_with(driver, cfg).run();
        assert_eq!(outcome.jobs.len(), 2);
        for job in &outcome.jobs {
            assert_eq!(job.summary, models::NO_SUMMARY);
            assert_eq!(job.description, models::NO_DESCRIPTION);
        }
        assert!(!outcome.had_error, "detail failures are recoverable");
    }

    #[test]
    fn cards_without_links_skip_the_detail_fetch() {
        let mut driver = FakeDriver::new(vec![page(&[CARD_SPARSE])]);
        driver.fail_details = true;
        let cfg = ScrapeConfig {
            max_pages: 1,
            fetch_details: true,
            ..ScrapeConfig::default()
        };
        let mut scraper = scraper_with(driver, cfg);
        let outcome = scraper.run();
        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(scraper.driver.detail_fetches, 0);
    }
}
