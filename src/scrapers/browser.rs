use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use crate::scrapers::traits::PageDriver;

/// Headless-Chrome implementation of [`PageDriver`].
///
/// The main context is a single tab that the pagination loop navigates and
/// clicks through; auxiliary fetches open a second tab, capture its rendered
/// markup and close it again so the index page keeps its state.
pub struct ChromeDriver {
    browser: Browser,
    tab: Option<Arc<Tab>>,
    settle: Duration,
}

impl ChromeDriver {
    /// Launch headless Chrome. `settle` is the wait applied after each
    /// navigation before the page is considered rendered.
    pub fn new(settle: Duration) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((1024, 768)))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser,
            tab: None,
            settle,
        })
    }

    fn current_tab(&self) -> Result<&Arc<Tab>> {
        self.tab
            .as_ref()
            .context("No page open yet; call open() first")
    }

    /// Rendered markup of a tab via the DOM, not the raw response body,
    /// so script-built content is included.
    fn tab_markup(tab: &Tab) -> Result<String> {
        let result = tab
            .evaluate("document.documentElement.outerHTML", false)
            .context("Failed to read page HTML")?;
        let html = result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        Ok(html)
    }
}

impl PageDriver for ChromeDriver {
    fn open(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        let tab = self.browser.new_tab()?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        thread::sleep(self.settle);
        self.tab = Some(tab);
        Ok(())
    }

    fn markup(&mut self) -> Result<String> {
        let tab = self.current_tab()?;
        Self::tab_markup(tab)
    }

    fn click(&mut self, selector: &str) -> Result<bool> {
        let tab = self.current_tab()?;
        // Click through querySelector: a trusted Element::click can stale out
        // when the card list re-renders under it.
        let expr = format!(
            "(() => {{ const el = document.querySelector({selector:?}); \
             if (el) {{ el.click(); return true; }} return false; }})()"
        );
        let result = tab.evaluate(&expr, false)?;
        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    fn fetch_page(&mut self, url: &str) -> Result<String> {
        debug!("Opening auxiliary tab for {}", url);
        let tab = self
            .browser
            .new_tab()
            .context("Failed to open auxiliary tab")?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        thread::sleep(self.settle);

        let html = Self::tab_markup(&tab);
        let _ = tab.close(true);
        html
    }

    fn settle(&mut self, wait: Duration) {
        thread::sleep(wait);
    }
}
