//! Headless-browser web search and page extraction
//!
//! Implements the search/fetch service boundary: given a query and a result
//! limit, return extracted page text for the top results. One browser
//! session is launched per research job and reused for every search that
//! job performs; the deep-research branch is its only consumer.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::{FutureExt, StreamExt};
use scout_core::{retry_async, with_timeout, RetryConfig, ScoutError, ScoutResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Timeout for loading and extracting a single page.
const PAGE_FETCH_TIMEOUT_MS: u64 = 15_000;

/// One search result with the page text extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub url: String,
    /// Readable text extracted from the page. May be short for sparse
    /// pages; callers filter empty entries before summarization.
    pub markdown: String,
}

/// Web search/fetch service boundary.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a web search and fetch+extract text from the result pages.
    ///
    /// Returns at most `limit` records. A failed fetch for an individual
    /// URL is omitted from the results rather than failing the batch.
    async fn search(&self, query: &str, limit: usize) -> ScoutResult<Vec<SearchRecord>>;

    /// Release any underlying resources. Default is a no-op.
    async fn close(&self) {}
}

/// Acquires a search session for a job.
#[async_trait]
pub trait SearchSessionFactory: Send + Sync {
    async fn acquire(&self) -> ScoutResult<Arc<dyn SearchProvider>>;
}

/// Extracts result links from a DuckDuckGo HTML results page, decoding the
/// redirect wrapper so callers see the destination URL.
const SERP_LINKS_JS: &str = r#"
(function () {
    var seen = {};
    var out = [];
    var links = document.querySelectorAll('a.result__a');
    links.forEach(function (a) {
        var href = a.getAttribute('href') || '';
        var title = (a.innerText || '').trim();
        if (href.indexOf('uddg=') !== -1) {
            var m = href.match(/uddg=([^&]+)/);
            if (m) href = decodeURIComponent(m[1]);
        }
        if (!/^https?:\/\//.test(href)) return;
        if (href.indexOf('duckduckgo.com') !== -1) return;
        if (seen[href]) return;
        seen[href] = true;
        out.push({ url: href, title: title.substring(0, 200) });
    });
    return JSON.stringify(out.slice(0, 20));
})()
"#;

/// Extracts readable text from an arbitrary page, dropping navigation and
/// boilerplate elements and preferring the main content area.
const PAGE_TEXT_JS: &str = r#"
(function () {
    var body = document.body.cloneNode(true);
    var noise = body.querySelectorAll(
        'script, style, nav, header, footer, aside, iframe, noscript, svg, ' +
        '[role="navigation"], [role="banner"], [aria-hidden="true"]'
    );
    noise.forEach(function (n) { if (n.parentNode) n.parentNode.removeChild(n); });
    var main = body.querySelector(
        'main, article, [role="main"], .post-content, .article-content, .entry-content'
    );
    var text = (main || body).innerText || '';
    text = text.replace(/\n{3,}/g, '\n\n').replace(/[ \t]{2,}/g, ' ').trim();
    return text.substring(0, 8000);
})()
"#;

#[derive(Debug, serde::Deserialize)]
struct SerpLink {
    url: String,
    #[allow(dead_code)]
    title: String,
}

/// Search provider backed by a headless Chromium session.
///
/// A single page is reused for every navigation; callers drive searches
/// sequentially within one research branch, so no page-level concurrency
/// is needed.
pub struct BrowserSearchProvider {
    browser: Mutex<Browser>,
    page: Mutex<Page>,
    handler: tokio::task::JoinHandle<()>,
}

impl BrowserSearchProvider {
    /// Launch a headless browser and open a blank page for reuse.
    pub async fn launch() -> ScoutResult<Self> {
        let config = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| {
                ScoutError::browser(format!("Failed to build browser config: {}", e), "search")
            })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            ScoutError::browser(format!("Failed to launch browser: {}", e), "search")
        })?;

        // The CDP event handler must be polled for the session to function.
        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser.new_page("about:blank").await.map_err(|e| {
            ScoutError::browser(format!("Failed to create page: {}", e), "search")
        })?;

        info!("Browser search session started");

        Ok(Self {
            browser: Mutex::new(browser),
            page: Mutex::new(page),
            handler: handler_task,
        })
    }

    /// Navigate the shared page and evaluate an extraction script on it.
    async fn navigate_and_extract(&self, url: &str, script: &str) -> ScoutResult<String> {
        let page = self.page.lock().await;

        page.goto(url)
            .await
            .map_err(|e| ScoutError::browser(format!("Navigation failed for {}: {}", url, e), "search"))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScoutError::browser(format!("Load failed for {}: {}", url, e), "search"))?;

        let result = page
            .evaluate(script)
            .await
            .map_err(|e| ScoutError::browser(format!("Extraction failed for {}: {}", url, e), "search"))?;

        result.into_value::<String>().map_err(|e| {
            ScoutError::browser(format!("Extraction returned non-text value: {}", e), "search")
        })
    }

    /// Run the search query and return destination URLs from the results page.
    async fn search_links(&self, query: &str) -> ScoutResult<Vec<SerpLink>> {
        let search_url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );
        let json = self.navigate_and_extract(&search_url, SERP_LINKS_JS).await?;
        Ok(parse_serp_links(&json))
    }
}

#[async_trait]
impl SearchProvider for BrowserSearchProvider {
    async fn search(&self, query: &str, limit: usize) -> ScoutResult<Vec<SearchRecord>> {
        info!("Searching web for: {}", query);

        let links = self.search_links(query).await?;
        debug!("Search returned {} candidate links", links.len());

        let mut records = Vec::new();
        for link in links.into_iter().take(limit) {
            let fetch = self.navigate_and_extract(&link.url, PAGE_TEXT_JS);
            match with_timeout(fetch, PAGE_FETCH_TIMEOUT_MS, "page_fetch").await {
                Ok(Ok(text)) => {
                    debug!("Extracted {} chars from {}", text.len(), link.url);
                    records.push(SearchRecord {
                        url: link.url,
                        markdown: text,
                    });
                }
                Ok(Err(e)) => {
                    // A single bad page must not abort the batch.
                    warn!("Skipping {}: {}", link.url, e);
                }
                Err(e) => {
                    warn!("Skipping {} (timed out): {}", link.url, e);
                }
            }
        }

        info!(
            "Search for '{}' produced {} extracted pages",
            query,
            records.len()
        );
        Ok(records)
    }

    async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        self.handler.abort();
        info!("Browser search session closed");
    }
}

/// Parse the JSON emitted by the SERP extraction script, keeping only
/// well-formed absolute http(s) URLs.
fn parse_serp_links(json: &str) -> Vec<SerpLink> {
    serde_json::from_str::<Vec<SerpLink>>(json)
        .unwrap_or_default()
        .into_iter()
        .filter(|link| {
            url::Url::parse(&link.url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false)
        })
        .collect()
}

/// Launches one browser session per job, retrying transient launch failures.
pub struct BrowserSearchFactory;

impl BrowserSearchFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowserSearchFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchSessionFactory for BrowserSearchFactory {
    async fn acquire(&self) -> ScoutResult<Arc<dyn SearchProvider>> {
        let provider = retry_async(
            || BrowserSearchProvider::launch().boxed(),
            RetryConfig::default(),
            "browser_launch",
        )
        .await?;
        Ok(Arc::new(provider))
    }
}
