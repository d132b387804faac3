use crate::error::{CrawlError, Result};
use crate::result::FetchedPage;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Called before each fetch with the number of pages collected so far and
/// the URL about to be fetched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Bounded same-domain crawler.
///
/// Pages are fetched strictly one at a time: a page is fetched, parsed for
/// links, and appended to the result list before the next URL is dequeued.
/// The frontier is a FIFO queue; URLs enter the seen-set at enqueue time so
/// a URL can never be queued twice. The result list never grows past the
/// configured page limit, and only URLs whose lowercase host exactly matches
/// the seed's host are followed.
pub struct Crawler {
    client: Client,
    page_limit: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(20)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("AgeLens/0.1 (+age-inclusion-audit)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            page_limit: 5,
            progress_callback: None,
        }
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl same-domain pages breadth-first starting from `start_url`.
    ///
    /// A URL that fails to fetch is skipped with a warning; it never aborts
    /// the crawl. Returns at most `page_limit` pages.
    pub async fn crawl(&self, start_url: &str) -> Result<Vec<FetchedPage>> {
        let parsed = Url::parse(start_url)
            .map_err(|e| CrawlError::InvalidUrl(format!("{start_url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| CrawlError::InvalidUrl(format!("{start_url} has no host")))?
            .to_lowercase();

        // Normalize the seed so discovered self-links match the seen-set.
        let mut seed = parsed.clone();
        seed.set_fragment(None);
        let seed = seed.to_string();

        info!("Starting crawl of {} (page limit {})", seed, self.page_limit);

        let mut frontier: VecDeque<String> = VecDeque::from([seed.clone()]);
        let mut seen: HashSet<String> = HashSet::from([seed]);
        let mut pages: Vec<FetchedPage> = Vec::new();

        while let Some(url) = frontier.pop_front() {
            if pages.len() >= self.page_limit {
                break;
            }

            if let Some(ref callback) = self.progress_callback {
                callback(pages.len(), url.clone());
            }

            let mut page = match self.fetch_page(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    continue;
                }
            };

            if is_html(&page) {
                let links = extract_links(&page.html, &url, &host);
                for link in &links {
                    if !seen.contains(link) {
                        seen.insert(link.clone());
                        frontier.push_back(link.clone());
                    }
                }
                page.links_found = links;
            }

            pages.push(page);
        }

        info!("Crawl complete. Fetched {} pages", pages.len());
        Ok(pages)
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let content_length = response.content_length();

        let html = response.text().await?;
        let response_time = start.elapsed();

        Ok(FetchedPage {
            url: url.to_string(),
            status_code,
            content_type,
            content_length,
            response_time,
            html,
            links_found: Vec::new(),
        })
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

fn is_html(page: &FetchedPage) -> bool {
    page.content_type
        .as_deref()
        .map(|ct| ct.contains("text/html"))
        .unwrap_or(true)
}

fn extract_links(html: &str, current_url: &str, host: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute_url) = resolve_url(current_url, href)
            && is_same_host(&absolute_url, host)
        {
            debug!("Found same-domain link: {}", absolute_url);
            links.push(absolute_url);
        }
    }

    links
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    // Skip empty, fragment-only, and non-navigational schemes.
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}

fn is_same_host(url: &str, host: &str) -> bool {
    // Exact lowercase host equality: no subdomain folding, no scheme check.
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase() == host))
        .unwrap_or(false)
}
