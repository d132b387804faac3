//! Batch orchestration: crawl a site, then audit or rewrite each page.
//!
//! Pages flow strictly one way: crawler -> auditor (read-only) or
//! transformer (mutating). Every page gets its own isolated result; nothing
//! is shared between units of work. A page that cannot be fetched is the
//! crawler's problem and is skipped there; nothing here aborts a batch over
//! a single bad page.

use crate::audit::{audit_html, AuditResult};
use crate::remedy::{build_age_friendly_css, transform_html, RemediationConfig};
use agelens_scanner::Crawler;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use url::Url;

/// Options for configuring an audit batch
pub struct AuditOptions {
    pub urls: Vec<String>,
    pub page_limit: usize,
    pub timeout_secs: u64,
    pub show_progress: bool,
}

/// Options for configuring a clone (rewrite) batch
pub struct CloneOptions {
    pub url: String,
    pub page_limit: usize,
    pub timeout_secs: u64,
    pub config: RemediationConfig,
}

/// One rewritten page plus the change log describing what was fixed.
#[derive(Debug, Clone)]
pub struct ClonedPage {
    pub url: String,
    pub html: String,
    pub changes: Vec<String>,
}

/// Callback for reporting batch progress
pub type AuditProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Crawl each seed URL and audit every fetched page.
///
/// A seed that fails outright is reported through the progress callback and
/// skipped; the batch continues with the remaining seeds.
pub async fn execute_audit(
    options: AuditOptions,
    progress_callback: Option<AuditProgressCallback>,
) -> Result<Vec<AuditResult>, String> {
    let AuditOptions {
        urls,
        page_limit,
        timeout_secs,
        show_progress,
    } = options;

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting audit...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let internal_progress_callback: agelens_scanner::ProgressCallback =
        if let Some(ref pb) = progress_bar {
            let pb_clone = pb.clone();
            Arc::new(move |fetched: usize, url: String| {
                pb_clone.set_message(format!("Auditing page {}: {}", fetched + 1, url));
                pb_clone.tick();
            })
        } else {
            Arc::new(|_fetched: usize, _url: String| {})
        };

    let crawler = Crawler::with_timeout(timeout_secs)
        .with_page_limit(page_limit)
        .with_progress_callback(internal_progress_callback);

    let mut all_results = Vec::new();
    for (idx, url_str) in urls.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && urls.len() > 1
        {
            callback(format!(
                "Auditing host {}/{}: {}",
                idx + 1,
                urls.len(),
                url_str
            ));
        }

        match crawler.crawl(url_str).await {
            Ok(pages) => {
                for page in pages {
                    all_results.push(audit_html(&page.url, &page.html));
                }
            }
            Err(e) => {
                if let Some(ref callback) = progress_callback {
                    callback(format!("[!]  Failed to crawl {}: {}", url_str, e));
                }
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Audit complete! {} pages scored", all_results.len()));
    }

    Ok(all_results)
}

/// Crawl up to `page_limit` pages and rewrite each one with the configured
/// age-friendly fixes. The generated stylesheet is built once and shared by
/// every page.
pub async fn execute_clone(options: CloneOptions) -> Result<Vec<ClonedPage>, String> {
    let CloneOptions {
        url,
        page_limit,
        timeout_secs,
        config,
    } = options;

    let css = build_age_friendly_css(&config);

    let crawler = Crawler::with_timeout(timeout_secs).with_page_limit(page_limit);
    let pages = crawler
        .crawl(&url)
        .await
        .map_err(|e| format!("Failed to crawl {}: {}", url, e))?;

    Ok(pages
        .into_iter()
        .map(|page| {
            let (html, changes) = transform_html(&page.html, &page.url, Some(&css));
            ClonedPage {
                url: page.url,
                html,
                changes,
            }
        })
        .collect())
}
