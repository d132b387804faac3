use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One successfully fetched page, ready for auditing or remediation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub response_time: Duration,
    pub html: String,
    pub links_found: Vec<String>,
}

impl FetchedPage {
    pub fn new(url: String, status_code: u16, html: String) -> Self {
        Self {
            url,
            status_code,
            content_type: None,
            content_length: None,
            response_time: Duration::from_secs(0),
            html,
            links_found: Vec::new(),
        }
    }
}
