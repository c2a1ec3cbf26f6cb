//! Remote page-count lookup
//!
//! Fetches the page count recorded for a book's edition on a remote
//! metadata site. This is best-effort enrichment: every failure mode, from
//! a 404 through a malformed page, degrades to "no page count available"
//! and is never surfaced as an error to the orchestrator.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use thiserror::Error;

/// Marker in the response body of a soft not-found page.
const NOT_FOUND_MARKER: &str = "<title>404 - ";

/// Remote lookup error types. Only client construction can fail; lookups
/// themselves always degrade to absence.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Remote lookup options
#[derive(Debug, Clone)]
pub struct RemoteLookupOptions {
    /// Base URL of the metadata site.
    pub base_url: String,
    /// Timeout for the details request.
    pub timeout: Duration,
}

impl Default for RemoteLookupOptions {
    fn default() -> Self {
        Self {
            base_url: "https://www.goodreads.com".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Client for fetching page counts from a remote metadata site.
pub struct RemoteLookupClient {
    options: RemoteLookupOptions,
    client: Client,
}

impl RemoteLookupClient {
    /// Build a client with the given options.
    pub fn new(options: RemoteLookupOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { options, client })
    }

    /// Fetch the page count of the edition identified by `remote_id`.
    ///
    /// Returns `None` on any failure: 404 or soft not-found page, socket
    /// timeout, transport error, unparsable page, or a missing page-count
    /// field.
    pub fn fetch_page_count(&self, remote_id: &str) -> Option<u32> {
        let url = format!(
            "{}/book/show/{}",
            self.options.base_url.trim_end_matches('/'),
            remote_id
        );
        debug!("remote book url: {url}");

        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("remote lookup timed out, try again later: {url}");
                return None;
            }
            Err(e) => {
                warn!("failed to make details query {url}: {e}");
                return None;
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            debug!("no remote record found: {url}");
            return None;
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                warn!("failed to read details response {url}: {e}");
                return None;
            }
        };

        parse_lookup_response(&body)
    }
}

/// Interpret a details-page body, degrading every failure to `None`.
pub fn parse_lookup_response(body: &str) -> Option<u32> {
    if body.contains(NOT_FOUND_MARKER) {
        debug!("details page is a soft 404");
        return None;
    }

    let document = Html::parse_document(body);

    let error_selector = Selector::parse("#errorMessage").ok()?;
    if document.select(&error_selector).next().is_some() {
        warn!("details page reported an error message");
        return None;
    }

    parse_page_count(&document)
}

/// Extract the labeled page-count field from a parsed details page.
///
/// The field renders as `<span itemprop="numberOfPages">412 pages</span>`;
/// the leading integer token before the first space is the count.
fn parse_page_count(document: &Html) -> Option<u32> {
    let selector = Selector::parse(r#"span[itemprop="numberOfPages"]"#).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let leading = text.trim().split(' ').next()?;
    match leading.parse::<u32>() {
        Ok(pages) => Some(pages),
        Err(_) => {
            warn!("unparsable page count text: {text:?}");
            None
        }
    }
}
