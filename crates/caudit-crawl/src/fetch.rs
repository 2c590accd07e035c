//! HTTP access behind a small trait so parsers can be driven by fixtures.

use std::time::Duration;

use caudit_config::SiteSettings;
use reqwest::{
    blocking::Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use tracing::debug;

use crate::CrawlError;

/// `Accept` header sent with every request.
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// `Accept-Language` header sent with every request.
const ACCEPT_RU: &str = "ru-RU,ru;q=0.9,en;q=0.8";

/// Retrieves a document body by URL.
pub trait Fetcher {
    /// Fetches `url` and returns its body decoded as UTF-8.
    fn fetch(&self, url: &str) -> Result<String, CrawlError>;
}

/// Blocking HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Shared client with headers and timeout applied.
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured user agent and timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_RU));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(CrawlError::Client)?;
        Ok(Self { client })
    }

    /// Builds a fetcher from `[site]` settings.
    pub fn from_settings(site: &SiteSettings) -> Result<Self, CrawlError> {
        Self::new(&site.user_agent, Duration::from_secs(site.timeout_secs))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let request_error = |source| CrawlError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Shops often mislabel the charset; the body is always decoded as UTF-8.
        let bytes = response.bytes().map_err(request_error)?;
        debug!(url, bytes = bytes.len(), "fetched");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
