//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the harvester, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Sharing the logged-in session's cookies with workers, read-only
//! - GET and form POST requests that follow redirects
//! - Error classification

use crate::config::SiteConfig;
use crate::crawler::parser::ExtractError;
use crate::HarvestError;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::{redirect::Policy, Client, Response};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Upper bound on connection establishment, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops followed before a request is abandoned
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

impl FetchedPage {
    /// Parses the body and runs `extract` on the document
    ///
    /// The parsed document never outlives this call, so callers can hold the
    /// result across an `.await`.
    pub fn extract<T>(
        &self,
        extract: impl FnOnce(&Html, &Url) -> Result<T, ExtractError>,
    ) -> Result<T, HarvestError> {
        let document = Html::parse_document(&self.body);
        extract(&document, &self.final_url).map_err(|source| HarvestError::Extract {
            url: self.final_url.to_string(),
            source,
        })
    }
}

/// Read-only view of a session cookie jar
///
/// Requests carry whatever cookies the jar holds for their URL, but cookies
/// set by responses are discarded. Workers share one of these so they can
/// never alter the logged-in session.
#[derive(Clone)]
pub struct SessionCookies {
    jar: Arc<Jar>,
}

impl SessionCookies {
    pub fn new(jar: Arc<Jar>) -> Self {
        Self { jar }
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, _cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {}

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

/// Builds an HTTP client with the configured identity and timeouts
///
/// # Arguments
///
/// * `config` - The site configuration
/// * `cookies` - Cookie store consulted (and possibly updated) on every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client<C>(config: &SiteConfig, cookies: Arc<C>) -> Result<Client, reqwest::Error>
where
    C: CookieStore + 'static,
{
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .cookie_provider(cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues single-attempt requests against the site
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base_url: Url,
}

impl Fetcher {
    /// Wraps a client; relative paths are resolved against `base_url`
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// The site root
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a site-relative path or absolute URL
    pub fn resolve(&self, path: &str) -> Result<Url, HarvestError> {
        Ok(self.base_url.join(path)?)
    }

    /// Fetches a page, requiring a successful status
    pub async fn get(&self, url: &Url) -> Result<FetchedPage, HarvestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        read_page(url, response, true).await
    }

    /// Submits a url-encoded form and returns the final page after redirects
    ///
    /// The status is returned as-is so the caller can judge the outcome.
    pub async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
    ) -> Result<FetchedPage, HarvestError> {
        let response = self
            .client
            .post(url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        read_page(url, response, false).await
    }
}

async fn read_page(
    url: &Url,
    response: Response,
    require_success: bool,
) -> Result<FetchedPage, HarvestError> {
    let status = response.status();
    let final_url = response.url().clone();

    if require_success && !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(url: &Url, error: reqwest::Error) -> HarvestError {
    if error.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else {
        HarvestError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
