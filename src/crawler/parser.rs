//! HTML extraction for listing, detail, and contact pages
//!
//! This module turns parsed documents into the values the harvester needs:
//! - Listing count metadata (items per page and total items)
//! - Item detail links from a listing page
//! - The registration-gated outbound link on a detail page
//! - `mailto:` addresses on the final contact page

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Listing count element, e.g. `<p class="franchise-category__list-count">`
const LIST_COUNT_SELECTOR: &str = "p.franchise-category__list-count";

/// Item anchors on a listing page
const ITEM_LINK_SELECTOR: &str = "a.fr-item__link-name";

/// Registration-gated outbound anchor on a detail page
const SECONDARY_LINK_SELECTOR: &str = "a.website.linkForReg.need-auth";

/// Contact anchors on the final page
const MAILTO_SELECTOR: &str = r#"a[href^="mailto:"]"#;

/// Separator between the shown and total counts in the listing text
const COUNT_SEPARATOR: &str = " из ";

/// Errors raised while extracting values from a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid selector '{0}'")]
    Selector(&'static str),

    #[error("no element matches '{0}'")]
    MissingElement(&'static str),

    #[error("element '{0}' has no href")]
    MissingHref(&'static str),

    #[error("unparseable listing count '{0}'")]
    MalformedCount(String),

    #[error("listing reports zero items per page")]
    ZeroItemsPerPage,

    #[error("cannot resolve link '{href}': {reason}")]
    InvalidLink { href: String, reason: String },
}

/// Page count information reported by a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    /// Items shown on one listing page, always greater than zero
    pub items_per_page: u32,

    /// Items available under the topic
    pub total_items: u32,
}

impl PageMetadata {
    /// Builds metadata, rejecting a zero page size
    pub fn new(items_per_page: u32, total_items: u32) -> Result<Self, ExtractError> {
        if items_per_page == 0 {
            return Err(ExtractError::ZeroItemsPerPage);
        }
        Ok(Self {
            items_per_page,
            total_items,
        })
    }

    /// Number of listing pages to visit, `floor(total_items / items_per_page)`
    pub fn total_pages(&self) -> u32 {
        self.total_items / self.items_per_page
    }
}

/// Capabilities the harvester needs from a parsed document
///
/// Implementations must be pure functions of the document so they can be
/// shared by every worker.
pub trait Extractor: Send + Sync + 'static {
    /// Reads the per-page and total item counts from a listing page
    fn page_metadata(&self, document: &Html) -> Result<PageMetadata, ExtractError>;

    /// Returns every item detail URL on a listing page, resolved against `base`
    fn item_links(&self, document: &Html, base: &Url) -> Vec<String>;

    /// Returns the gated outbound link on a detail page, resolved against `base`
    fn secondary_link(&self, document: &Html, base: &Url) -> Result<Url, ExtractError>;

    /// Returns the addresses of every `mailto:` anchor on a page
    fn emails(&self, document: &Html) -> Vec<String>;
}

/// Extractor for the franchise directory's markup
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteExtractor;

impl Extractor for SiteExtractor {
    fn page_metadata(&self, document: &Html) -> Result<PageMetadata, ExtractError> {
        let selector = selector(LIST_COUNT_SELECTOR)?;
        let element = document
            .select(&selector)
            .next()
            .ok_or(ExtractError::MissingElement(LIST_COUNT_SELECTOR))?;

        parse_count_text(&element.text().collect::<String>())
    }

    fn item_links(&self, document: &Html, base: &Url) -> Vec<String> {
        let Ok(selector) = selector(ITEM_LINK_SELECTOR) else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| match resolve_link(href, base) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    tracing::debug!("Skipping item link: {}", e);
                    None
                }
            })
            .collect()
    }

    fn secondary_link(&self, document: &Html, base: &Url) -> Result<Url, ExtractError> {
        let selector = selector(SECONDARY_LINK_SELECTOR)?;
        let element = document
            .select(&selector)
            .next()
            .ok_or(ExtractError::MissingElement(SECONDARY_LINK_SELECTOR))?;
        let href = element
            .value()
            .attr("href")
            .ok_or(ExtractError::MissingHref(SECONDARY_LINK_SELECTOR))?;

        resolve_link(href, base)
    }

    fn emails(&self, document: &Html) -> Vec<String> {
        let Ok(selector) = selector(MAILTO_SELECTOR) else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| href.strip_prefix("mailto:"))
            .filter(|email| !email.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parses listing count text such as `Показано франшиз: 10 из 1652`
///
/// Any label before the last `:` is ignored and whitespace inside the
/// numbers (thousands separators) is dropped.
pub fn parse_count_text(text: &str) -> Result<PageMetadata, ExtractError> {
    let malformed = || ExtractError::MalformedCount(text.trim().to_string());

    let counts = text.rsplit(':').next().unwrap_or(text);
    let (per_page, total) = counts.split_once(COUNT_SEPARATOR).ok_or_else(malformed)?;

    let per_page = parse_count(per_page).ok_or_else(malformed)?;
    let total = parse_count(total).ok_or_else(malformed)?;

    PageMetadata::new(per_page, total)
}

fn parse_count(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().ok()
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css))
}

/// Resolves an href to an absolute http(s) URL
fn resolve_link(href: &str, base: &Url) -> Result<Url, ExtractError> {
    let href = href.trim();
    let invalid = |reason: &str| ExtractError::InvalidLink {
        href: href.to_string(),
        reason: reason.to_string(),
    };

    if href.is_empty() {
        return Err(invalid("empty href"));
    }

    let url = base.join(href).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("not an http(s) link"));
    }

    Ok(url)
}
