// ABOUTME: Listing parser that turns a profile page into ordered episode stubs.
// ABOUTME: Each episode block yields a title/link from its first anchor and an optional raw date.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::FeedError;
use crate::html_utils::{collapse_whitespace, element_text, truncate_chars};
use crate::models::EpisodeStub;

/// Extracts the base origin (scheme + host + optional port) from a URL.
pub fn base_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{}:{}", parsed.scheme(), host, port)),
        None => Some(format!("{}://{}", parsed.scheme(), host)),
    }
}

/// Resolves an href against the profile's origin. Absolute hrefs pass through.
pub fn resolve_href(href: &str, origin: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let resolved = origin.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Compiled selectors for one listing layout.
#[derive(Debug, Clone)]
pub struct ListingParser {
    block: Selector,
    anchor: Selector,
    date: Selector,
}

impl ListingParser {
    pub fn new(episode_selector: &str, date_selector: &str) -> Result<Self, FeedError> {
        let parse = |sel: &str| {
            Selector::parse(sel).map_err(|e| FeedError::config(format!("selector {sel:?}: {e}")))
        };
        Ok(Self {
            block: parse(episode_selector)?,
            anchor: parse("a[href]")?,
            date: parse(date_selector)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        Self::new(&config.episode_selector, &config.date_selector)
    }

    /// Parses the profile page into stubs, in page order.
    ///
    /// Blocks without a usable anchor are skipped. Only an empty document
    /// is an error.
    pub fn parse(&self, html: &str, profile_url: &str) -> Result<Vec<EpisodeStub>, FeedError> {
        if html.trim().is_empty() {
            return Err(FeedError::parse("listing document is empty"));
        }
        let origin = base_origin(profile_url)
            .and_then(|o| Url::parse(&o).ok())
            .ok_or_else(|| FeedError::config(format!("profile url {profile_url:?} has no origin")))?;

        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        for (idx, block) in document.select(&self.block).enumerate() {
            match self.parse_block(&block, &origin) {
                Some(stub) => stubs.push(stub),
                None => warn!(
                    block = idx + 1,
                    excerpt = %truncate_chars(&element_text(&block), 80),
                    "skipping episode block without a usable link"
                ),
            }
        }
        debug!(count = stubs.len(), "parsed listing");
        Ok(stubs)
    }

    fn parse_block(&self, block: &ElementRef<'_>, origin: &Url) -> Option<EpisodeStub> {
        let anchor = block.select(&self.anchor).next()?;
        let title = element_text(&anchor);
        if title.is_empty() {
            return None;
        }
        let episode_url = resolve_href(anchor.value().attr("href")?, origin)?;

        let raw_date_fragment = block.select(&self.date).next().and_then(|el| {
            let text = element_text(&el);
            if !text.is_empty() {
                return Some(text);
            }
            el.value()
                .attr("datetime")
                .map(collapse_whitespace)
                .filter(|s| !s.is_empty())
        });

        Some(EpisodeStub {
            title,
            episode_url,
            raw_date_fragment,
        })
    }
}
