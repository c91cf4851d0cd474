// ABOUTME: Audio resolution for episode pages with ordered fallback tiers.
// ABOUTME: Tries <audio src>, then nested <source src>, then a raw-text URL scan; validates extensions.

use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::FeedError;
use crate::fetch::PageFetcher;
use crate::html_utils::{excerpt, EXCERPT_CHARS};

static AUDIO_SRC: Lazy<Selector> = Lazy::new(|| Selector::parse("audio[src]").unwrap());
static NESTED_SOURCE_SRC: Lazy<Selector> =
    Lazy::new(|| Selector::parse("audio source[src]").unwrap());

/// Anything URL-shaped in raw page text, including inline script.
static URL_IN_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s"'<>\\`]+"#).unwrap());

/// Why no audio URL came out of an episode page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMiss {
    /// The episode page itself could not be fetched.
    Fetch(String),
    /// No tier found a candidate.
    NotFound,
    /// A declared source exists but fails extension validation.
    DisallowedExtension(String),
}

/// One fetched episode page, as every tier sees it.
pub struct EpisodePage<'a> {
    pub url: &'a str,
    pub raw: &'a str,
    pub document: Html,
}

impl<'a> EpisodePage<'a> {
    pub fn parse(url: &'a str, raw: &'a str) -> Self {
        Self {
            url,
            raw,
            document: Html::parse_document(raw),
        }
    }
}

type AudioTier = fn(&AudioResolver, &EpisodePage<'_>) -> Option<String>;

/// Tiers in priority order.
const AUDIO_TIERS: &[(&str, AudioTier)] = &[
    ("audio element", AudioResolver::from_audio_element),
    ("nested source element", AudioResolver::from_nested_source),
    ("page text scan", AudioResolver::from_text_scan),
];

/// Finds and validates the playable audio URL of an episode page.
#[derive(Debug, Clone)]
pub struct AudioResolver {
    extensions: Vec<String>,
}

impl AudioResolver {
    pub fn new<I, S>(extensions: I) -> Result<Self, FeedError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(FeedError::config("allowed extension set is empty"));
        }
        Ok(Self { extensions })
    }

    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        Self::new(&config.allowed_extensions)
    }

    /// Fetches the episode page and resolves its audio URL.
    pub fn resolve(
        &self,
        fetcher: &dyn PageFetcher,
        title: &str,
        episode_url: &str,
    ) -> Result<String, AudioMiss> {
        let raw = match fetcher.fetch_text(episode_url) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(title, url = episode_url, error = %err, "episode page fetch failed");
                return Err(AudioMiss::Fetch(err.to_string()));
            }
        };

        let outcome = self.resolve_html(episode_url, &raw);
        if let Err(ref miss) = outcome {
            warn!(
                title,
                url = episode_url,
                miss = ?miss,
                page = %excerpt(&raw, EXCERPT_CHARS),
                "no usable audio source on episode page"
            );
        }
        outcome
    }

    /// Runs the tiers over already fetched markup.
    pub fn resolve_html(&self, episode_url: &str, raw: &str) -> Result<String, AudioMiss> {
        let page = EpisodePage::parse(episode_url, raw);
        let mut rejected: Option<String> = None;

        for (name, tier) in AUDIO_TIERS {
            let Some(candidate) = tier(self, &page) else {
                continue;
            };
            if self.is_allowed(&candidate) {
                debug!(url = episode_url, tier = name, audio = %candidate, "resolved audio url");
                return Ok(candidate);
            }
            debug!(url = episode_url, tier = name, audio = %candidate, "rejected audio candidate");
            rejected.get_or_insert(candidate);
        }

        match rejected {
            Some(candidate) => Err(AudioMiss::DisallowedExtension(candidate)),
            None => Err(AudioMiss::NotFound),
        }
    }

    /// True if `url` is an absolute http(s) URL whose path ends in an allowed extension.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }
        let last_segment = parsed.path().rsplit('/').next().unwrap_or("");
        match last_segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            }
            _ => false,
        }
    }

    /// Tier 1: `<audio src>`.
    fn from_audio_element(&self, page: &EpisodePage<'_>) -> Option<String> {
        first_src(page, &AUDIO_SRC)
    }

    /// Tier 2: `<audio><source src></audio>`.
    fn from_nested_source(&self, page: &EpisodePage<'_>) -> Option<String> {
        first_src(page, &NESTED_SOURCE_SRC)
    }

    /// Tier 3: the first URL in the raw page text with an allowed extension.
    /// Matches come straight from markup, so entity references are decoded.
    fn from_text_scan(&self, page: &EpisodePage<'_>) -> Option<String> {
        URL_IN_TEXT_RE
            .find_iter(page.raw)
            .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', ')', ']', '}']))
            .map(unescape_entities)
            .find(|candidate| self.is_allowed(candidate))
    }
}

/// Decodes XML entity and character references; unknown entities leave the text as is.
fn unescape_entities(raw: &str) -> String {
    match unescape(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// First non-empty `src` matched by `selector`, resolved against the page URL.
fn first_src(page: &EpisodePage<'_>, selector: &Selector) -> Option<String> {
    page.document
        .select(selector)
        .filter_map(|el| el.value().attr("src"))
        .find_map(|src| resolve_src(src, page.url))
}

/// Resolves a possibly relative `src` against the page URL.
pub fn resolve_src(src: &str, page_url: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }
    let base = Url::parse(page_url).ok()?;
    Some(base.join(src).ok()?.to_string())
}

/// Enclosure MIME type for an audio URL, by extension.
pub fn mime_type_for(audio_url: &str) -> String {
    let path = Url::parse(audio_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| audio_url.to_string());
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg".to_string(),
        "m4a" => "audio/mp4".to_string(),
        other => format!("audio/x-{other}"),
    }
}
