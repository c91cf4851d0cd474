// ABOUTME: Page fetching for the listing and episode pages over blocking HTTP.
// ABOUTME: Sends a browser-like User-Agent, rejects non-2xx responses, and decodes bodies by charset.

use tracing::debug;

use crate::config::Config;
use crate::error::FeedError;

/// Maximum accepted page size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Source of page markup. The pipeline only talks to the network through this.
pub trait PageFetcher {
    /// GET `url` and return the decoded body text.
    fn fetch_text(&self, url: &str) -> Result<String, FeedError>;
}

/// PageFetcher backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a client carrying the configured User-Agent and timeout.
    pub fn new(config: &Config) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::config(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FeedError> {
        let parsed = url::Url::parse(url).map_err(|e| FeedError::fetch(url, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FeedError::fetch(url, "scheme must be http or https"));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FeedError::fetch(url, e))?;

        if let Some(len) = response.content_length() {
            if exceeds_limit(len) {
                return Err(FeedError::fetch(url, "content too large"));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response
            .bytes()
            .map_err(|e| FeedError::fetch(url, format!("failed to read body: {e}")))?;
        if body.len() > MAX_CONTENT_LENGTH {
            return Err(FeedError::fetch(url, "content too large"));
        }

        debug!(url, bytes = body.len(), "fetched page");
        Ok(decode_body(&body, content_type.as_deref()))
    }
}

/// True if a declared content length is over the cap, including lengths past `usize`.
fn exceeds_limit(len: u64) -> bool {
    usize::try_from(len).map_or(true, |len| len > MAX_CONTENT_LENGTH)
}

/// Decode body bytes using the charset from the content-type header, or by detection.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            return Some(charset.trim_matches('"').trim_matches('\'').to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&Config::default()).unwrap()
    }

    #[test]
    fn charset_from_content_type() {
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn declared_length_limit() {
        assert!(!exceeds_limit(0));
        assert!(!exceeds_limit(MAX_CONTENT_LENGTH as u64));
        assert!(exceeds_limit(MAX_CONTENT_LENGTH as u64 + 1));
        assert!(exceeds_limit(u64::MAX));
    }

    #[test]
    fn decodes_latin1_body() {
        let body = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode_body(&body, Some("text/html; charset=iso-8859-1")), "café");
    }

    #[test]
    fn sends_browser_user_agent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/u/someone")
                .header("user-agent", crate::config::DEFAULT_USER_AGENT);
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body>ok</body></html>");
        });

        let text = fetcher().fetch_text(&server.url("/u/someone")).unwrap();
        mock.assert();
        assert!(text.contains("ok"));
    }

    #[test]
    fn non_success_status_is_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let err = fetcher().fetch_text(&server.url("/missing")).unwrap_err();
        assert!(err.is_fetch());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = fetcher().fetch_text("file:///etc/passwd").unwrap_err();
        assert!(err.is_fetch());
    }
}
