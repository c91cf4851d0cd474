// ABOUTME: Error types for the profile-to-feed pipeline.
// ABOUTME: FeedError covers run-level failures; Rejection explains why one episode was dropped.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while building a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The HTTP transport failed or returned a non-2xx status.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The listing document could not be parsed at all.
    #[error("failed to parse listing: {0}")]
    Parse(String),

    /// The configuration is unusable (bad URL, selector, or extension set).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Rendering or writing the feed document failed.
    #[error("failed to write feed: {0}")]
    Write(String),
}

impl FeedError {
    /// Creates a Fetch error from an underlying transport error.
    pub fn fetch(url: impl Into<String>, err: impl fmt::Display) -> Self {
        FeedError::Fetch {
            url: url.into(),
            message: err.to_string(),
        }
    }

    /// Creates a Parse error with a custom message.
    pub fn parse(msg: impl Into<String>) -> Self {
        FeedError::Parse(msg.into())
    }

    /// Creates a Config error with a custom message.
    pub fn config(msg: impl Into<String>) -> Self {
        FeedError::Config(msg.into())
    }

    /// Creates a Write error from an io or xml error.
    pub fn write(err: impl fmt::Display) -> Self {
        FeedError::Write(err.to_string())
    }

    /// Returns true if this is a transport failure.
    pub fn is_fetch(&self) -> bool {
        matches!(self, FeedError::Fetch { .. })
    }
}

/// Why a single episode was left out of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The episode page could not be fetched.
    #[error("episode {title:?}: fetching {url} failed: {message}")]
    FetchFailed {
        title: String,
        url: String,
        message: String,
    },

    /// No tier produced an audio URL.
    #[error("episode {title:?}: no audio source found on {url}")]
    AudioNotFound { title: String, url: String },

    /// An audio source was declared but its extension is not allowed.
    #[error("episode {title:?}: audio source {candidate} on {url} has a disallowed extension")]
    DisallowedExtension {
        title: String,
        url: String,
        candidate: String,
    },
}

impl Rejection {
    /// Title of the rejected episode.
    pub fn title(&self) -> &str {
        match self {
            Rejection::FetchFailed { title, .. }
            | Rejection::AudioNotFound { title, .. }
            | Rejection::DisallowedExtension { title, .. } => title,
        }
    }

    /// Episode page URL that was attempted.
    pub fn url(&self) -> &str {
        match self {
            Rejection::FetchFailed { url, .. }
            | Rejection::AudioNotFound { url, .. }
            | Rejection::DisallowedExtension { url, .. } => url,
        }
    }
}
