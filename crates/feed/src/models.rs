// ABOUTME: Data models for scraped episodes and the feed channel.
// ABOUTME: EpisodeStub is the unvalidated listing row; Episode is the finished feed entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An episode candidate pulled from the listing page, before date and audio resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStub {
    pub title: String,
    pub episode_url: String,
    pub raw_date_fragment: Option<String>,
}

/// A fully resolved episode, ready to be rendered as a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub episode_url: String,
    pub audio_url: String,
    pub pub_date: DateTime<Utc>,
    pub description: String,
}

/// Static channel-level metadata for the generated feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
}
