// ABOUTME: Episode assembly: the single gate deciding whether a stub becomes a feed entry.
// ABOUTME: Combines a stub with its resolved date and audio outcome into an Episode or a Rejection.

use chrono::{DateTime, Utc};

use crate::audio::AudioMiss;
use crate::error::Rejection;
use crate::models::{Episode, EpisodeStub};

/// Builds the Episode for `stub`, or explains why it is dropped.
pub fn assemble(
    stub: EpisodeStub,
    pub_date: DateTime<Utc>,
    audio: Result<String, AudioMiss>,
) -> Result<Episode, Rejection> {
    let EpisodeStub {
        title, episode_url, ..
    } = stub;

    let audio_url = match audio {
        Ok(url) => url,
        Err(AudioMiss::Fetch(message)) => {
            return Err(Rejection::FetchFailed {
                title,
                url: episode_url,
                message,
            })
        }
        Err(AudioMiss::NotFound) => {
            return Err(Rejection::AudioNotFound {
                title,
                url: episode_url,
            })
        }
        Err(AudioMiss::DisallowedExtension(candidate)) => {
            return Err(Rejection::DisallowedExtension {
                title,
                url: episode_url,
                candidate,
            })
        }
    };

    Ok(Episode {
        description: format!("Episode: {title}"),
        title,
        episode_url,
        audio_url,
        pub_date,
    })
}
