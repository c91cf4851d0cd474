// ABOUTME: The pipeline entry point: profile page in, RSS file out.
// ABOUTME: Fetches the listing, resolves each stub in order, assembles episodes, and writes the feed.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::assemble::assemble;
use crate::audio::AudioResolver;
use crate::config::Config;
use crate::dates::resolve_pub_date;
use crate::error::{FeedError, Rejection};
use crate::fetch::PageFetcher;
use crate::listing::ListingParser;
use crate::models::Episode;
use crate::rss::{render_rss, write_feed};

/// Episodes that made it, plus why the others did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Harvest {
    pub episodes: Vec<Episode>,
    pub rejections: Vec<Rejection>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The feed was written with `episodes` items.
    Written {
        path: PathBuf,
        episodes: usize,
        rejected: usize,
    },
    /// Nothing resolved; no file was written.
    Empty { rejected: usize },
}

/// Fetches and resolves every episode on the profile page, in listing order.
///
/// Never fails because of the network or page content: a lost profile page
/// or unparsable listing yields an empty harvest. Only a bad config is an error.
pub fn harvest(config: &Config, fetcher: &dyn PageFetcher) -> Result<Harvest, FeedError> {
    config.validate()?;
    let parser = ListingParser::from_config(config)?;
    let audio = AudioResolver::from_config(config)?;

    info!(url = %config.profile_url, "fetching profile page");
    let listing = match fetcher.fetch_text(&config.profile_url) {
        Ok(body) => body,
        Err(err) => {
            error!(error = %err, "profile page unavailable");
            return Ok(Harvest::default());
        }
    };

    let stubs = match parser.parse(&listing, &config.profile_url) {
        Ok(stubs) => stubs,
        Err(err) => {
            error!(error = %err, "profile page could not be parsed");
            return Ok(Harvest::default());
        }
    };
    info!(count = stubs.len(), "found episode stubs");

    let mut harvest = Harvest::default();
    for stub in stubs {
        let pub_date = resolve_pub_date(stub.raw_date_fragment.as_deref(), &stub.title);
        let outcome = audio.resolve(fetcher, &stub.title, &stub.episode_url);
        match assemble(stub, pub_date, outcome) {
            Ok(episode) => harvest.episodes.push(episode),
            Err(rejection) => {
                warn!(%rejection, "episode skipped");
                harvest.rejections.push(rejection);
            }
        }
    }

    info!(
        episodes = harvest.episodes.len(),
        rejected = harvest.rejections.len(),
        "harvest complete"
    );
    Ok(harvest)
}

/// Runs the whole conversion once and writes the feed if anything resolved.
pub fn run(config: &Config, fetcher: &dyn PageFetcher) -> Result<RunOutcome, FeedError> {
    let harvest = harvest(config, fetcher)?;
    let rejected = harvest.rejections.len();

    if harvest.episodes.is_empty() {
        warn!(path = %config.output_path.display(), "no episodes found, feed not written");
        return Ok(RunOutcome::Empty { rejected });
    }

    let document = render_rss(&config.channel, &harvest.episodes, Utc::now())?;
    write_feed(&config.output_path, &document)?;

    Ok(RunOutcome::Written {
        path: config.output_path.clone(),
        episodes: harvest.episodes.len(),
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned pages; any other URL is a transport failure.
    #[derive(Default)]
    struct CannedPages {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl CannedPages {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl PageFetcher for CannedPages {
        fn fetch_text(&self, url: &str) -> Result<String, FeedError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FeedError::fetch(url, "status 404"))
        }
    }

    const PROFILE: &str = "https://soundgasm.net/u/ClassWarAndPuppies";

    fn config(dir: &tempfile::TempDir) -> Config {
        Config::builder()
            .output_path(dir.path().join("feed.xml"))
            .build()
            .unwrap()
    }

    #[test]
    fn harvest_keeps_listing_order_and_skips_misses() {
        let listing = r#"
            <div class="sound-details"><a href="/u/ClassWarAndPuppies/one">One</a><time>April 15, 2024</time></div>
            <div class="sound-details"><a href="/u/ClassWarAndPuppies/two">Two</a></div>
            <div class="sound-details"><a href="/u/ClassWarAndPuppies/three">[2023.11.02] Three</a></div>"#;
        let pages = CannedPages::default()
            .with(PROFILE, listing)
            .with(
                "https://soundgasm.net/u/ClassWarAndPuppies/one",
                r#"<audio src="https://media.soundgasm.net/sounds/one.m4a"></audio>"#,
            )
            .with("https://soundgasm.net/u/ClassWarAndPuppies/two", "<p>removed</p>")
            .with(
                "https://soundgasm.net/u/ClassWarAndPuppies/three",
                r#"<script>m4a: "https://media.soundgasm.net/sounds/three.m4a"</script>"#,
            );
        let dir = tempfile::tempdir().unwrap();

        let harvest = harvest(&config(&dir), &pages).unwrap();
        let titles: Vec<&str> = harvest.episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "[2023.11.02] Three"]);
        assert_eq!(harvest.rejections.len(), 1);
        assert_eq!(harvest.rejections[0].title(), "Two");
        assert_eq!(pages.requested.borrow().len(), 4);
    }

    #[test]
    fn lost_profile_page_is_empty_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let outcome = run(&config, &CannedPages::default()).unwrap();
        assert_eq!(outcome, RunOutcome::Empty { rejected: 0 });
        assert!(!config.output_path.exists());
    }

    #[test]
    fn empty_listing_is_empty_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let pages = CannedPages::default().with(PROFILE, "   ");
        assert_eq!(run(&config, &pages).unwrap(), RunOutcome::Empty { rejected: 0 });
    }

    #[test]
    fn invalid_config_is_error() {
        let mut config = Config::default();
        config.profile_url = "::".into();
        assert!(matches!(
            run(&config, &CannedPages::default()),
            Err(FeedError::Config(_))
        ));
    }
}
