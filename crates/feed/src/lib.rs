// ABOUTME: Core library for turning an audio profile page into an RSS feed.
// ABOUTME: Provides listing parsing, date and audio resolution, episode assembly, and RSS output.

//! profilecast-feed scrapes a profile page that lists audio episodes and
//! writes an RSS 2.0 podcast feed for it.
//!
//! ```no_run
//! use profilecast_feed::{run, Config, HttpFetcher, RunOutcome};
//!
//! let config = Config::default();
//! let fetcher = HttpFetcher::new(&config)?;
//! match run(&config, &fetcher)? {
//!     RunOutcome::Written { path, episodes, .. } => println!("{} ({episodes})", path.display()),
//!     RunOutcome::Empty { .. } => println!("no episodes"),
//! }
//! # Ok::<(), profilecast_feed::FeedError>(())
//! ```

pub mod assemble;
pub mod audio;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod html_utils;
pub mod listing;
pub mod models;
pub mod pipeline;
pub mod rss;
pub mod time_parse;

pub use assemble::assemble;
pub use audio::{mime_type_for, AudioMiss, AudioResolver};
pub use config::{Config, ConfigBuilder};
pub use dates::{resolve_pub_date, resolve_pub_date_at};
pub use error::{FeedError, Rejection};
pub use fetch::{HttpFetcher, PageFetcher};
pub use listing::ListingParser;
pub use models::{ChannelMeta, Episode, EpisodeStub};
pub use pipeline::{harvest, run, Harvest, RunOutcome};
pub use rss::{render_rss, write_feed};
pub use time_parse::parse_flexible_time;
