// ABOUTME: Run configuration for the pipeline: target profile, output path, transport and channel settings.
// ABOUTME: ConfigBuilder provides a fluent API; Config::default() targets the original profile.

use std::path::PathBuf;
use std::time::Duration;

use scraper::Selector;
use url::Url;

use crate::error::FeedError;
use crate::models::ChannelMeta;

pub const DEFAULT_PROFILE_URL: &str = "https://soundgasm.net/u/ClassWarAndPuppies";
pub const DEFAULT_OUTPUT_PATH: &str = "blackwolffeed.xml";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "ogg", "aac"];
pub const DEFAULT_EPISODE_SELECTOR: &str = "div.sound-details";
pub const DEFAULT_DATE_SELECTOR: &str = "time";

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile_url: String,
    pub output_path: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
    pub allowed_extensions: Vec<String>,
    pub episode_selector: String,
    pub date_selector: String,
    pub channel: ChannelMeta,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            episode_selector: DEFAULT_EPISODE_SELECTOR.to_string(),
            date_selector: DEFAULT_DATE_SELECTOR.to_string(),
            channel: ChannelMeta {
                title: "Class War and Puppies".to_string(),
                link: DEFAULT_PROFILE_URL.to_string(),
                description: "A podcast about class warfare and puppies.".to_string(),
                language: "en-us".to_string(),
            },
        }
    }
}

impl Config {
    /// Start a builder from the default configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks that the profile URL, selectors, and extension set are usable.
    pub fn validate(&self) -> Result<(), FeedError> {
        let url = Url::parse(&self.profile_url)
            .map_err(|e| FeedError::config(format!("profile url {:?}: {e}", self.profile_url)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FeedError::config(format!(
                "profile url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(FeedError::config("timeout must be greater than zero"));
        }
        if self.allowed_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(FeedError::config("allowed extension set is empty"));
        }
        for sel in [&self.episode_selector, &self.date_selector] {
            Selector::parse(sel)
                .map_err(|e| FeedError::config(format!("selector {sel:?}: {e}")))?;
        }
        Ok(())
    }
}

/// Builder for constructing a Config with custom settings.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with default settings.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the profile page URL. The channel link follows it.
    pub fn profile_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.channel.link = url.clone();
        self.config.profile_url = url;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Set the User-Agent header sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the set of accepted audio file extensions.
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn episode_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.episode_selector = selector.into();
        self
    }

    pub fn date_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.date_selector = selector.into();
        self
    }

    pub fn channel_title(mut self, title: impl Into<String>) -> Self {
        self.config.channel.title = title.into();
        self
    }

    pub fn channel_description(mut self, description: impl Into<String>) -> Self {
        self.config.channel.description = description.into();
        self
    }

    pub fn channel_language(mut self, language: impl Into<String>) -> Self {
        self.config.channel.language = language.into();
        self
    }

    /// Build the Config, validating it first.
    pub fn build(self) -> Result<Config, FeedError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
