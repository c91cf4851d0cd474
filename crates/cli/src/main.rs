// ABOUTME: CLI for converting an audio profile page into an RSS feed file.
// ABOUTME: Runs the pipeline once with defaults or flag overrides and prints a status line.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use profilecast_feed::{harvest, run, Config, HttpFetcher, RunOutcome};
use tracing_subscriber::EnvFilter;

/// Build an RSS feed from an audio profile page.
#[derive(Parser, Debug)]
#[command(name = "profilecast")]
#[command(about = "Scrape an audio profile page into an RSS feed", long_about = None)]
struct Args {
    /// Profile page listing the episodes.
    #[arg(long)]
    profile_url: Option<String>,

    /// Where to write the feed (overwritten if present).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Channel title.
    #[arg(long)]
    title: Option<String>,

    /// Channel description.
    #[arg(long)]
    description: Option<String>,

    /// Channel language code, e.g. en-us.
    #[arg(long)]
    language: Option<String>,

    /// User-Agent header for every request.
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print resolved episodes as JSON instead of writing the feed.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let fetcher = HttpFetcher::new(&config)?;

    if args.dry_run {
        let harvest = harvest(&config, &fetcher)?;
        println!("{}", serde_json::to_string_pretty(&harvest.episodes)?);
        return Ok(());
    }

    match run(&config, &fetcher).context("feed generation failed")? {
        RunOutcome::Written { path, episodes, .. } => {
            println!("RSS feed generated: {} ({} episodes)", path.display(), episodes);
        }
        RunOutcome::Empty { .. } => {
            println!(
                "No episodes found; {} was not written",
                config.output_path.display()
            );
        }
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<Config> {
    let mut builder = Config::builder();
    if let Some(url) = &args.profile_url {
        builder = builder.profile_url(url);
    }
    if let Some(path) = &args.output {
        builder = builder.output_path(path);
    }
    if let Some(title) = &args.title {
        builder = builder.channel_title(title);
    }
    if let Some(description) = &args.description {
        builder = builder.channel_description(description);
    }
    if let Some(language) = &args.language {
        builder = builder.channel_language(language);
    }
    if let Some(user_agent) = &args.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if let Some(secs) = args.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}
