// ABOUTME: End-to-end tests for the profile-to-RSS pipeline against a mock HTTP server.
// ABOUTME: Covers ordering, skipped blocks, failed episode pages, and the empty-result outcome.

use std::fs;

use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use profilecast_feed::{harvest, run, Config, HttpFetcher, RunOutcome};
use tempfile::TempDir;

fn html_page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>")
}

fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    Config::builder()
        .profile_url(server.url("/u/tester"))
        .output_path(dir.path().join("feed.xml"))
        .channel_title("Tester Radio")
        .build()
        .unwrap()
}

fn mock_html<'a>(server: &'a MockServer, path: &str, body: String) -> httpmock::Mock<'a> {
    let path = path.to_string();
    server.mock(move |when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(body);
    })
}

#[test]
fn three_blocks_with_missing_anchor_yield_two_ordered_episodes() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    let listing = mock_html(
        &server,
        "/u/tester",
        html_page(
            r#"
            <div class="sound-details">
              <a href="/u/tester/first">First Episode</a>
              <time>April 15, 2024</time>
            </div>
            <div class="sound-details">
              <span>Private upload</span>
            </div>
            <div class="sound-details">
              <a href="/u/tester/third">[2023.11.02] Third Episode</a>
            </div>"#,
        ),
    );
    let first = mock_html(
        &server,
        "/u/tester/first",
        html_page(r#"<audio src="https://media.example.com/first.m4a"></audio>"#),
    );
    let third = mock_html(
        &server,
        "/u/tester/third",
        html_page(
            r#"<audio controls><source src="https://media.example.com/third.mp3"></audio>"#,
        ),
    );

    let fetcher = HttpFetcher::new(&config).unwrap();
    let outcome = run(&config, &fetcher).unwrap();

    listing.assert();
    first.assert();
    third.assert();
    assert_eq!(
        outcome,
        RunOutcome::Written {
            path: config.output_path.clone(),
            episodes: 2,
            rejected: 0,
        }
    );

    let xml = fs::read(&config.output_path).unwrap();
    let feed = feed_rs::parser::parse(xml.as_slice()).unwrap();
    assert_eq!(feed.title.map(|t| t.content).as_deref(), Some("Tester Radio"));
    assert_eq!(feed.language.as_deref(), Some("en-us"));

    let titles: Vec<String> = feed
        .entries
        .iter()
        .map(|e| e.title.as_ref().map(|t| t.content.clone()).unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["First Episode", "[2023.11.02] Third Episode"]);

    let ids: Vec<&str> = feed.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            server.url("/u/tester/first").as_str(),
            server.url("/u/tester/third").as_str()
        ]
    );

    assert_eq!(
        feed.entries[0].published,
        Some(Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap())
    );
    assert_eq!(
        feed.entries[1].published,
        Some(Utc.with_ymd_and_hms(2023, 11, 2, 0, 0, 0).unwrap())
    );

    let raw = String::from_utf8(xml).unwrap();
    assert!(raw.contains(
        r#"<enclosure url="https://media.example.com/first.m4a" length="0" type="audio/mp4"/>"#
    ));
    assert!(raw.contains(
        r#"<enclosure url="https://media.example.com/third.mp3" length="0" type="audio/mpeg"/>"#
    ));
    assert!(raw.contains("<description>Episode: First Episode</description>"));
}

#[test]
fn failing_episode_page_skips_only_that_episode() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    mock_html(
        &server,
        "/u/tester",
        html_page(
            r#"
            <div class="sound-details"><a href="/u/tester/broken">Broken</a></div>
            <div class="sound-details"><a href="/u/tester/ok">Fine (3-4-24)</a></div>"#,
        ),
    );
    let broken = server.mock(|when, then| {
        when.method(GET).path("/u/tester/broken");
        then.status(500);
    });
    mock_html(
        &server,
        "/u/tester/ok",
        html_page(r#"<script>var media = "https://media.example.com/ok.ogg";</script>"#),
    );

    let fetcher = HttpFetcher::new(&config).unwrap();
    let harvest = harvest(&config, &fetcher).unwrap();

    broken.assert();
    assert_eq!(harvest.episodes.len(), 1);
    assert_eq!(harvest.episodes[0].title, "Fine (3-4-24)");
    assert_eq!(harvest.episodes[0].audio_url, "https://media.example.com/ok.ogg");
    assert_eq!(
        harvest.episodes[0].pub_date,
        Utc.with_ymd_and_hms(2024, 4, 3, 0, 0, 0).unwrap()
    );
    assert_eq!(harvest.rejections.len(), 1);
    assert_eq!(harvest.rejections[0].title(), "Broken");
}

#[test]
fn no_resolvable_episodes_writes_nothing() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    mock_html(
        &server,
        "/u/tester",
        html_page(r#"<div class="sound-details"><a href="/u/tester/notes">Notes</a></div>"#),
    );
    mock_html(
        &server,
        "/u/tester/notes",
        html_page(r#"<audio src="https://media.example.com/notes.txt"></audio>"#),
    );

    let fetcher = HttpFetcher::new(&config).unwrap();
    let outcome = run(&config, &fetcher).unwrap();

    assert_eq!(outcome, RunOutcome::Empty { rejected: 1 });
    assert!(!config.output_path.exists());
}

#[test]
fn profile_fetch_failure_is_empty_result() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    let profile = server.mock(|when, then| {
        when.method(GET).path("/u/tester");
        then.status(503);
    });

    let fetcher = HttpFetcher::new(&config).unwrap();
    let outcome = run(&config, &fetcher).unwrap();

    profile.assert();
    assert_eq!(outcome, RunOutcome::Empty { rejected: 0 });
    assert!(!config.output_path.exists());
}

#[test]
fn existing_feed_is_overwritten() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);
    fs::write(&config.output_path, "stale").unwrap();

    mock_html(
        &server,
        "/u/tester",
        html_page(r#"<div class="sound-details"><a href="/u/tester/a">A</a></div>"#),
    );
    mock_html(
        &server,
        "/u/tester/a",
        html_page(r#"<audio src="https://media.example.com/a.wav"></audio>"#),
    );

    let fetcher = HttpFetcher::new(&config).unwrap();
    run(&config, &fetcher).unwrap();

    let xml = fs::read_to_string(&config.output_path).unwrap();
    assert!(xml.contains("<rss version=\"2.0\">"));
    assert!(xml.contains("type=\"audio/x-wav\""));
}
