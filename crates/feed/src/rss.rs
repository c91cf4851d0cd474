// ABOUTME: RSS 2.0 rendering and output for assembled episodes.
// ABOUTME: Writes channel metadata plus one item per episode with guid, pubDate, and enclosure.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::audio::mime_type_for;
use crate::error::FeedError;
use crate::models::{ChannelMeta, Episode};

pub const GENERATOR: &str = concat!("profilecast ", env!("CARGO_PKG_VERSION"));
pub const RSS_DOCS: &str = "https://www.rssboard.org/rss-specification";

/// Enclosure length when the size was not measured.
pub const UNKNOWN_LENGTH: u64 = 0;

/// RFC 822 date as used in RSS `pubDate`.
pub fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Renders the feed document. Items keep the order of `episodes`.
pub fn render_rss(
    channel: &ChannelMeta,
    episodes: &[Episode],
    built_at: DateTime<Utc>,
) -> Result<String, FeedError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(FeedError::write)?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    w.write_event(Event::Start(rss)).map_err(FeedError::write)?;
    w.write_event(Event::Start(BytesStart::new("channel")))
        .map_err(FeedError::write)?;

    text_element(&mut w, "title", &channel.title)?;
    text_element(&mut w, "link", &channel.link)?;
    text_element(&mut w, "description", &channel.description)?;
    text_element(&mut w, "language", &channel.language)?;
    text_element(&mut w, "lastBuildDate", &rfc822(&built_at))?;
    text_element(&mut w, "generator", GENERATOR)?;
    text_element(&mut w, "docs", RSS_DOCS)?;

    for episode in episodes {
        write_item(&mut w, episode)?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))
        .map_err(FeedError::write)?;
    w.write_event(Event::End(BytesEnd::new("rss")))
        .map_err(FeedError::write)?;

    let mut out = String::from_utf8(w.into_inner()).map_err(FeedError::write)?;
    out.push('\n');
    Ok(out)
}

fn write_item(w: &mut Writer<Vec<u8>>, episode: &Episode) -> Result<(), FeedError> {
    w.write_event(Event::Start(BytesStart::new("item")))
        .map_err(FeedError::write)?;
    text_element(w, "title", &episode.title)?;
    text_element(w, "link", &episode.episode_url)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "true"));
    w.write_event(Event::Start(guid)).map_err(FeedError::write)?;
    w.write_event(Event::Text(BytesText::new(&strip_control_chars(
        &episode.episode_url,
    ))))
        .map_err(FeedError::write)?;
    w.write_event(Event::End(BytesEnd::new("guid")))
        .map_err(FeedError::write)?;

    text_element(w, "description", &episode.description)?;
    text_element(w, "pubDate", &rfc822(&episode.pub_date))?;

    let length = UNKNOWN_LENGTH.to_string();
    let audio_url = strip_control_chars(&episode.audio_url);
    let mime = mime_type_for(&audio_url);
    let mut enclosure = BytesStart::new("enclosure");
    enclosure.push_attribute(("url", audio_url.as_str()));
    enclosure.push_attribute(("length", length.as_str()));
    enclosure.push_attribute(("type", mime.as_str()));
    w.write_event(Event::Empty(enclosure))
        .map_err(FeedError::write)?;

    w.write_event(Event::End(BytesEnd::new("item")))
        .map_err(FeedError::write)?;
    Ok(())
}

fn text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), FeedError> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(FeedError::write)?;
    w.write_event(Event::Text(BytesText::new(&strip_control_chars(text))))
        .map_err(FeedError::write)?;
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(FeedError::write)?;
    Ok(())
}

/// Drops characters XML 1.0 cannot carry (C0 controls other than tab/LF/CR).
fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .collect()
}

/// Writes `document` to `path`, replacing any existing file.
///
/// The bytes land in a sibling temp file first and are renamed into place.
pub fn write_feed(path: &Path, document: &str) -> Result<(), FeedError> {
    let tmp = temp_sibling(path);
    fs::write(&tmp, document).map_err(FeedError::write)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(FeedError::write(format!("{}: {err}", path.display())));
    }
    info!(path = %path.display(), bytes = document.len(), "wrote feed");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed.xml".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
