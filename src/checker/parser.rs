//! Status page text contract.
//!
//! Shoutcast-style pages report a live stream with a sentence like
//! `Stream is up at 128 kbps with 12 of 500 listeners`. Everything that
//! depends on that wording lives here.

use crate::data::StreamStatus;

/// Marker present in the page text while the stream is live.
pub const ONLINE_MARKER: &str = "Stream is up";
/// Text immediately before the listener count.
pub const LISTENERS_PREFIX: &str = "with ";
/// Text immediately after the listener count.
pub const LISTENERS_SUFFIX: &str = " listeners";

/// Turns a status page body into a [`StreamStatus`].
pub trait StatusParser: Send + Sync {
    fn parse(&self, body: &str) -> StreamStatus;
}

/// Parser for Shoutcast (and xcast-hosted) `index.html` status pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoutcastParser;

impl StatusParser for ShoutcastParser {
    fn parse(&self, body: &str) -> StreamStatus {
        let text = visible_text(body);
        let Some(marker) = text.find(ONLINE_MARKER) else {
            return StreamStatus::offline();
        };
        let sentence = &text[marker + ONLINE_MARKER.len()..];
        StreamStatus::online(listener_count(sentence).unwrap_or(0))
    }
}

/// The first integer between [`LISTENERS_PREFIX`] and [`LISTENERS_SUFFIX`],
/// searched in the text following [`ONLINE_MARKER`].
///
/// `"with 3 of 500 listeners"` yields 3.
fn listener_count(text: &str) -> Option<u32> {
    let start = text.find(LISTENERS_PREFIX)? + LISTENERS_PREFIX.len();
    let rest = &text[start..];
    let end = rest.find(LISTENERS_SUFFIX)?;
    rest[..end].split_whitespace().next()?.parse().ok()
}

/// Page text with tags, scripts, and styles removed, a few entities
/// decoded, and whitespace collapsed to single spaces.
pub fn visible_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        rest = &rest[open..];

        let skip_to = ["script", "style"].iter().find_map(|tag| {
            let lowered = rest.get(1..=tag.len())?.to_ascii_lowercase();
            (lowered == *tag).then(|| format!("</{}", tag))
        });

        rest = match skip_to {
            Some(closing) => match find_ignore_case(rest, &closing) {
                Some(pos) => after_tag(&rest[pos..]),
                None => "",
            },
            None => after_tag(rest),
        };
        // Tags separate words even when the markup has no spaces.
        text.push(' ');
    }
    text.push_str(rest);

    collapse_whitespace(&decode_entities(&text))
}

/// Slice following the next `>`, or empty when the tag is unterminated.
fn after_tag(s: &str) -> &str {
    s.find('>').map(|end| &s[end + 1..]).unwrap_or("")
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
