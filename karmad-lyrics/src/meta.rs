//! Meta event classification
//!
//! Karaoke files carry lyrics in one of two conventions:
//! - text events (meta type 1, the `.kar` style) where control characters at
//!   the start of a fragment mark word and line boundaries
//! - lyric events (meta type 5) where a trailing space or a carriage return
//!   ends a word
//!
//! Text events starting with `@` are karaoke tags, not lyrics.

use crate::smf::Event;
use crate::{Error, Result};
use serde::Serialize;

/// Meta type of segmented-text events
pub const META_TEXT: u8 = 0x01;
/// Meta type of line-lyric events
pub const META_LYRIC: u8 = 0x05;

const TAG_MARKER: char = '@';

/// Lyric storage convention of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Convention {
    /// Boundaries marked by leading `' '`, `/` or `\` inside text events
    SegmentedText,
    /// Boundaries marked by trailing space or carriage return in lyric events
    LineLyric,
}

impl Convention {
    /// Meta type used when writing events of this convention
    pub fn meta_type(self) -> u8 {
        match self {
            Convention::SegmentedText => META_TEXT,
            Convention::LineLyric => META_LYRIC,
        }
    }
}

/// Karaoke tag carried by an `@` text event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KarTag {
    /// `@K` file type / copyright
    FileType(String),
    /// `@L` language
    Language(String),
    /// `@T` title, artist, sequencer (one per event)
    Title(String),
    /// `@I` other information
    Info(String),
}

/// Tags collected from a whole file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KarTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub title_lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
}

impl KarTags {
    pub fn push(&mut self, tag: KarTag) {
        match tag {
            KarTag::FileType(v) => self.file_type = Some(v),
            KarTag::Language(v) => self.language = Some(v),
            KarTag::Title(v) => self.title_lines.push(v),
            KarTag::Info(v) => self.info.push(v),
        }
    }
}

/// Outcome of classifying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Lyric content for the segmenter
    Lyric {
        convention: Convention,
        text: &'a str,
        raw: &'a [u8],
    },
    /// Karaoke metadata
    Tag(KarTag),
    /// Not lyric content
    Ignored,
}

/// Classify one event of track `track` at position `index`
pub fn classify(event: &Event, track: usize, index: usize) -> Result<Classified<'_>> {
    let Some(meta_type) = event.meta_type() else {
        return Ok(Classified::Ignored);
    };

    let convention = match meta_type {
        META_TEXT => Convention::SegmentedText,
        META_LYRIC => Convention::LineLyric,
        // Copyright, track name, instrument, marker, cue point
        0x02..=0x04 | 0x06 | 0x07 => {
            tracing::trace!(track, event = index, meta_type, "Ignoring non-lyric text event");
            return Ok(Classified::Ignored);
        }
        0x08..=0x0F => {
            tracing::warn!(
                track,
                event = index,
                meta_type,
                "Unknown text meta type, ignoring event"
            );
            return Ok(Classified::Ignored);
        }
        _ => return Ok(Classified::Ignored),
    };

    let raw = event.data();
    let text = std::str::from_utf8(raw).map_err(|source| Error::Decode {
        track,
        event: index,
        source,
    })?;

    if text.is_empty() {
        return Ok(Classified::Ignored);
    }

    if convention == Convention::SegmentedText && text.starts_with(TAG_MARKER) {
        return Ok(match parse_tag(text) {
            Some(tag) => Classified::Tag(tag),
            None => {
                tracing::debug!(track, event = index, text, "Unrecognized karaoke tag");
                Classified::Ignored
            }
        });
    }

    Ok(Classified::Lyric {
        convention,
        text,
        raw,
    })
}

fn parse_tag(text: &str) -> Option<KarTag> {
    let mut chars = text.strip_prefix(TAG_MARKER)?.chars();
    let kind = chars.next()?;
    let value = chars.as_str().trim().to_string();
    match kind {
        'K' => Some(KarTag::FileType(value)),
        'L' => Some(KarTag::Language(value)),
        'T' => Some(KarTag::Title(value)),
        'I' => Some(KarTag::Info(value)),
        _ => None,
    }
}
