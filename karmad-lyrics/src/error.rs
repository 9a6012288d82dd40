//! Error types for karmad-lyrics
//!
//! Every variant is fatal for the extraction or export that raised it.
//! Unknown text meta subtypes are only logged (see [`crate::meta`]).

use thiserror::Error;

/// Errors raised while reading, segmenting or rewriting a karaoke file
#[derive(Error, Debug)]
pub enum Error {
    /// The container could not be decoded
    #[error("Malformed MIDI data: {0}")]
    Midi(String),

    /// A lyric event's payload is not valid UTF-8; word boundaries would be corrupted
    #[error("Track {track} event {event}: lyric text is not valid UTF-8: {source}")]
    Decode {
        track: usize,
        event: usize,
        source: std::str::Utf8Error,
    },

    /// A filling references a key the source file does not contain
    #[error("Unknown word key: {0:?}")]
    UnknownWordKey(String),

    /// A syllable does not fit the one-byte length field
    #[error("Syllable {syllable:?} encodes to {len} bytes (limit 127)")]
    SyllableEncodingOverflow { syllable: String, len: usize },

    /// Replacement requested for a word without alphabetic content
    #[error("Word at track {track} event {event} has no lyric text to replace")]
    EmptyWordLookup { track: usize, event: usize },

    /// The word shares an event with another word's lyric text
    #[error("Track {track} event {event} holds lyrics of more than one word")]
    SharedEvent { track: usize, event: usize },

    /// Two replacements claim the same events
    #[error("Replacements overlap in track {track} at event {event}")]
    OverlappingReplacement { track: usize, event: usize },

    /// A computed delta cannot be written as a variable-length quantity
    #[error("Delta time {0} exceeds the 28-bit limit")]
    DeltaOverflow(u64),

    /// Hyphenation patterns could not be loaded
    #[error("Hyphenation dictionary error: {0}")]
    Hyphenation(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from karmad-common (atomic writes, records)
    #[error("Common error: {0}")]
    Common(#[from] karmad_common::Error),
}

/// Convenience Result type using the karmad-lyrics Error
pub type Result<T> = std::result::Result<T, Error>;
