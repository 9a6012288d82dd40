//! # karmad Lyrics Engine
//!
//! Reads the lyrics out of karaoke MIDI files and rewrites chosen words
//! with replacement text while keeping the song in sync:
//! - `smf`: Standard MIDI File parsing and serialization
//! - `meta`, `segment`, `word`, `attr`: from lyric events to keyed words
//! - `dictionary`, `extract`: word lookup, line grouping and the read API
//! - `resolve`, `reencode`, `hyphenate`: turning fillings into timed syllables
//! - `title`, `export`: output naming and atomic export

pub mod attr;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod extract;
pub mod hyphenate;
pub mod meta;
pub mod reencode;
pub mod resolve;
pub mod segment;
pub mod smf;
pub mod title;
pub mod word;

pub use dictionary::{lines, Lines, WordDictionary};
pub use error::{Error, Result};
pub use export::{build_output, rewrite, OutputMeta};
pub use extract::{extract, extract_file, Extraction, WordSummary, WordView};
pub use hyphenate::{Hyphenator, StandardHyphenator};
pub use meta::{Convention, KarTags};
pub use segment::{segment, Segmentation};
pub use smf::{Event, EventKind, MidiFile, Track};
pub use title::rewrite_title;
pub use word::{KarCommand, Word};
