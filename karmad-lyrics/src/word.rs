//! Reconstructed lyric words

use crate::hyphenate::Hyphenator;
use crate::meta::Convention;
use crate::smf::Event;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Letter runs, apostrophes included ("don't", "singin'")
static LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}']+").expect("valid regex"));

/// Control character at the start of a segmented-text word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KarCommand {
    /// `\` clears the screen (new verse)
    ClearScreen,
    /// `/` starts a new line
    NewLine,
    /// `' '` starts a new word
    NewWord,
    /// Line-lyric words carry no command
    None,
    /// First character is not a control character
    Unknown,
}

impl KarCommand {
    /// Command of a segmented-text word from its first character
    pub fn from_char(c: Option<char>) -> Self {
        match c {
            Some('\\') => KarCommand::ClearScreen,
            Some('/') => KarCommand::NewLine,
            Some(' ') => KarCommand::NewWord,
            _ => KarCommand::Unknown,
        }
    }

    /// Character written back in front of a replacement
    pub fn as_char(self) -> Option<char> {
        match self {
            KarCommand::ClearScreen => Some('\\'),
            KarCommand::NewLine => Some('/'),
            KarCommand::NewWord => Some(' '),
            KarCommand::None | KarCommand::Unknown => None,
        }
    }
}

/// True for characters that mark boundaries rather than lyrics
pub fn is_control_char(c: char) -> bool {
    matches!(c, ' ' | '/' | '\\')
}

/// A word split into its affixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affixes {
    pub leading_quote: String,
    pub core_word: String,
    pub trailing_punctuation: String,
}

/// Split cleaned word text into leading affix, core and trailing punctuation
///
/// A quote as the very first character is always leading. Anything before
/// the first letter run joins it; the first letter run is the core and the
/// rest is trailing punctuation. Text without letters is all punctuation.
pub fn split_affixes(text: &str) -> Affixes {
    let (quote, rest) = match text.chars().next() {
        Some(c @ ('\'' | '"')) => (c.to_string(), &text[c.len_utf8()..]),
        _ => (String::new(), text),
    };

    let Some(m) = LETTERS.find(rest) else {
        return Affixes {
            leading_quote: quote,
            core_word: String::new(),
            trailing_punctuation: rest.to_string(),
        };
    };

    Affixes {
        leading_quote: format!("{}{}", quote, &rest[..m.start()]),
        core_word: m.as_str().to_string(),
        trailing_punctuation: rest[m.end()..].to_string(),
    }
}

/// A word rebuilt from one or more lyric events of a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub convention: Convention,
    pub track_index: usize,
    /// Event positions in the track, strictly increasing
    pub event_indices: Vec<usize>,
    /// Fragment position inside each event (multi-word text events)
    pub sub_indices: Vec<usize>,
    /// Copies of the events the word was built from
    pub source_events: Vec<Event>,
    /// Decoded fragment contributed by each event
    pub texts: Vec<String>,
    pub command: KarCommand,
    pub leading_quote: String,
    pub core_word: String,
    pub trailing_punctuation: String,
    pub attr_key: String,
    pub is_line_terminator: bool,
}

impl Word {
    pub fn first_index(&self) -> usize {
        self.event_indices.first().copied().unwrap_or(0)
    }

    pub fn last_index(&self) -> usize {
        self.event_indices.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.core_word.is_empty()
    }

    /// Syllables in the core word
    pub fn syllable_count(&self, hyphenator: &dyn Hyphenator) -> usize {
        if self.core_word.is_empty() {
            return 0;
        }
        hyphenator.hyphenate(&self.core_word).len().max(1)
    }

    /// Word as it should be shown: affixes kept, control characters dropped
    pub fn display_text(&self) -> String {
        format!(
            "{}{}{}",
            self.leading_quote, self.core_word, self.trailing_punctuation
        )
    }

    /// Raw fragments joined as they appear in the file
    pub fn raw_text(&self) -> String {
        self.texts.concat()
    }

    /// Segmented-text words beginning with `/` or `\` open a new line
    pub fn starts_line(&self) -> bool {
        self.convention == Convention::SegmentedText
            && matches!(
                self.texts.first().and_then(|t| t.chars().next()),
                Some('/' | '\\')
            )
    }
}
