//! Lyric extraction
//!
//! The read path: lines of words for display plus a per-key summary used
//! when choosing which words become madlib blanks.

use crate::dictionary::{lines, WordDictionary};
use crate::hyphenate::Hyphenator;
use crate::meta::{Convention, KarTags};
use crate::segment::segment;
use crate::smf::MidiFile;
use crate::word::{KarCommand, Word};
use crate::Result;
use karmad_common::MadlibTemplate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Serializable view of one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordView {
    /// Word with affixes, control characters removed
    pub text: String,
    /// Fragments as stored in the file
    pub raw: String,
    pub core_word: String,
    pub attr_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub leading_quote: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trailing_punctuation: String,
    pub command: KarCommand,
    pub convention: Convention,
    pub is_line_terminator: bool,
    pub syllables: usize,
}

impl WordView {
    fn new(word: &Word, hyphenator: &dyn Hyphenator) -> Self {
        Self {
            text: word.display_text(),
            raw: word.raw_text(),
            core_word: word.core_word.clone(),
            attr_key: word.attr_key.clone(),
            leading_quote: word.leading_quote.clone(),
            trailing_punctuation: word.trailing_punctuation.clone(),
            command: word.command,
            convention: word.convention,
            is_line_terminator: word.is_line_terminator,
            syllables: word.syllable_count(hyphenator),
        }
    }
}

/// Per-key metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordSummary {
    /// Core word of the first occurrence
    pub word: String,
    /// Occurrences in the file
    pub count: usize,
    pub syllables: usize,
    /// Prompt configured in the song's template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Extraction result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub lines: Vec<Vec<WordView>>,
    pub word_dict: BTreeMap<String, WordSummary>,
    pub tags: KarTags,
}

impl Extraction {
    /// Attach template prompts to the word summary
    pub fn with_prompts(mut self, template: &MadlibTemplate) -> Self {
        for (key, summary) in self.word_dict.iter_mut() {
            summary.prompt = template.prompt_for(key).map(str::to_string);
        }
        self
    }

    /// Plain lyrics, one line per output line
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extract lines and the word summary from a parsed file
pub fn extract(midi: &MidiFile, hyphenator: &dyn Hyphenator) -> Result<Extraction> {
    let segmentation = segment(midi)?;
    let words = &segmentation.words;

    let lines: Vec<Vec<WordView>> = lines(words)
        .map(|line| {
            line.into_iter()
                .map(|w| WordView::new(w, hyphenator))
                .collect::<Vec<_>>()
        })
        .collect();

    let word_dict: BTreeMap<String, WordSummary> = WordDictionary::build(words)
        .iter()
        .filter_map(|(key, occurrences)| {
            let first = occurrences.first()?;
            Some((
                key.to_string(),
                WordSummary {
                    word: first.core_word.clone(),
                    count: occurrences.len(),
                    syllables: first.syllable_count(hyphenator),
                    prompt: None,
                },
            ))
        })
        .collect();

    Ok(Extraction {
        lines,
        word_dict,
        tags: segmentation.tags,
    })
}

/// Read a file from disk and extract its lyrics
pub fn extract_file(path: &Path, hyphenator: &dyn Hyphenator) -> Result<Extraction> {
    let midi = MidiFile::open(path)?;
    let extraction = extract(&midi, hyphenator)?;
    tracing::debug!(
        path = %path.display(),
        lines = extraction.lines.len(),
        keys = extraction.word_dict.len(),
        "Extracted lyrics"
    );
    Ok(extraction)
}
