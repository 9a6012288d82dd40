//! Madlib and template records
//!
//! JSON shapes match the files the web front end reads and writes:
//! templates are `{ "selectedWords": [{ "baseWordKey", "prompt" }] }` and
//! madlibs carry their fillings as `{ "baseWordKey", "prompt", "replaceWith" }`.

use crate::{Error, Result, Song};
use serde::{Deserialize, Deserializer, Serialize};

/// A word chosen for replacement when configuring a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedWord {
    pub base_word_key: String,
    #[serde(default)]
    pub prompt: String,
}

/// Per-song madlib configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MadlibTemplate {
    #[serde(default)]
    pub selected_words: Vec<SelectedWord>,
}

impl MadlibTemplate {
    /// Prompt configured for a word key
    pub fn prompt_for(&self, key: &str) -> Option<&str> {
        self.selected_words
            .iter()
            .find(|w| w.base_word_key == key)
            .map(|w| w.prompt.as_str())
    }
}

/// A single requested substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filling {
    pub base_word_key: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub replace_with: String,
}

impl Filling {
    pub fn new(base_word_key: impl Into<String>, replace_with: impl Into<String>) -> Self {
        Self {
            base_word_key: base_word_key.into(),
            prompt: String::new(),
            replace_with: replace_with.into(),
        }
    }
}

/// One user's personalized rewrite of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Madlib {
    pub id: String,
    /// Song id in the catalog (older records store it as a number)
    #[serde(deserialize_with = "song_id")]
    pub song: String,
    #[serde(default)]
    pub song_name: String,
    #[serde(default)]
    pub singer_name: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub fillings: Vec<Filling>,
}

impl Madlib {
    /// Start a madlib from a song's template, all fillings blank
    pub fn from_template(
        id: String,
        song_id: &str,
        song: &Song,
        template: &MadlibTemplate,
    ) -> Self {
        let fillings = template
            .selected_words
            .iter()
            .map(|w| Filling {
                base_word_key: w.base_word_key.clone(),
                prompt: w.prompt.clone(),
                replace_with: String::new(),
            })
            .collect();

        Self {
            id,
            song: song_id.to_string(),
            song_name: song.title.clone(),
            singer_name: String::new(),
            author_name: String::new(),
            fillings,
        }
    }

    /// Set the replacement text for every filling with `key`
    pub fn fill(&mut self, key: &str, text: &str) -> Result<()> {
        let mut found = false;
        for filling in self.fillings.iter_mut().filter(|f| f.base_word_key == key) {
            filling.replace_with = text.to_string();
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Madlib {} has no word {:?}",
                self.id, key
            )))
        }
    }

    /// Keys still waiting for a replacement
    pub fn missing_keys(&self) -> Vec<&str> {
        self.fillings
            .iter()
            .filter(|f| f.replace_with.trim().is_empty())
            .map(|f| f.base_word_key.as_str())
            .collect()
    }
}

fn song_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SongId {
        Text(String),
        Number(u64),
    }

    Ok(match SongId::deserialize(deserializer)? {
        SongId::Text(s) => s,
        SongId::Number(n) => n.to_string(),
    })
}
