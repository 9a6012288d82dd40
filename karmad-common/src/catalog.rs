//! Song catalog snapshot
//!
//! The catalog is loaded once from the JSON song index and never mutated.
//! Callers share it behind an `Arc`; reloading means building a new snapshot.
//! A song's id is its position in the index, in string form.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One entry of the song index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Display title, also rewritten into output file names
    pub title: String,
    /// Source file name relative to the karaoke directory
    pub filen: String,
    /// Performer of the original recording
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

/// Immutable view of the song index
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
    songs: Vec<Song>,
    karaoke_dir: PathBuf,
}

impl SongCatalog {
    /// Load the song index JSON (an array of songs)
    pub fn load(index_path: &Path, karaoke_dir: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(index_path).map_err(|e| {
            Error::Config(format!("Read song index {} failed: {}", index_path.display(), e))
        })?;
        let songs: Vec<Song> = serde_json::from_str(&content)?;

        tracing::info!(songs = songs.len(), index = %index_path.display(), "Loaded song catalog");

        Ok(Self::from_songs(songs, karaoke_dir))
    }

    /// Build a catalog from already-parsed songs
    pub fn from_songs(songs: Vec<Song>, karaoke_dir: &Path) -> Self {
        Self {
            songs,
            karaoke_dir: karaoke_dir.to_path_buf(),
        }
    }

    /// Songs paired with their ids
    pub fn iter(&self) -> impl Iterator<Item = (String, &Song)> {
        self.songs.iter().enumerate().map(|(i, s)| (i.to_string(), s))
    }

    /// Look up a song by id
    pub fn get(&self, id: &str) -> Result<&Song> {
        let index: usize = id
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("Invalid song id: {:?}", id)))?;
        self.songs
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("Song {}", id)))
    }

    /// Full path of a song's source file
    pub fn song_path(&self, song: &Song) -> PathBuf {
        self.karaoke_dir.join(&song.filen)
    }
}
