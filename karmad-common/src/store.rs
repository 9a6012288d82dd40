//! Flat-file store for templates and filled madlibs
//!
//! Layout:
//! - `{template_dir}/{song_id}.json`: one template per song
//! - `{filled_dir}/{madlib_id}.json`: one record per madlib
//!
//! Every write goes through [`crate::atomic::write_atomic`].

use crate::atomic::write_atomic;
use crate::uuid_utils;
use crate::{Error, Madlib, MadlibTemplate, Result, SongCatalog};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Template and madlib persistence
#[derive(Debug, Clone)]
pub struct MadlibStore {
    template_dir: PathBuf,
    filled_dir: PathBuf,
}

impl MadlibStore {
    pub fn new(template_dir: impl Into<PathBuf>, filled_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            filled_dir: filled_dir.into(),
        }
    }

    /// Template for a song; a song without one has an empty template
    pub fn template(&self, song_id: &str) -> Result<MadlibTemplate> {
        let path = self.template_path(song_id)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(song_id, "No template on disk, using empty template");
                Ok(MadlibTemplate::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_template(&self, song_id: &str, template: &MadlibTemplate) -> Result<()> {
        let path = self.template_path(song_id)?;
        write_json(&path, template)?;
        info!(song_id, words = template.selected_words.len(), "Saved madlib template");
        Ok(())
    }

    /// Create and persist a fresh madlib for a song
    pub fn create(&self, song_id: &str, catalog: &SongCatalog) -> Result<Madlib> {
        let song = catalog.get(song_id)?;
        let template = self.template(song_id)?;
        let madlib = Madlib::from_template(uuid_utils::madlib_id(), song_id, song, &template);

        self.save(&madlib)?;
        info!(madlib_id = %madlib.id, song_id, "Created madlib");
        Ok(madlib)
    }

    pub fn get(&self, id: &str) -> Result<Madlib> {
        let path = self.madlib_path(id)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Madlib {}", id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, madlib: &Madlib) -> Result<()> {
        let path = self.madlib_path(&madlib.id)?;
        write_json(&path, madlib)
    }

    /// All readable madlibs, ordered by id
    ///
    /// Records that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Madlib>> {
        let entries = match std::fs::read_dir(&self.filled_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut madlibs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|c| serde_json::from_str::<Madlib>(&c).map_err(Error::from));
            match parsed {
                Ok(madlib) => madlibs.push(madlib),
                Err(e) => warn!(path = %path.display(), "Skipping unreadable madlib: {}", e),
            }
        }

        madlibs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(madlibs)
    }

    fn template_path(&self, song_id: &str) -> Result<PathBuf> {
        if song_id.is_empty() || !song_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidInput(format!("Invalid song id: {:?}", song_id)));
        }
        Ok(self.template_dir.join(format!("{}.json", song_id)))
    }

    fn madlib_path(&self, id: &str) -> Result<PathBuf> {
        if !uuid_utils::is_valid_madlib_id(id) {
            return Err(Error::InvalidInput(format!("Invalid madlib id: {:?}", id)));
        }
        Ok(self.filled_dir.join(format!("{}.json", id)))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &content)
}
