//! Shared state for command handlers

use anyhow::{Context, Result};
use karmad_common::config::Paths;
use karmad_common::{MadlibStore, Song, SongCatalog};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolved paths plus the catalog snapshot and record store
#[derive(Debug, Clone)]
pub struct AppContext {
    pub paths: Paths,
    pub catalog: Arc<SongCatalog>,
    pub store: MadlibStore,
}

impl AppContext {
    /// Create the directory layout and load the song catalog
    ///
    /// A missing song index gives an empty catalog.
    pub fn new(paths: Paths) -> Result<Self> {
        paths
            .ensure_directories()
            .with_context(|| format!("Failed to initialize root folder {}", paths.root.display()))?;

        let catalog = if paths.song_index.exists() {
            SongCatalog::load(&paths.song_index, &paths.karaoke_dir)
                .context("Failed to load song catalog")?
        } else {
            warn!(index = %paths.song_index.display(), "Song index not found, catalog is empty");
            SongCatalog::from_songs(Vec::new(), &paths.karaoke_dir)
        };

        info!("Root folder: {}", paths.root.display());

        let store = MadlibStore::new(&paths.madlib_template_dir, &paths.filled_madlib_dir);
        Ok(Self {
            paths,
            catalog: Arc::new(catalog),
            store,
        })
    }

    /// Catalog entry and source file of a song
    pub fn song(&self, song_id: &str) -> Result<(&Song, PathBuf)> {
        let song = self
            .catalog
            .get(song_id)
            .with_context(|| format!("Unknown song {}", song_id))?;
        Ok((song, self.catalog.song_path(song)))
    }
}
