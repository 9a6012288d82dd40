//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`KARMAD_ROOT_FOLDER`, then `KARMAD_ROOT`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops the tools: a warning is
//! logged and built-in defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "KARMAD_ROOT_FOLDER";

/// Alternative root folder environment variable
pub const ROOT_ENV: &str = "KARMAD_ROOT";

/// Bootstrap configuration loaded from TOML
///
/// Directory entries may be relative (joined onto the root folder) or absolute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding songs, templates, madlibs and output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    /// Directory containing the karaoke source files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub karaoke_dir: Option<PathBuf>,

    /// JSON song index (array of songs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_index: Option<PathBuf>,

    /// Per-song madlib templates (`{song_id}.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub madlib_template_dir: Option<PathBuf>,

    /// Filled madlib records (`{madlib_id}.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_madlib_dir: Option<PathBuf>,

    /// Output directory for exported karaoke files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub madlib_dir: Option<PathBuf>,

    /// Logging configuration (optional, kept last: it is a TOML table)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the TOML config, falling back to defaults
///
/// `explicit` is a path given on the command line; otherwise the platform
/// config locations are searched.
pub fn load_or_default(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path(),
    };

    let Some(path) = path else {
        return TomlConfig::default();
    };

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} (using built-in defaults)", e);
            TomlConfig::default()
        }
    }
}

/// Write config to TOML atomically
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    crate::atomic::write_atomic(path, content.as_bytes())
}

/// First existing platform config file
///
/// Linux checks `~/.config/karmad/config.toml`, then `/etc/karmad/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("karmad").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/karmad/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\karmad
        dirs::data_local_dir()
            .map(|d| d.join("karmad"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\karmad"))
    } else {
        // ~/.local/share/karmad, ~/Library/Application Support/karmad
        dirs::data_local_dir()
            .map(|d| d.join("karmad"))
            .unwrap_or_else(|| PathBuf::from("./karmad_data"))
    }
}

/// Root folder resolver
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    /// Create a resolver with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Command-line override
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Root folder from a loaded TOML config
    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    /// Resolve the root folder following the priority order
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variables
        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        default_root_folder()
    }
}

/// All directories and files the tools use, resolved against the root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    pub karaoke_dir: PathBuf,
    pub song_index: PathBuf,
    pub madlib_template_dir: PathBuf,
    pub filled_madlib_dir: PathBuf,
    pub madlib_dir: PathBuf,
}

impl Paths {
    /// Resolve paths from the root folder and config overrides
    pub fn resolve(root: &Path, config: &TomlConfig) -> Self {
        let pick = |value: &Option<PathBuf>, default: &str| match value {
            Some(p) => root.join(p),
            None => root.join(default),
        };

        Self {
            root: root.to_path_buf(),
            karaoke_dir: pick(&config.karaoke_dir, "karaoke"),
            song_index: pick(&config.song_index, "songs.json"),
            madlib_template_dir: pick(&config.madlib_template_dir, "templates"),
            filled_madlib_dir: pick(&config.filled_madlib_dir, "madlibs"),
            madlib_dir: pick(&config.madlib_dir, "output"),
        }
    }

    /// Create every directory (idempotent)
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.root,
            &self.karaoke_dir,
            &self.madlib_template_dir,
            &self.filled_madlib_dir,
            &self.madlib_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
