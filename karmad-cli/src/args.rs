//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for karmad
#[derive(Parser, Debug)]
#[command(name = "karmad")]
#[command(about = "Karaoke madlib tools: extract lyrics, fill in words, export new songs")]
#[command(version)]
pub struct Args {
    /// Root folder holding songs, templates, madlibs and exports
    #[arg(short, long, global = true)]
    pub root_folder: Option<PathBuf>,

    /// TOML config file (defaults to the platform config location)
    #[arg(short, long, global = true, env = "KARMAD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the songs in the catalog
    Songs,

    /// Print the lyrics of a song
    Extract {
        /// Song id
        song: String,

        /// Print lines and word summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create, inspect and fill madlibs
    Madlib {
        #[command(subcommand)]
        action: MadlibCommand,
    },

    /// Choose which words of a song become blanks
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },

    /// Write the rewritten karaoke file of a madlib
    Export {
        /// Madlib id
        #[arg(required_unless_present = "all")]
        id: Option<String>,

        /// Export every complete madlib
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MadlibCommand {
    /// Start a madlib from the song's template
    New {
        /// Song id
        song: String,
    },

    /// Print a madlib record
    Show {
        /// Madlib id
        id: String,
    },

    /// List stored madlibs
    List,

    /// Set names and replacement words
    Fill {
        /// Madlib id
        id: String,

        #[arg(long)]
        singer: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Replacement as key=text (repeatable)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TemplateCommand {
    /// Replace a song's template
    Set {
        /// Song id
        song: String,

        /// Selected word as key=prompt (repeatable)
        #[arg(long = "word", value_parser = parse_key_value)]
        words: Vec<(String, String)>,
    },

    /// Print a song's template
    Show {
        /// Song id
        song: String,
    },
}

/// Parse `key=value`; the value may itself contain `=`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    Ok((key.to_string(), value.to_string()))
}
