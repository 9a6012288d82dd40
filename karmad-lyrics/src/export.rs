//! Export of rewritten karaoke files
//!
//! Parse the source, apply every filling, serialize and persist atomically.
//! Any failure happens before the output path exists.

use crate::dictionary::WordDictionary;
use crate::hyphenate::Hyphenator;
use crate::resolve::{apply_plans, plan_all, resolve};
use crate::segment::segment;
use crate::smf::MidiFile;
use crate::title::rewrite_title;
use crate::Result;
use karmad_common::atomic::write_atomic;
use karmad_common::Filling;
use std::path::{Path, PathBuf};

/// Extension used when the source file has none
pub const DEFAULT_EXTENSION: &str = "kar";

/// Separator between title words in output file names
const TITLE_SEPARATOR: &str = "_";

/// Where and under which name an export is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMeta {
    pub dir: PathBuf,
    pub title: String,
    pub singer: String,
    pub author: String,
    pub id: String,
}

impl OutputMeta {
    /// `{rewritten_title}_sung_by_{singer}_filled_by_{author}__{id}.{ext}`
    pub fn file_name(&self, fillings: &[Filling], extension: &str) -> String {
        let title = rewrite_title(&self.title, fillings, TITLE_SEPARATOR);
        format!(
            "{}_sung_by_{}_filled_by_{}__{}.{}",
            sanitize(&title),
            sanitize(&self.singer),
            sanitize(&self.author),
            sanitize(&self.id),
            sanitize(extension)
        )
    }
}

/// Make a file name component safe to place inside the output directory
///
/// Path separators, characters Windows rejects, control characters and
/// whitespace become `_`; a leading dot is escaped so nothing turns hidden
/// or climbs out with `..`.
pub fn sanitize(component: &str) -> String {
    let mut cleaned: String = component
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        cleaned.push_str("unknown");
    }
    if cleaned.starts_with('.') {
        cleaned.insert(0, '_');
    }
    cleaned
}

/// Apply `fillings` to a parsed file in place
///
/// Returns the number of word occurrences replaced. On error the file is
/// left untouched.
pub fn rewrite(
    midi: &mut MidiFile,
    fillings: &[Filling],
    hyphenator: &dyn Hyphenator,
) -> Result<usize> {
    let segmentation = segment(midi)?;
    let dictionary = WordDictionary::build(&segmentation.words);
    let replacements = resolve(&dictionary, fillings)?;
    let plans = plan_all(midi, &replacements, hyphenator)?;
    let count = replacements.len();

    apply_plans(midi, plans)?;
    Ok(count)
}

/// Rewrite `source` with `fillings` and write the result under `meta.dir`
pub fn build_output(
    meta: &OutputMeta,
    source: &Path,
    fillings: &[Filling],
    hyphenator: &dyn Hyphenator,
) -> Result<PathBuf> {
    let mut midi = MidiFile::open(source)?;
    let replaced = rewrite(&mut midi, fillings, hyphenator)?;
    let bytes = midi.to_bytes();

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);
    let target = meta.dir.join(meta.file_name(fillings, extension));

    std::fs::create_dir_all(&meta.dir)?;
    write_atomic(&target, &bytes)?;

    tracing::info!(
        id = %meta.id,
        source = %source.display(),
        output = %target.display(),
        replaced,
        "Exported madlib"
    );

    Ok(target)
}
