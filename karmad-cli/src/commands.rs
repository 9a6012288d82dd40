//! Command handlers
//!
//! Handlers print to the writer they are given so tests can capture output.

use crate::args::{Command, MadlibCommand, TemplateCommand};
use crate::context::AppContext;
use anyhow::{bail, Context, Result};
use karmad_common::{Madlib, MadlibTemplate, SelectedWord};
use karmad_lyrics::export::OutputMeta;
use karmad_lyrics::{build_output, extract_file, Hyphenator, StandardHyphenator};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Run one command
pub async fn run(ctx: Arc<AppContext>, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Songs => songs(&ctx, out),
        Command::Extract { song, json } => {
            let hyphenator = load_hyphenator()?;
            extract(&ctx, &song, json, &hyphenator, out)
        }
        Command::Madlib { action } => madlib(&ctx, action, out),
        Command::Template { action } => match action {
            TemplateCommand::Set { song, words } => {
                let hyphenator = load_hyphenator()?;
                set_template(&ctx, &song, &words, &hyphenator, out)
            }
            TemplateCommand::Show { song } => {
                let template = ctx.store.template(&song)?;
                writeln!(out, "{}", serde_json::to_string_pretty(&template)?)?;
                Ok(())
            }
        },
        Command::Export { id: Some(id), .. } => {
            let hyphenator = load_hyphenator()?;
            let madlib = ctx.store.get(&id)?;
            let path = export_one(&ctx, &madlib, &hyphenator)?;
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
        Command::Export { id: None, .. } => {
            let hyphenator = Arc::new(load_hyphenator()?);
            let paths = export_all(ctx, hyphenator).await?;
            for path in paths {
                writeln!(out, "{}", path.display())?;
            }
            Ok(())
        }
    }
}

fn load_hyphenator() -> Result<StandardHyphenator> {
    StandardHyphenator::english().context("Failed to load hyphenation patterns")
}

/// `id<TAB>title<TAB>file` per song
pub fn songs(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    for (id, song) in ctx.catalog.iter() {
        match &song.artist {
            Some(artist) => writeln!(out, "{}\t{} ({})\t{}", id, song.title, artist, song.filen)?,
            None => writeln!(out, "{}\t{}\t{}", id, song.title, song.filen)?,
        }
    }
    Ok(())
}

pub fn extract(
    ctx: &AppContext,
    song_id: &str,
    json: bool,
    hyphenator: &dyn Hyphenator,
    out: &mut dyn Write,
) -> Result<()> {
    let (_, path) = ctx.song(song_id)?;
    let template = ctx.store.template(song_id)?;
    let extraction = extract_file(&path, hyphenator)
        .with_context(|| format!("Failed to extract lyrics from {}", path.display()))?
        .with_prompts(&template);

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&extraction)?)?;
    } else {
        writeln!(out, "{}", extraction.to_text())?;
    }
    Ok(())
}

fn madlib(ctx: &AppContext, action: MadlibCommand, out: &mut dyn Write) -> Result<()> {
    match action {
        MadlibCommand::New { song } => {
            let madlib = ctx.store.create(&song, &ctx.catalog)?;
            writeln!(out, "{}", madlib.id)?;
        }
        MadlibCommand::Show { id } => {
            let madlib = ctx.store.get(&id)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&madlib)?)?;
        }
        MadlibCommand::List => {
            for madlib in ctx.store.list()? {
                let missing = madlib.missing_keys().len();
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    madlib.id,
                    madlib.song_name,
                    if missing == 0 {
                        "complete".to_string()
                    } else {
                        format!("{} blank", missing)
                    }
                )?;
            }
        }
        MadlibCommand::Fill {
            id,
            singer,
            author,
            set,
        } => {
            let mut madlib = ctx.store.get(&id)?;
            if let Some(singer) = singer {
                madlib.singer_name = singer;
            }
            if let Some(author) = author {
                madlib.author_name = author;
            }
            for (key, text) in &set {
                madlib.fill(key, text)?;
            }
            ctx.store.save(&madlib)?;

            let missing = madlib.missing_keys();
            if missing.is_empty() {
                writeln!(out, "{} is complete", madlib.id)?;
            } else {
                writeln!(out, "{} still needs: {}", madlib.id, missing.join(", "))?;
            }
        }
    }
    Ok(())
}

/// Replace a song's template, checking every key against the lyrics
pub fn set_template(
    ctx: &AppContext,
    song_id: &str,
    words: &[(String, String)],
    hyphenator: &dyn Hyphenator,
    out: &mut dyn Write,
) -> Result<()> {
    let (_, path) = ctx.song(song_id)?;
    let extraction = extract_file(&path, hyphenator)
        .with_context(|| format!("Failed to extract lyrics from {}", path.display()))?;

    let unknown: Vec<&str> = words
        .iter()
        .map(|(key, _)| key.as_str())
        .filter(|key| !extraction.word_dict.contains_key(*key))
        .collect();
    if !unknown.is_empty() {
        bail!("Song {} has no words {}", song_id, unknown.join(", "));
    }

    let template = MadlibTemplate {
        selected_words: words
            .iter()
            .map(|(key, prompt)| SelectedWord {
                base_word_key: key.clone(),
                prompt: prompt.clone(),
            })
            .collect(),
    };
    ctx.store.write_template(song_id, &template)?;
    writeln!(out, "Template for song {} has {} words", song_id, words.len())?;
    Ok(())
}

/// Export one complete madlib
pub fn export_one(
    ctx: &AppContext,
    madlib: &Madlib,
    hyphenator: &dyn Hyphenator,
) -> Result<PathBuf> {
    let missing = madlib.missing_keys();
    if !missing.is_empty() {
        bail!("Madlib {} has blank words: {}", madlib.id, missing.join(", "));
    }

    let (song, source) = ctx.song(&madlib.song)?;
    let meta = OutputMeta {
        dir: ctx.paths.madlib_dir.clone(),
        title: song.title.clone(),
        singer: madlib.singer_name.clone(),
        author: madlib.author_name.clone(),
        id: madlib.id.clone(),
    };

    build_output(&meta, &source, &madlib.fillings, hyphenator)
        .with_context(|| format!("Failed to export madlib {}", madlib.id))
}

/// Export every complete madlib in parallel
///
/// Incomplete madlibs are skipped. All exports run to completion; the call
/// fails if any of them failed.
pub async fn export_all(
    ctx: Arc<AppContext>,
    hyphenator: Arc<StandardHyphenator>,
) -> Result<Vec<PathBuf>> {
    let mut tasks = JoinSet::new();
    for madlib in ctx.store.list()? {
        if !madlib.missing_keys().is_empty() {
            warn!(madlib_id = %madlib.id, "Skipping incomplete madlib");
            continue;
        }
        let ctx = Arc::clone(&ctx);
        let hyphenator = Arc::clone(&hyphenator);
        tasks.spawn_blocking(move || export_one(&ctx, &madlib, hyphenator.as_ref()));
    }

    let mut paths = Vec::new();
    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined.context("Export task panicked")? {
            Ok(path) => paths.push(path),
            Err(e) => {
                failures += 1;
                warn!("{:#}", e);
            }
        }
    }

    paths.sort();
    info!(exported = paths.len(), failed = failures, "Export finished");

    if failures > 0 {
        bail!("{} of {} exports failed", failures, failures + paths.len());
    }
    Ok(paths)
}
