//! Replacement resolution and splice planning
//!
//! Plans are computed against the unmodified file, keyed by original event
//! indices, and each affected track is then rebuilt once. No plan ever sees
//! indices shifted by another.

use crate::dictionary::WordDictionary;
use crate::hyphenate::Hyphenator;
use crate::reencode::{checked_delta, plan_replacement, SplicePlan};
use crate::smf::{Event, MidiFile};
use crate::word::Word;
use crate::{Error, Result};
use karmad_common::Filling;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

/// One word occurrence to be rewritten
#[derive(Debug, Clone, Copy)]
pub struct Replacement<'a> {
    pub word: &'a Word,
    pub new_text: &'a str,
}

/// Expand fillings into replacements, latest position first
///
/// Every occurrence of a filled key is replaced. A key the file does not
/// contain aborts with [`Error::UnknownWordKey`]; a repeated key keeps its
/// first filling.
pub fn resolve<'a>(
    dictionary: &WordDictionary<'a>,
    fillings: &'a [Filling],
) -> Result<Vec<Replacement<'a>>> {
    let mut seen = HashSet::new();
    let mut replacements = Vec::new();

    for filling in fillings {
        let key = filling.base_word_key.as_str();
        if !seen.insert(key) {
            tracing::warn!(key, "Duplicate filling ignored");
            continue;
        }

        let words = dictionary
            .get(key)
            .ok_or_else(|| Error::UnknownWordKey(key.to_string()))?;

        for &word in words {
            if word.is_empty() {
                return Err(Error::EmptyWordLookup {
                    track: word.track_index,
                    event: word.first_index(),
                });
            }
            replacements.push(Replacement {
                word,
                new_text: filling.replace_with.as_str(),
            });
        }
    }

    replacements.sort_by_key(|r| {
        Reverse((
            r.word.track_index,
            r.word.first_index(),
            r.word.sub_indices.first().copied().unwrap_or(0),
        ))
    });

    Ok(replacements)
}

/// Plan every replacement against the unmodified file
///
/// Plans come back ordered by track, then range start. Two plans claiming
/// the same original event are rejected; ranges may otherwise interleave,
/// as they do when a track carries the same lyrics in both conventions.
pub fn plan_all(
    midi: &MidiFile,
    replacements: &[Replacement<'_>],
    hyphenator: &dyn Hyphenator,
) -> Result<Vec<SplicePlan>> {
    let mut plans = Vec::with_capacity(replacements.len());
    let mut claimed = HashSet::new();

    for replacement in replacements {
        let word = replacement.word;
        let track = midi.tracks.get(word.track_index).ok_or_else(|| {
            Error::Midi(format!("word refers to missing track {}", word.track_index))
        })?;
        let plan = plan_replacement(track, word, replacement.new_text, hyphenator)?;

        for &event in &plan.owned {
            if !claimed.insert((plan.track_index, event)) {
                return Err(Error::OverlappingReplacement {
                    track: plan.track_index,
                    event,
                });
            }
        }
        plans.push(plan);
    }

    plans.sort_by_key(|p| (p.track_index, p.range.start));
    Ok(plans)
}

/// Rebuild every planned track in one pass over its original events
///
/// Replaced events are dropped. Every other event keeps its absolute onset,
/// and each plan's syllables are laid out from the onset preceding its range.
/// A syllable sounding at the same tick as a kept event from inside its
/// range goes first. Event times are rewritten to the resulting onsets.
pub fn apply_plans(midi: &mut MidiFile, plans: Vec<SplicePlan>) -> Result<()> {
    let mut by_track: BTreeMap<usize, Vec<SplicePlan>> = BTreeMap::new();
    for plan in plans {
        by_track.entry(plan.track_index).or_default().push(plan);
    }

    for (track_index, plans) in by_track {
        let track = midi.tracks.get_mut(track_index).ok_or_else(|| {
            Error::Midi(format!("plan refers to missing track {}", track_index))
        })?;
        let rebuilt = rebuild_track(&track.events, track_index, plans)?;
        tracing::trace!(
            track = track_index,
            before = track.events.len(),
            after = rebuilt.len(),
            "Rebuilt track"
        );
        track.events = rebuilt;
    }
    Ok(())
}

fn rebuild_track(
    events: &[Event],
    track_index: usize,
    plans: Vec<SplicePlan>,
) -> Result<Vec<Event>> {
    let onsets: Vec<u64> = events
        .iter()
        .scan(0u64, |time, e| {
            *time += u64::from(e.delta);
            Some(*time)
        })
        .collect();

    let mut replaced = vec![false; events.len()];
    // (onset, anchor index, rank, event); rank 0 sorts syllables first
    let mut timeline: Vec<(u64, usize, u8, Event)> = Vec::with_capacity(events.len());

    for plan in plans {
        if plan.range.is_empty() || plan.range.end > events.len() {
            return Err(Error::Midi(format!(
                "plan range {:?} exceeds track {} length {}",
                plan.range,
                track_index,
                events.len()
            )));
        }
        for &event in &plan.owned {
            if !plan.range.contains(&event) {
                return Err(Error::Midi(format!(
                    "plan for track {} owns event {} outside {:?}",
                    track_index, event, plan.range
                )));
            }
            if std::mem::replace(&mut replaced[event], true) {
                return Err(Error::OverlappingReplacement {
                    track: track_index,
                    event,
                });
            }
        }

        let start = plan.range.start;
        let mut onset = onsets[start] - u64::from(events[start].delta);
        for syllable in plan.events {
            onset += u64::from(syllable.delta);
            timeline.push((onset, start, 0, syllable));
        }
    }

    let kept = replaced.iter().filter(|r| !**r).count();
    tracing::trace!(track = track_index, kept, "Merging syllables with kept events");
    for (index, event) in events.iter().enumerate() {
        if !replaced[index] {
            timeline.push((onsets[index], index, 1, event.clone()));
        }
    }
    timeline.sort_by_key(|(onset, anchor, rank, _)| (*onset, *anchor, *rank));

    let mut previous = 0u64;
    let mut rebuilt = Vec::with_capacity(timeline.len());
    for (onset, _, _, mut event) in timeline {
        event.delta = checked_delta(onset - previous)?;
        event.time = onset;
        previous = onset;
        rebuilt.push(event);
    }
    Ok(rebuilt)
}
