//! Syllable re-encoding
//!
//! Turns replacement text into lyric events that occupy exactly the ticks of
//! the word they replace:
//!
//! 1. The word's duration is the sum of the deltas over its event range.
//! 2. The text is hyphenated; no syllables means one empty syllable.
//! 3. Each syllable gets `total / n` ticks, the first `total % n` one more.
//! 4. Segmented-text words keep their command character in front of the
//!    first syllable; line-lyric words keep their boundary (space or line
//!    break) after the last one.
//! 5. Each syllable becomes a meta event of the word's convention.
//!
//! [`plan_replacement`] produces the syllables and the original events they
//! stand in for; [`crate::resolve::apply_plans`] merges them into the track.

use crate::hyphenate::Hyphenator;
use crate::meta::Convention;
use crate::segment::split_fragments;
use crate::smf::{Event, Track, MAX_VLQ};
use crate::word::{is_control_char, Word};
use crate::{Error, Result};
use std::ops::Range;

/// Longest syllable, in UTF-8 bytes, a one-byte length field can describe
pub const MAX_SYLLABLE_BYTES: usize = 127;

/// Split `total` ticks over `count` events, remainder to the earliest
pub fn distribute_deltas(total: u64, count: usize) -> Vec<u64> {
    let n = count.max(1) as u64;
    let share = total / n;
    let extra = total % n;
    (0..n).map(|i| share + u64::from(i < extra)).collect()
}

/// Encode one syllable as a lyric meta event
pub fn encode_syllable(convention: Convention, text: &str, delta: u64, time: u64) -> Result<Event> {
    if text.len() > MAX_SYLLABLE_BYTES {
        return Err(Error::SyllableEncodingOverflow {
            syllable: text.to_string(),
            len: text.len(),
        });
    }
    let delta = checked_delta(delta)?;
    Ok(Event::meta(convention.meta_type(), text.as_bytes(), delta, time))
}

/// New syllables for one word, planned against the unmodified track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplicePlan {
    pub track_index: usize,
    /// Span of original events whose ticks the syllables share
    pub range: Range<usize>,
    /// Original events the syllables replace, ascending
    pub owned: Vec<usize>,
    /// Syllables; deltas sum to the ticks of `range`
    pub events: Vec<Event>,
}

/// Plan the replacement of `word` inside `track`
///
/// A segmented-text event shared with another word stays untouched when this
/// word only contributes its boundary marker to it; boundary-only fragments
/// of other words are carried into the new syllables; any other sharing is
/// an error. Events inside the range that the word does not own are not
/// part of the plan and keep their onsets.
///
/// Syllable `i` gets `time = start_time + sum(delta[0..i))`, where
/// `start_time` is the time of the word's first replaced event.
pub fn plan_replacement(
    track: &Track,
    word: &Word,
    new_text: &str,
    hyphenator: &dyn Hyphenator,
) -> Result<SplicePlan> {
    let (Some(&first), Some(&last)) = (word.event_indices.first(), word.event_indices.last())
    else {
        return Err(Error::EmptyWordLookup {
            track: word.track_index,
            event: 0,
        });
    };
    if last >= track.len() {
        return Err(Error::Midi(format!(
            "word refers to event {} but track {} has {} events",
            last,
            word.track_index,
            track.len()
        )));
    }

    let (start, prefix, suffix) = match word.convention {
        Convention::SegmentedText => segmented_framing(track, word)?,
        Convention::LineLyric => (first, String::new(), line_boundary(word)),
    };

    let range = start..last + 1;
    let total: u64 = track.events[range.clone()]
        .iter()
        .map(|e| u64::from(e.delta))
        .sum();
    let owned: Vec<usize> = word
        .event_indices
        .iter()
        .copied()
        .filter(|&i| i >= start)
        .collect();
    let start_time = owned
        .first()
        .map(|&i| track.events[i].time)
        .unwrap_or(track.events[start].time);

    let syllables = frame(hyphenator.hyphenate(new_text), word.convention, &prefix, &suffix);
    let events = build_events(word.convention, &syllables, total, start_time)?;

    Ok(SplicePlan {
        track_index: word.track_index,
        range,
        owned,
        events,
    })
}

/// Range start plus text to add before the first and after the last syllable
fn segmented_framing(track: &Track, word: &Word) -> Result<(usize, String, String)> {
    let first = word.first_index();
    let last = word.last_index();
    let own_first = word.sub_indices.first().copied().unwrap_or(0);
    let own_last = word.sub_indices.last().copied().unwrap_or(0);

    let first_fragments = fragments_at(track, word.track_index, first)?;
    let own_fragment = first_fragments
        .get(own_first)
        .map(String::as_str)
        .unwrap_or("");

    let mut start = first;
    let mut prefix = String::new();
    if is_blank(own_fragment) && word.event_indices.len() > 1 {
        // The event keeps serving the previous word and already carries our marker
        start = first + 1;
    } else {
        let before = &first_fragments[..own_first.min(first_fragments.len())];
        prefix.push_str(&carry(before, word.track_index, first)?);
        prefix.push_str(&command_prefix(word));
    }

    let last_fragments = if last == first {
        first_fragments
    } else {
        fragments_at(track, word.track_index, last)?
    };
    let after = last_fragments.get(own_last + 1..).unwrap_or(&[]);
    let suffix = carry(after, word.track_index, last)?;

    Ok((start, prefix, suffix))
}

fn fragments_at(track: &Track, track_index: usize, index: usize) -> Result<Vec<String>> {
    let text = std::str::from_utf8(track.events[index].data()).map_err(|source| {
        Error::Decode {
            track: track_index,
            event: index,
            source,
        }
    })?;
    Ok(split_fragments(text))
}

fn is_blank(fragment: &str) -> bool {
    fragment.chars().all(is_control_char)
}

/// Concatenate other words' fragments if they hold only boundary markers
fn carry(fragments: &[String], track: usize, event: usize) -> Result<String> {
    if fragments.iter().all(|f| is_blank(f)) {
        Ok(fragments.concat())
    } else {
        Err(Error::SharedEvent { track, event })
    }
}

fn command_prefix(word: &Word) -> String {
    word.command.as_char().map(String::from).unwrap_or_default()
}

/// Trailing line break of a terminator word, otherwise a space
fn line_boundary(word: &Word) -> String {
    let last = word.texts.last().map(String::as_str).unwrap_or("");
    let kept = last.trim_end_matches(['\r', '\n']);
    if word.is_line_terminator && kept.len() < last.len() {
        last[kept.len()..].to_string()
    } else {
        " ".to_string()
    }
}

/// Attach the word's prefix and suffix to its syllables
///
/// Line-lyric words end on a trailing space, so the space that opens each
/// later word of a multi-word replacement moves to the end of the syllable
/// before it.
fn frame(
    mut syllables: Vec<String>,
    convention: Convention,
    prefix: &str,
    suffix: &str,
) -> Vec<String> {
    if syllables.is_empty() {
        syllables.push(String::new());
    }
    if convention == Convention::LineLyric {
        for i in 1..syllables.len() {
            if let Some(rest) = syllables[i].strip_prefix(' ') {
                let rest = rest.to_string();
                syllables[i] = rest;
                syllables[i - 1].push(' ');
            }
        }
    }
    syllables[0].insert_str(0, prefix);
    if let Some(last) = syllables.last_mut() {
        last.push_str(suffix);
    }
    syllables
}

fn build_events(
    convention: Convention,
    syllables: &[String],
    total: u64,
    start_time: u64,
) -> Result<Vec<Event>> {
    let deltas = distribute_deltas(total, syllables.len());
    let mut time = start_time;
    let mut events = Vec::with_capacity(syllables.len());
    for (text, delta) in syllables.iter().zip(deltas) {
        events.push(encode_syllable(convention, text, delta, time)?);
        time += delta;
    }
    Ok(events)
}

/// Delta that fits a 28-bit variable-length quantity
pub(crate) fn checked_delta(delta: u64) -> Result<u32> {
    u32::try_from(delta)
        .ok()
        .filter(|&d| d <= MAX_VLQ)
        .ok_or(Error::DeltaOverflow(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{META_LYRIC, META_TEXT};
    use crate::segment::segment;
    use crate::smf::{EventKind, MidiFile};

    fn by_dash(text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        text.split('-').map(String::from).collect()
    }

    fn track_of(meta_type: u8, items: &[(&str, u32)]) -> Track {
        let mut time = 0;
        let events = items
            .iter()
            .map(|&(text, delta)| {
                time += u64::from(delta);
                Event::meta(meta_type, text.as_bytes(), delta, time)
            })
            .collect();
        Track { events }
    }

    fn words_of(track: &Track) -> Vec<Word> {
        let midi = MidiFile {
            format: 1,
            division: 480,
            tracks: vec![track.clone()],
        };
        segment(&midi).unwrap().words
    }

    fn texts(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|e| String::from_utf8(e.data().to_vec()).unwrap())
            .collect()
    }

    fn deltas(events: &[Event]) -> Vec<u32> {
        events.iter().map(|e| e.delta).collect()
    }

    #[test]
    fn test_distribute_front_loads_remainder() {
        assert_eq!(distribute_deltas(10, 3), vec![4, 3, 3]);
        assert_eq!(distribute_deltas(11, 3), vec![4, 4, 3]);
        assert_eq!(distribute_deltas(9, 3), vec![3, 3, 3]);
        assert_eq!(distribute_deltas(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(distribute_deltas(7, 0), vec![7]);
    }

    #[test]
    fn test_distribute_preserves_total() {
        for total in [0u64, 1, 5, 97, 480, 1_000_003] {
            for count in 1..9 {
                let parts = distribute_deltas(total, count);
                assert_eq!(parts.len(), count);
                assert_eq!(parts.iter().sum::<u64>(), total);
            }
        }
    }

    #[test]
    fn test_encode_wire_format() {
        let event = encode_syllable(Convention::LineLyric, "la ", 12, 40).unwrap();
        assert_eq!(event.payload, vec![0xFF, META_LYRIC, 3, b'l', b'a', b' ']);
        assert_eq!(event.delta, 12);
        assert_eq!(event.time, 40);
    }

    #[test]
    fn test_encode_overflow_fails() {
        let long = "a".repeat(128);
        assert!(matches!(
            encode_syllable(Convention::SegmentedText, &long, 0, 0),
            Err(Error::SyllableEncodingOverflow { len: 128, .. })
        ));
        assert!(encode_syllable(Convention::SegmentedText, &"a".repeat(127), 0, 0).is_ok());
        assert!(matches!(
            encode_syllable(Convention::SegmentedText, "a", u64::from(MAX_VLQ) + 1, 0),
            Err(Error::DeltaOverflow(_))
        ));
    }

    #[test]
    fn test_wonderful_over_ten_ticks() {
        let track = track_of(META_TEXT, &[("/Great", 10)]);
        let words = words_of(&track);
        let plan = plan_replacement(&track, &words[0], "won-der-ful", &by_dash).unwrap();

        assert_eq!(plan.range, 0..1);
        assert_eq!(plan.owned, vec![0]);
        assert_eq!(deltas(&plan.events), vec![4, 3, 3]);
        assert_eq!(texts(&plan.events), vec!["/won", "der", "ful"]);
        assert_eq!(
            plan.events.iter().map(|e| e.time).collect::<Vec<_>>(),
            vec![10, 14, 17]
        );
        assert!(plan.events.iter().all(|e| e.kind == EventKind::Meta(META_TEXT)));
    }

    #[test]
    fn test_unknown_command_not_written() {
        let track = track_of(META_TEXT, &[("Hello", 6)]);
        let words = words_of(&track);
        let plan = plan_replacement(&track, &words[0], "Hi", &by_dash).unwrap();
        assert_eq!(texts(&plan.events), vec!["Hi"]);
    }

    #[test]
    fn test_line_lyric_boundaries() {
        let track = track_of(META_LYRIC, &[("Ama", 5), ("zing ", 5), ("grace\r", 8)]);
        let words = words_of(&track);

        let first = plan_replacement(&track, &words[0], "su-per", &by_dash).unwrap();
        assert_eq!(first.range, 0..2);
        assert_eq!(texts(&first.events), vec!["su", "per "]);
        assert_eq!(deltas(&first.events), vec![5, 5]);

        let second = plan_replacement(&track, &words[1], "love", &by_dash).unwrap();
        assert_eq!(texts(&second.events), vec!["love\r"]);
        assert_eq!(second.events[0].meta_type(), Some(META_LYRIC));
    }

    #[test]
    fn test_line_lyric_multi_word_replacement_ends_words_on_spaces() {
        let track = track_of(META_LYRIC, &[("how ", 4), ("sweet ", 6)]);
        let words = words_of(&track);

        // Hyphenators open every later word with a space: "big", " dog"
        let plan = plan_replacement(&track, &words[1], "big- dog", &by_dash).unwrap();
        assert_eq!(texts(&plan.events), vec!["big ", "dog "]);
    }

    #[test]
    fn test_segmented_multi_word_replacement_keeps_leading_spaces() {
        let track = track_of(META_TEXT, &[("/how", 4), (" sweet", 6)]);
        let words = words_of(&track);

        let plan = plan_replacement(&track, &words[1], "big- dog", &by_dash).unwrap();
        assert_eq!(texts(&plan.events), vec![" big", " dog"]);
    }

    #[test]
    fn test_empty_replacement_yields_one_event() {
        let track = track_of(META_TEXT, &[(" big", 7)]);
        let words = words_of(&track);
        let plan = plan_replacement(&track, &words[0], "", &by_dash).unwrap();

        assert_eq!(texts(&plan.events), vec![" "]);
        assert_eq!(deltas(&plan.events), vec![7]);
    }

    #[test]
    fn test_plan_plain_word() {
        let track = track_of(META_TEXT, &[("Hel", 3), ("lo", 3), (" World", 4)]);
        let words = words_of(&track);
        let plan = plan_replacement(&track, &words[0], "Hi", &by_dash).unwrap();

        assert_eq!(plan.range, 0..2);
        assert_eq!(plan.owned, vec![0, 1]);
        assert_eq!(texts(&plan.events), vec!["Hi"]);
        assert_eq!(deltas(&plan.events), vec![6]);
    }

    #[test]
    fn test_plan_trailing_space_style_keeps_shared_event() {
        let track = track_of(META_TEXT, &[("Hello ", 3), ("World", 4)]);
        let words = words_of(&track);

        let hello = plan_replacement(&track, &words[0], "Bye", &by_dash).unwrap();
        assert_eq!(hello.range, 0..1);
        assert_eq!(texts(&hello.events), vec!["Bye "]);

        // Only the ticks of the event that is actually replaced are shared out
        let world = plan_replacement(&track, &words[1], "Moon-light", &by_dash).unwrap();
        assert_eq!(world.range, 1..2);
        assert_eq!(world.owned, vec![1]);
        assert_eq!(texts(&world.events), vec!["Moon", "light"]);
        assert_eq!(deltas(&world.events), vec![2, 2]);
    }

    #[test]
    fn test_plan_shared_lyric_event_rejected() {
        let track = track_of(META_TEXT, &[("Hello World", 3)]);
        let words = words_of(&track);

        assert!(matches!(
            plan_replacement(&track, &words[0], "Hi", &by_dash),
            Err(Error::SharedEvent { track: 0, event: 0 })
        ));
        assert!(matches!(
            plan_replacement(&track, &words[1], "Moon", &by_dash),
            Err(Error::SharedEvent { track: 0, event: 0 })
        ));
    }

    #[test]
    fn test_plan_leaves_foreign_events_out() {
        let mut track = track_of(META_TEXT, &[("/Ama", 10), ("zing", 10)]);
        track.events.insert(
            1,
            Event {
                kind: EventKind::Channel(0x90),
                delta: 2,
                time: 12,
                payload: vec![0x90, 64, 90],
            },
        );
        track.events[2].delta = 8;
        let words = words_of(&track);

        let plan = plan_replacement(&track, &words[0], "won-der-ful", &by_dash).unwrap();
        assert_eq!(plan.range, 0..3);
        assert_eq!(plan.owned, vec![0, 2]);
        assert_eq!(deltas(&plan.events), vec![7, 7, 6]);
    }

    #[test]
    fn test_plan_line_lyric_terminator() {
        let track = track_of(META_LYRIC, &[("how ", 4), ("sweet\r", 6)]);
        let words = words_of(&track);
        let plan = plan_replacement(&track, &words[1], "lou-sy", &by_dash).unwrap();

        assert_eq!(plan.range, 1..2);
        assert_eq!(texts(&plan.events), vec!["lou", "sy\r"]);
        assert_eq!(deltas(&plan.events), vec![3, 3]);
    }
}
