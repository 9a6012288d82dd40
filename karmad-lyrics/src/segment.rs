//! Word segmentation
//!
//! Groups the classified lyric events of each track into [`Word`]s.
//!
//! **Segmented text:** each event's text is split on spaces; every fragment
//! after the first keeps its space in front. A fragment starting with a
//! space, `/` or `\` begins a new word; any other fragment continues the word
//! being built, possibly across events.
//!
//! **Line lyrics:** event texts (leading spaces stripped) accumulate until an
//! event ends with a space or a line break, or is a lone carriage return.
//!
//! Accumulation never crosses a track boundary.

use crate::attr::attr_key;
use crate::meta::{classify, Classified, Convention, KarTags};
use crate::smf::{Event, MidiFile};
use crate::word::{is_control_char, split_affixes, KarCommand, Word};
use crate::Result;

/// Words of a whole file plus its karaoke tags
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Words in track order, each track in completion order
    pub words: Vec<Word>,
    pub tags: KarTags,
}

/// Segment every track of a parsed file
pub fn segment(midi: &MidiFile) -> Result<Segmentation> {
    let mut segmentation = Segmentation::default();

    for (track_index, track) in midi.tracks.iter().enumerate() {
        let mut text_word: Option<WordBuilder> = None;
        let mut lyric_word: Option<WordBuilder> = None;

        for (event_index, event) in track.events.iter().enumerate() {
            match classify(event, track_index, event_index)? {
                Classified::Ignored => {}
                Classified::Tag(tag) => segmentation.tags.push(tag),
                Classified::Lyric {
                    convention: Convention::SegmentedText,
                    text,
                    ..
                } => {
                    for (sub_index, fragment) in split_fragments(text).into_iter().enumerate() {
                        if let Some(builder) = text_word.as_mut() {
                            if !starts_new_word(&fragment) {
                                builder.push(event_index, sub_index, event, fragment);
                                continue;
                            }
                        }

                        if let Some(done) = text_word.take() {
                            segmentation.words.push(done.finish(false));
                        }
                        let mut builder = WordBuilder::new(Convention::SegmentedText, track_index);
                        builder.push(event_index, sub_index, event, fragment);
                        text_word = Some(builder);
                    }
                }
                Classified::Lyric {
                    convention: Convention::LineLyric,
                    text,
                    raw,
                } => {
                    let builder = lyric_word.get_or_insert_with(|| {
                        WordBuilder::new(Convention::LineLyric, track_index)
                    });
                    builder.push(event_index, 0, event, text.to_string());

                    let line_break = raw == [0x0D] || text.ends_with(['\r', '\n']);
                    if line_break || text.ends_with(' ') {
                        if let Some(done) = lyric_word.take() {
                            segmentation.words.push(done.finish(line_break));
                        }
                    }
                }
            }
        }

        // Words still open at the end of the track, earliest first
        let mut leftovers: Vec<WordBuilder> = text_word.into_iter().chain(lyric_word).collect();
        leftovers.sort_by_key(|b| b.event_indices.first().copied());
        segmentation
            .words
            .extend(leftovers.into_iter().map(|b| b.finish(false)));
    }

    tracing::debug!(
        words = segmentation.words.len(),
        keyed = segmentation.words.iter().filter(|w| !w.attr_key.is_empty()).count(),
        "Segmented lyrics"
    );

    Ok(segmentation)
}

/// Split segmented text into fragments, re-attaching each separating space
pub fn split_fragments(text: &str) -> Vec<String> {
    let mut parts = text.split(' ');
    let mut fragments = Vec::new();

    if let Some(first) = parts.next() {
        // A leading space would otherwise produce an empty first fragment
        if !text.starts_with(' ') {
            fragments.push(first.to_string());
        }
    }
    fragments.extend(parts.map(|p| format!(" {}", p)));
    fragments
}

fn starts_new_word(fragment: &str) -> bool {
    fragment.chars().next().is_some_and(is_control_char)
}

struct WordBuilder {
    convention: Convention,
    track_index: usize,
    event_indices: Vec<usize>,
    sub_indices: Vec<usize>,
    source_events: Vec<Event>,
    texts: Vec<String>,
}

impl WordBuilder {
    fn new(convention: Convention, track_index: usize) -> Self {
        Self {
            convention,
            track_index,
            event_indices: Vec::new(),
            sub_indices: Vec::new(),
            source_events: Vec::new(),
            texts: Vec::new(),
        }
    }

    fn push(&mut self, event_index: usize, sub_index: usize, event: &Event, text: String) {
        self.event_indices.push(event_index);
        self.sub_indices.push(sub_index);
        self.source_events.push(event.clone());
        self.texts.push(text);
    }

    fn finish(self, is_line_terminator: bool) -> Word {
        let (command, cleaned) = match self.convention {
            Convention::SegmentedText => {
                let command =
                    KarCommand::from_char(self.texts.first().and_then(|t| t.chars().next()));
                let cleaned: String = self
                    .texts
                    .concat()
                    .chars()
                    .filter(|&c| !is_control_char(c))
                    .collect();
                (command, cleaned)
            }
            Convention::LineLyric => {
                let joined: String = self
                    .texts
                    .iter()
                    .map(|t| t.trim_start_matches(' '))
                    .collect();
                (KarCommand::None, joined.trim().to_string())
            }
        };

        let affixes = split_affixes(&cleaned);
        let word = Word {
            convention: self.convention,
            track_index: self.track_index,
            event_indices: self.event_indices,
            sub_indices: self.sub_indices,
            source_events: self.source_events,
            texts: self.texts,
            command,
            attr_key: attr_key(&affixes.core_word),
            leading_quote: affixes.leading_quote,
            core_word: affixes.core_word,
            trailing_punctuation: affixes.trailing_punctuation,
            is_line_terminator,
        };

        tracing::trace!(
            track = word.track_index,
            first_event = word.first_index(),
            key = %word.attr_key,
            "Finished word"
        );

        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{META_LYRIC, META_TEXT};
    use crate::smf::{Event, EventKind, Track};

    fn midi(tracks: Vec<Vec<Event>>) -> MidiFile {
        MidiFile {
            format: 1,
            division: 480,
            tracks: tracks.into_iter().map(|events| Track { events }).collect(),
        }
    }

    fn events(meta_type: u8, texts: &[&str]) -> Vec<Event> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Event::meta(meta_type, t.as_bytes(), 10, 10 * (i as u64 + 1)))
            .collect()
    }

    fn cores(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.core_word.as_str()).collect()
    }

    #[test]
    fn test_split_fragments() {
        assert_eq!(split_fragments("Hello"), vec!["Hello"]);
        assert_eq!(split_fragments(" World"), vec![" World"]);
        assert_eq!(split_fragments("lo World"), vec!["lo", " World"]);
        assert_eq!(split_fragments("Hello "), vec!["Hello", " "]);
        assert_eq!(split_fragments("/Line one"), vec!["/Line", " one"]);
    }

    #[test]
    fn test_hello_world_segmented() {
        let seg = segment(&midi(vec![events(META_TEXT, &["Hello", " World"])])).unwrap();

        assert_eq!(cores(&seg.words), vec!["Hello", "World"]);
        assert_eq!(seg.words[0].attr_key, "hello");
        assert_eq!(seg.words[1].attr_key, "world");
        assert_eq!(seg.words[0].command, KarCommand::Unknown);
        assert_eq!(seg.words[1].command, KarCommand::NewWord);
    }

    #[test]
    fn test_syllables_continue_across_events() {
        let seg = segment(&midi(vec![events(
            META_TEXT,
            &["\\A", "ma", "zing", " grace,", "/how", " sweet"],
        )]))
        .unwrap();

        assert_eq!(cores(&seg.words), vec!["Amazing", "grace", "how", "sweet"]);
        assert_eq!(seg.words[0].event_indices, vec![0, 1, 2]);
        assert_eq!(seg.words[0].command, KarCommand::ClearScreen);
        assert_eq!(seg.words[1].trailing_punctuation, ",");
        assert_eq!(seg.words[2].command, KarCommand::NewLine);
        assert!(seg.words[2].starts_line());
    }

    #[test]
    fn test_multi_word_event_sub_indices() {
        let seg = segment(&midi(vec![events(META_TEXT, &["Hel", "lo World"])])).unwrap();

        assert_eq!(cores(&seg.words), vec!["Hello", "World"]);
        assert_eq!(seg.words[0].event_indices, vec![0, 1]);
        assert_eq!(seg.words[0].sub_indices, vec![0, 0]);
        assert_eq!(seg.words[1].event_indices, vec![1]);
        assert_eq!(seg.words[1].sub_indices, vec![1]);
    }

    #[test]
    fn test_trailing_space_style() {
        let seg = segment(&midi(vec![events(META_TEXT, &["Hello ", "World"])])).unwrap();

        assert_eq!(cores(&seg.words), vec!["Hello", "World"]);
        assert_eq!(seg.words[1].event_indices, vec![0, 1]);
        assert_eq!(seg.words[1].texts, vec![" ", "World"]);
    }

    #[test]
    fn test_tags_are_not_words() {
        let seg = segment(&midi(vec![events(META_TEXT, &["@KMIDI KARAOKE FILE", "@TSong", "Hi"])]))
            .unwrap();

        assert_eq!(cores(&seg.words), vec!["Hi"]);
        assert_eq!(seg.tags.file_type.as_deref(), Some("MIDI KARAOKE FILE"));
        assert_eq!(seg.tags.title_lines, vec!["Song"]);
    }

    #[test]
    fn test_punctuation_only_word_has_empty_key() {
        let seg = segment(&midi(vec![events(META_TEXT, &["Oh", " ...", " yes"])])).unwrap();

        assert_eq!(seg.words.len(), 3);
        assert_eq!(seg.words[1].core_word, "");
        assert_eq!(seg.words[1].attr_key, "");
        assert_eq!(seg.words[1].trailing_punctuation, "...");
    }

    #[test]
    fn test_line_lyric_words() {
        let seg = segment(&midi(vec![events(META_LYRIC, &["Ama", "zing ", "grace\r"])])).unwrap();

        assert_eq!(cores(&seg.words), vec!["Amazing", "grace"]);
        assert_eq!(seg.words[0].event_indices, vec![0, 1]);
        assert!(!seg.words[0].is_line_terminator);
        assert!(seg.words[1].is_line_terminator);
        assert_eq!(seg.words[1].command, KarCommand::None);
    }

    #[test]
    fn test_line_lyric_leading_space_and_lone_carriage_return() {
        let seg =
            segment(&midi(vec![events(META_LYRIC, &[" how", " sweet ", "the", "\r"])])).unwrap();

        assert_eq!(cores(&seg.words), vec!["howsweet", "the"]);
        assert!(seg.words[1].is_line_terminator);
        assert_eq!(seg.words[1].event_indices, vec![2, 3]);
    }

    #[test]
    fn test_words_do_not_cross_tracks() {
        let seg = segment(&midi(vec![
            events(META_TEXT, &["Hel"]),
            events(META_TEXT, &["lo"]),
        ]))
        .unwrap();

        assert_eq!(cores(&seg.words), vec!["Hel", "lo"]);
        assert_eq!(seg.words[1].track_index, 1);
    }

    #[test]
    fn test_non_lyric_events_are_skipped() {
        let mut track = events(META_TEXT, &["Hel", "lo"]);
        track.insert(
            1,
            Event {
                kind: EventKind::Channel(0x90),
                delta: 5,
                time: 15,
                payload: vec![0x90, 60, 100],
            },
        );
        let seg = segment(&midi(vec![track])).unwrap();

        assert_eq!(cores(&seg.words), vec!["Hello"]);
        assert_eq!(seg.words[0].event_indices, vec![0, 2]);
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let file = midi(vec![events(META_TEXT, &["Hello", " World", "/Good", "bye"])]);
        let keys = || -> Vec<String> {
            segment(&file)
                .unwrap()
                .words
                .into_iter()
                .map(|w| w.attr_key)
                .collect()
        };
        assert_eq!(keys(), keys());
    }
}
