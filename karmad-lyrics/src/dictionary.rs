//! Word dictionary and line grouping

use crate::word::Word;
use std::collections::HashMap;

/// Words grouped by attribute key, keys in first-seen order
///
/// Words with an empty key (no letters) are left out. Built per call from a
/// segmentation; never persisted.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary<'w> {
    entries: Vec<(String, Vec<&'w Word>)>,
    index: HashMap<String, usize>,
}

impl<'w> WordDictionary<'w> {
    pub fn build(words: &'w [Word]) -> Self {
        let mut dict = Self::default();
        for word in words.iter().filter(|w| !w.attr_key.is_empty()) {
            match dict.index.get(&word.attr_key) {
                Some(&slot) => dict.entries[slot].1.push(word),
                None => {
                    dict.index.insert(word.attr_key.clone(), dict.entries.len());
                    dict.entries.push((word.attr_key.clone(), vec![word]));
                }
            }
        }
        dict
    }

    /// Every occurrence of `key`, in file order
    pub fn get(&self, key: &str) -> Option<&[&'w Word]> {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'w Word])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Lazy grouping of words into display lines
///
/// A line ends before a segmented-text word opening with `/` or `\`, and
/// after a line-lyric word that ends with a line break. The last line is
/// always produced, so an empty word list yields one empty line.
#[derive(Debug, Clone)]
pub struct Lines<'w> {
    words: &'w [Word],
    pos: usize,
    done: bool,
}

impl<'w> Iterator for Lines<'w> {
    type Item = Vec<&'w Word>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        while let Some(word) = self.words.get(self.pos) {
            if word.starts_line() && !line.is_empty() {
                return Some(line);
            }
            line.push(word);
            self.pos += 1;
            if word.is_line_terminator {
                return Some(line);
            }
        }

        self.done = true;
        Some(line)
    }
}

impl std::iter::FusedIterator for Lines<'_> {}

/// Group words into lines
pub fn lines(words: &[Word]) -> Lines<'_> {
    Lines {
        words,
        pos: 0,
        done: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{META_LYRIC, META_TEXT};
    use crate::segment::segment;
    use crate::smf::{Event, MidiFile, Track};

    fn words_from(meta_type: u8, texts: &[&str]) -> Vec<Word> {
        let events = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Event::meta(meta_type, t.as_bytes(), 10, 10 * (i as u64 + 1)))
            .collect();
        let midi = MidiFile {
            format: 0,
            division: 96,
            tracks: vec![Track { events }],
        };
        segment(&midi).unwrap().words
    }

    fn keys(line: &[&Word]) -> Vec<String> {
        line.iter().map(|w| w.attr_key.clone()).collect()
    }

    #[test]
    fn test_dictionary_groups_in_first_seen_order() {
        let words = words_from(META_TEXT, &["Row", " row", " your", " boat", " ..."]);
        let dict = WordDictionary::build(&words);

        let order: Vec<&str> = dict.iter().map(|(key, _)| key).collect();
        assert_eq!(order, vec!["row", "your", "boat"]);
        assert_eq!(dict.get("row").unwrap().len(), 2);
        assert_eq!(dict.get("row").unwrap()[1].core_word, "row");
        assert!(dict.get("").is_none());
        assert!(dict.get("stream").is_none());
    }

    #[test]
    fn test_segmented_lines() {
        let words = words_from(META_TEXT, &["\\Twin", "kle", " star", "/How", " I", "/Won", "der"]);
        let lines: Vec<_> = lines(&words).collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(keys(&lines[0]), vec!["twinkle", "star"]);
        assert_eq!(keys(&lines[1]), vec!["how", "i"]);
        assert_eq!(keys(&lines[2]), vec!["wonder"]);
    }

    #[test]
    fn test_line_lyric_terminators_close_lines() {
        let words = words_from(META_LYRIC, &["Ama", "zing ", "grace\r", "how ", "sweet"]);
        let lines: Vec<_> = lines(&words).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(keys(&lines[0]), vec!["amazing", "grace"]);
        assert_eq!(keys(&lines[1]), vec!["how", "sweet"]);
    }

    #[test]
    fn test_final_line_always_emitted() {
        let empty: Vec<Word> = Vec::new();
        let lines_of_nothing: Vec<_> = lines(&empty).collect();
        assert_eq!(lines_of_nothing, vec![Vec::<&Word>::new()]);

        let words = words_from(META_LYRIC, &["end\r"]);
        let all: Vec<_> = lines(&words).collect();
        assert_eq!(all.len(), 2);
        assert!(all[1].is_empty());
    }

    #[test]
    fn test_lines_restartable() {
        let words = words_from(META_TEXT, &["/One", " two", "/Three"]);
        let iter = lines(&words);
        let first: Vec<_> = iter.clone().map(|l| keys(&l)).collect();
        let second: Vec<_> = iter.map(|l| keys(&l)).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
