//! Syllable splitting
//!
//! Replacement text is sung over the ticks of the word it replaces, one
//! lyric event per syllable. Anything that can split text into syllables
//! works as a [`Hyphenator`]; plain closures included, which keeps tests
//! independent of the hyphenation dictionary.

use crate::{Error, Result};
use hyphenation::{Hyphenator as _, Language, Load, Standard};

/// Splits text into syllables
///
/// Concatenating the output must give back the input with runs of spaces
/// collapsed. Every word after the first starts its first syllable with a
/// single space.
pub trait Hyphenator {
    fn hyphenate(&self, text: &str) -> Vec<String>;
}

impl<F> Hyphenator for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn hyphenate(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Dictionary-based hyphenator (Knuth-Liang patterns)
pub struct StandardHyphenator {
    dictionary: Standard,
}

impl StandardHyphenator {
    /// US English patterns embedded in the binary
    pub fn english() -> Result<Self> {
        let dictionary = Standard::from_embedded(Language::EnglishUS)
            .map_err(|e| Error::Hyphenation(e.to_string()))?;
        Ok(Self { dictionary })
    }
}

impl Hyphenator for StandardHyphenator {
    fn hyphenate(&self, text: &str) -> Vec<String> {
        let mut syllables = Vec::new();

        for (n, word) in text.split(' ').filter(|w| !w.is_empty()).enumerate() {
            let breaks = self.dictionary.hyphenate(word).breaks;
            let mut start = 0;
            for end in breaks.into_iter().chain(std::iter::once(word.len())) {
                if end <= start {
                    continue;
                }
                let piece = &word[start..end];
                if n > 0 && start == 0 {
                    syllables.push(format!(" {}", piece));
                } else {
                    syllables.push(piece.to_string());
                }
                start = end;
            }
        }

        syllables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_hyphenator() {
        let by_dash = |text: &str| text.split('-').map(String::from).collect::<Vec<_>>();
        assert_eq!(by_dash.hyphenate("a-ma-zing"), vec!["a", "ma", "zing"]);
    }

    #[test]
    fn test_standard_keeps_text() {
        let h = StandardHyphenator::english().unwrap();
        let syllables = h.hyphenate("wonderful");

        assert!(!syllables.is_empty());
        assert_eq!(syllables.concat(), "wonderful");
    }

    #[test]
    fn test_standard_multiple_words() {
        let h = StandardHyphenator::english().unwrap();
        let syllables = h.hyphenate("big  yellow dog");

        assert_eq!(syllables.concat(), "big yellow dog");
        assert_eq!(syllables[0], "big");
        assert!(syllables.iter().filter(|s| s.starts_with(' ')).count() == 2);
    }

    #[test]
    fn test_standard_empty_text() {
        let h = StandardHyphenator::english().unwrap();
        assert!(h.hyphenate("").is_empty());
        assert!(h.hyphenate("   ").is_empty());
    }
}
