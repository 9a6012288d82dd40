//! Attribute keys
//!
//! A word's key is its core word lowercased with every character outside
//! `[0-9a-zA-Z_-]` replaced by `_`. Words differing only in case or in
//! characters outside that set share a key, which is what madlib grouping
//! wants: "Grace" and "grace" are the same blank.

/// Canonical lookup key for a core word
pub fn attr_key(core_word: &str) -> String {
    core_word
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(attr_key("Hello"), "hello");
        assert_eq!(attr_key("WORLD"), "world");
    }

    #[test]
    fn test_maps_disallowed_characters() {
        assert_eq!(attr_key("don't"), "don_t");
        assert_eq!(attr_key("café"), "caf_");
        assert_eq!(attr_key("x-ray_9"), "x-ray_9");
    }

    #[test]
    fn test_empty_core_gives_empty_key() {
        assert_eq!(attr_key(""), "");
    }

    #[test]
    fn test_keys_only_use_allowed_characters() {
        for word in ["Ünïcödé", "rock'n'roll", "ABC123", "ß", "İ"] {
            let key = attr_key(word);
            assert!(
                key.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'),
                "{:?} -> {:?}",
                word,
                key
            );
        }
    }
}
