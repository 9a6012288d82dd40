//! Title rewriting
//!
//! Applies the same fillings to a song's display title so exported files
//! are named after the rewritten song: "Amazing Grace" with `grace` filled
//! as "pizza" becomes `Amazing_Pizza`.

use crate::attr::attr_key;
use crate::word::split_affixes;
use karmad_common::Filling;

/// Rewrite `title` and join its words with `separator`
///
/// Blank fillings leave the word as it was. Affixes around a replaced word
/// are kept.
pub fn rewrite_title(title: &str, fillings: &[Filling], separator: &str) -> String {
    title
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| rewrite_token(token, fillings))
        .collect::<Vec<_>>()
        .join(separator)
}

fn rewrite_token(token: &str, fillings: &[Filling]) -> String {
    let affixes = split_affixes(token);
    let key = attr_key(&affixes.core_word);
    if key.is_empty() {
        return token.to_string();
    }

    match fillings
        .iter()
        .find(|f| f.base_word_key == key && !f.replace_with.trim().is_empty())
    {
        Some(filling) => format!(
            "{}{}{}",
            affixes.leading_quote,
            capitalize(filling.replace_with.trim()),
            affixes.trailing_punctuation
        ),
        None => token.to_string(),
    }
}

/// Uppercase the first letter, leave the rest alone
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
