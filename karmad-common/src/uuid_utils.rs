//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a madlib identifier: the lowercase hex form of a fresh UUIDv4's bytes
pub fn madlib_id() -> String {
    generate().simple().to_string()
}

/// True when `id` looks like an identifier produced by [`madlib_id`]
///
/// Identifiers become file names, so anything else is rejected before it
/// reaches the filesystem.
pub fn is_valid_madlib_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.bytes().all(|b| b.is_ascii_hexdigit())
}
