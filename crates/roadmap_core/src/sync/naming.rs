//! Product name sanitization and storage key derivation.
//!
//! Sanitization is many-to-one: `"Mobile App"` and `"mobile-app"` share one
//! remote file. The display-name derivation is a best-effort inverse and
//! does not round-trip names that contained dashes or punctuation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Repository directory holding one JSON file per product.
pub const REMOTE_ROOT_DIR: &str = "scored-roadmaps";
/// Local slot holding the whole board.
pub const LOCAL_DATA_KEY: &str = "roadmap-data";
/// Prefix of per-product local cache slots.
pub const LOCAL_PRODUCT_KEY_PREFIX: &str = "roadmap-product-";

const REMOTE_FILE_EXTENSION: &str = ".json";

static NON_ALPHANUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid sanitize regex"));

/// Lowercases `name` and replaces every char outside `[A-Za-z0-9]` with `-`.
pub fn sanitize_product_name(name: &str) -> String {
    NON_ALPHANUMERIC_RE
        .replace_all(name, "-")
        .to_ascii_lowercase()
}

/// `scored-roadmaps/<sanitized>.json`
pub fn remote_product_path(name: &str) -> String {
    format!(
        "{REMOTE_ROOT_DIR}/{}{REMOTE_FILE_EXTENSION}",
        sanitize_product_name(name)
    )
}

/// `roadmap-product-<sanitized>`
pub fn local_product_key(name: &str) -> String {
    format!("{LOCAL_PRODUCT_KEY_PREFIX}{}", sanitize_product_name(name))
}

/// Derives a display name from a remote file name.
///
/// Returns `None` for anything that is not a `.json` file. Dashes become
/// spaces and the first character of each word is uppercased.
pub fn display_name_from_file(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(REMOTE_FILE_EXTENSION)?;
    let words: Vec<String> = stem.split('-').map(capitalize_first).collect();
    Some(words.join(" "))
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
