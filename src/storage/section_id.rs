use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

/// Derives a section id from its display name.
///
/// Whitespace runs and hyphens become underscores, camel-case words are split
/// with underscores, and the result is lower-cased.
///
/// ```
/// use content_loader::storage::section_id_from_name;
///
/// assert_eq!(section_id_from_name("First section"), "first_section");
/// assert_eq!(section_id_from_name("ServiceDetails"), "service_details");
/// ```
#[must_use]
pub fn section_id_from_name(name: &str) -> String {
    let id = WHITESPACE.replace_all(name.trim(), "_");
    let id = ACRONYM_BOUNDARY.replace_all(&id, "${1}_${2}");
    let id = CAMEL_BOUNDARY.replace_all(&id, "${1}_${2}");
    id.replace('-', "_").to_lowercase()
}
