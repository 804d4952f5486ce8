/// Canonical comparison key for an album title.
///
/// Trims both ends, lower-cases, and collapses every internal whitespace run
/// into a single space. The result is only ever compared, never displayed.
pub fn normalize_title(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
