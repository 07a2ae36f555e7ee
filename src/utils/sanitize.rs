// src/utils/sanitize.rs

//! Filesystem-safe path segments from scraped labels.

/// Characters rejected in a directory or file name segment.
pub const FORBIDDEN: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip every forbidden character from a scraped label.
///
/// Whitespace and all other punctuation are kept as-is, so distinct labels
/// stay distinct unless they differ only in forbidden characters.
///
/// # Examples
/// ```
/// use catalog_crawler::utils::sanitize;
///
/// assert_eq!(sanitize("Scienze: dati/AI?"), "Scienze datiAI");
/// ```
pub fn sanitize(label: &str) -> String {
    label.chars().filter(|c| !FORBIDDEN.contains(c)).collect()
}
