// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/?$").expect("valid trailing code pattern"));

/// Extract the trailing numeric path segment of a program detail link.
///
/// # Examples
/// ```
/// use catalog_crawler::utils::url::extract_program_code;
///
/// assert_eq!(
///     extract_program_code("https://www.universitaly.it/index.php/scheda/sua/1587043"),
///     Some("1587043".to_string())
/// );
/// ```
pub fn extract_program_code(href: &str) -> Option<String> {
    let trimmed = href.split(['?', '#']).next().unwrap_or(href);
    TRAILING_CODE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolve a potentially relative document link against the page it was read from.
pub fn resolve(base: &str, href: &str) -> crate::error::Result<String> {
    let base = url::Url::parse(base)?;
    Ok(base.join(href)?.to_string())
}
