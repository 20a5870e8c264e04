//! Sanitizers for administrator-supplied path settings.

use regex::Regex;
use std::sync::LazyLock;

/// Markup tags.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Percent-encoded octets.
static OCTET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").unwrap());

/// Whitespace runs.
static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Cleans free text into a single trimmed line.
///
/// Strips markup and stray angle brackets, removes percent-encoded octets
/// (repeatedly, so `%%4141` does not survive as `%41`), and collapses
/// control characters and whitespace runs into single spaces.
#[must_use]
pub fn sanitize_text_field(input: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(input, "");
    let mut text: String = without_tags
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    while OCTET_PATTERN.is_match(&text) {
        text = OCTET_PATTERN.replace_all(&text, "").into_owned();
    }

    WHITESPACE_PATTERN.replace_all(&text, " ").trim().to_string()
}

/// Normalizes a stored path setting such as a login slug or redirect target.
///
/// The result never starts or ends with `/` and never contains `?` or `#`.
/// An input that reduces to nothing yields the empty string.
#[must_use]
pub fn sanitize_path_setting(input: &str) -> String {
    let trimmed = input.trim_matches('/');
    let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
    let cleaned = sanitize_text_field(&trimmed[..end]);

    cleaned
        .trim_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}
