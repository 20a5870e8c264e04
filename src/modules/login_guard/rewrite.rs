//! Pure string rewriting for generated URLs and outbound messages.

use std::borrow::Cow;

/// Swaps the final path segment of `url` for `custom` when that segment is
/// exactly `legacy`. Query and fragment are preserved; anything else is
/// returned untouched.
#[must_use]
pub fn replace_login_segment<'a>(url: &'a str, legacy: &str, custom: &str) -> Cow<'a, str> {
    let path_end = url.find(['?', '#']).unwrap_or(url.len());
    let (path, tail) = url.split_at(path_end);
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);

    if &path[segment_start..] != legacy {
        return Cow::Borrowed(url);
    }

    Cow::Owned(format!("{}{custom}{tail}", &path[..segment_start]))
}

/// Replaces every occurrence of each of `legacy_urls` in `message` with
/// `custom_url`.
#[must_use]
pub fn replace_legacy_urls(message: &str, legacy_urls: &[String], custom_url: &str) -> String {
    legacy_urls
        .iter()
        .filter(|legacy| !legacy.is_empty())
        .fold(message.to_string(), |acc, legacy| {
            acc.replace(legacy.as_str(), custom_url)
        })
}
