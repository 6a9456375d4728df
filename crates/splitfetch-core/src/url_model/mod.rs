//! Output file naming.
//!
//! Picks a base name from `Content-Disposition` or the URL's last path
//! segment (falling back to a random placeholder), sanitizes it for the local
//! filesystem and appends an extension inferred from `Content-Type`.

mod content_disposition;
mod mime;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use mime::extension_for_content_type;
pub use path::filename_from_url_path;
pub use sanitize::{sanitize_filename, NAME_MAX};

use crate::fetch_head::ResourceDescriptor;

/// Prefix of generated names when neither header nor URL yields one.
const PLACEHOLDER_PREFIX: &str = "download-";

/// Random, non-empty placeholder name (e.g. `download-3f9c0a1b2d4e5f60`).
pub fn placeholder_filename() -> String {
    format!("{}{:016x}", PLACEHOLDER_PREFIX, rand::random::<u64>())
}

/// Derives the base filename for a download.
///
/// Prefers the `filename` parameter of `content_disposition`, then the last
/// path segment of `url`, then a random placeholder. Never returns an empty
/// string or `.`/`..`.
pub fn derive_filename(url: &str, content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(parse_content_disposition_filename)
        .map(|name| sanitize_filename(&name))
        .filter(|name| is_usable(name))
        .or_else(|| {
            filename_from_url_path(url)
                .map(|name| sanitize_filename(&name))
                .filter(|name| is_usable(name))
        })
        .unwrap_or_else(placeholder_filename)
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}

/// Appends `.ext` unless `name` already ends with it (case-insensitive).
///
/// The stem is shortened when needed so the result never exceeds
/// [`NAME_MAX`] bytes.
pub fn with_extension(name: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) if !has_extension(name, ext) => {
            let room = NAME_MAX.saturating_sub(ext.len() + 1).max(1);
            format!("{}.{}", truncate_stem(name, room), ext)
        }
        _ => name.to_string(),
    }
}

/// Cuts `name` to at most `max` bytes on a char boundary, dropping trailing
/// dots and whitespace the cut may expose.
fn truncate_stem(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let cut = name[..end].trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if cut.is_empty() {
        &name[..end]
    } else {
        cut
    }
}

fn has_extension(name: &str, ext: &str) -> bool {
    let Some((stem, current)) = name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty() && current.eq_ignore_ascii_case(ext)
}

/// Final on-disk name for `url` given the probed descriptor.
pub fn output_file_name(url: &str, descriptor: &ResourceDescriptor) -> String {
    let base = derive_filename(url, descriptor.content_disposition.as_deref());
    let ext = descriptor
        .content_type
        .as_deref()
        .and_then(extension_for_content_type);
    with_extension(&base, ext)
}
