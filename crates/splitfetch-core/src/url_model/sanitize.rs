//! Filesystem-safe filename sanitization.

/// Longest filename accepted by common filesystems (Linux NAME_MAX), in bytes.
pub const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename taken from a header or URL.
///
/// Path separators, NUL and control characters become `_` (runs collapse to
/// one), surrounding whitespace, dots and underscores are trimmed, and the
/// result is cut to 255 bytes on a character boundary. May return an empty
/// string; callers pick a fallback then.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char = matches!(c, '/' | '\\' | '\0') || c.is_control();
        if unsafe_char {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
