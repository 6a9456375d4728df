//! Filename extraction from URL path.

use super::content_disposition::percent_decode;

/// Extracts the last non-empty path segment of `url`, percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or has no path segment
/// (e.g. `https://example.com/`). Query and fragment are ignored.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let decoded = percent_decode(segment);
    if decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/report.pdf").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn trailing_slash_uses_previous_segment() {
        assert_eq!(
            filename_from_url_path("https://example.com/releases/v1/").as_deref(),
            Some("v1")
        );
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
        assert_eq!(filename_from_url_path("not a url"), None);
    }

    #[test]
    fn query_and_encoding() {
        assert_eq!(
            filename_from_url_path("https://example.com/file.zip?token=abc#frag").as_deref(),
            Some("file.zip")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/my%20file.txt").as_deref(),
            Some("my file.txt")
        );
    }
}
