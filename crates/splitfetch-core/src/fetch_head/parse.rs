//! Parse HTTP response header lines into HeadResult.

/// Header values the probe cares about, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Parsed `Content-Length`; `None` if absent or not a non-negative integer.
    pub content_length: Option<u64>,
    /// `Some(true)` for `Accept-Ranges: bytes`, `Some(false)` for any other value.
    pub accept_ranges: Option<bool>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

/// Parse collected header lines into HeadResult.
///
/// With redirects curl reports the headers of every hop; parsing restarts at
/// each status line so only the final response is described.
pub fn parse_headers(lines: &[String]) -> HeadResult {
    let mut out = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = HeadResult::default();
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            out.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            out.accept_ranges = Some(value.eq_ignore_ascii_case("bytes"));
        } else if name.eq_ignore_ascii_case("content-type") {
            if !value.is_empty() {
                out.content_type = Some(value.to_string());
            }
        } else if name.eq_ignore_ascii_case("content-disposition") && !value.is_empty() {
            out.content_disposition = Some(value.to_string());
        }
    }

    out
}
