//! Byte range type and range planning.

use crate::error::PlanError;

/// One planned part: inclusive byte range `[start, end]` with a 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Part number, 1..=N. Assembly order follows this index.
    pub index: usize,
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by this range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false: planned ranges cover at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Range spec as libcurl expects it (`start-end`, no unit prefix).
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    /// Full HTTP header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// Builds the range plan for `total_size` bytes split into `parts` ranges.
///
/// Every range but the last spans `total_size / parts` bytes; the last one
/// absorbs the remainder. When `total_size < parts` the part count is clamped
/// to `total_size` so that no range is empty.
pub fn plan_ranges(total_size: u64, parts: usize) -> Result<Vec<ByteRange>, PlanError> {
    if total_size == 0 {
        return Err(PlanError::EmptyResource);
    }
    if parts == 0 {
        return Err(PlanError::ZeroParts);
    }

    let count = (parts as u64).min(total_size);
    if count < parts as u64 {
        tracing::debug!(
            total_size,
            requested = parts,
            clamped = count,
            "fewer bytes than parts; clamping part count"
        );
    }
    let base = total_size / count;

    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let start = i * base;
        let end = if i == count - 1 {
            total_size - 1
        } else {
            start + base - 1
        };
        out.push(ByteRange {
            index: i as usize + 1,
            start,
            end,
        });
    }

    Ok(out)
}
