//! Single-part HTTP Range GET, streamed into the part's staging file.

use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str;

use super::FetchContext;
use crate::control::CancelToken;
use crate::error::DownloadError;
use crate::retry::{run_with_retry, RetryFailure, SegmentError};
use crate::segmenter::ByteRange;
use crate::storage::PartStore;

/// Fetches one part with bounded retry. Returns the artifact path on success.
///
/// Storage failures are not retried and surface as `PartWriteFailed`;
/// cancellation surfaces as `ContextCancelled`; anything else that exhausts
/// the budget becomes `PartRetrievalFailed`.
pub(super) fn fetch_part(
    ctx: &FetchContext<'_>,
    range: &ByteRange,
    store: &PartStore,
    cancel: &CancelToken,
) -> Result<PathBuf, DownloadError> {
    let index = range.index;
    let result = run_with_retry(&ctx.retry, cancel, |attempt| {
        tracing::debug!(
            part = index,
            attempt,
            range = %range.range_header_value(),
            "requesting part"
        );
        download_one_part(ctx, range, store, cancel)
    });

    match result {
        Ok(()) => {
            tracing::debug!(part = index, bytes = range.len(), "part complete");
            Ok(store.part_path(index))
        }
        Err(RetryFailure {
            error: SegmentError::Cancelled,
            ..
        }) => Err(DownloadError::ContextCancelled),
        Err(RetryFailure {
            error: SegmentError::Storage(source),
            ..
        }) => Err(DownloadError::PartWriteFailed { index, source }),
        Err(RetryFailure { attempts, error }) => Err(DownloadError::PartRetrievalFailed {
            index,
            attempts,
            source: error,
        }),
    }
}

/// One attempt: GET with Range header, body written to the part artifact,
/// which is created (or truncated) when the first accepted body byte arrives.
/// Only 206, or 200 for a range starting at 0, is accepted, and the body must
/// be exactly `range.len()` bytes.
fn download_one_part(
    ctx: &FetchContext<'_>,
    range: &ByteRange,
    store: &PartStore,
    cancel: &CancelToken,
) -> Result<(), SegmentError> {
    let mut out: Option<BufWriter<File>> = None;
    let expected = range.len();
    let mut received = 0u64;
    let mut storage_error: Option<std::io::Error> = None;
    let mut range_ignored = false;
    let status: Cell<Option<u32>> = Cell::new(None);
    let content_range_start: Cell<Option<u64>> = Cell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(ctx.url).map_err(SegmentError::Curl)?;
    easy.follow_location(true).map_err(SegmentError::Curl)?;
    easy.connect_timeout(ctx.curl.connect_timeout)
        .map_err(SegmentError::Curl)?;
    // Abort stalled transfers instead of using a hard wall-clock timeout.
    easy.low_speed_limit(ctx.curl.low_speed_limit)
        .map_err(SegmentError::Curl)?;
    easy.low_speed_time(ctx.curl.low_speed_time)
        .map_err(SegmentError::Curl)?;
    easy.range(&range.curl_range()).map_err(SegmentError::Curl)?;
    easy.progress(true).map_err(SegmentError::Curl)?;

    let mut list = curl::easy::List::new();
    for (k, v) in ctx.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(SegmentError::Curl)?;
    }
    if !ctx.headers.is_empty() {
        easy.http_headers(list).map_err(SegmentError::Curl)?;
    }

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    let line = line.trim();
                    if line.starts_with("HTTP/") {
                        status.set(parse_status_line(line));
                        content_range_start.set(None);
                    } else if let Some((name, value)) = line.split_once(':') {
                        if name.trim().eq_ignore_ascii_case("content-range") {
                            content_range_start.set(parse_content_range_start(value));
                        }
                    }
                }
                true
            })
            .map_err(SegmentError::Curl)?;
        transfer
            .write_function(|data| {
                match status.get() {
                    Some(206) => {
                        if let Some(start) = content_range_start.get() {
                            if start != range.start {
                                range_ignored = true;
                                return Ok(0);
                            }
                        }
                    }
                    Some(200) if range.start == 0 => {}
                    Some(200) => {
                        range_ignored = true;
                        return Ok(0);
                    }
                    // Redirect or error bodies are discarded; the status decides.
                    _ => return Ok(data.len()),
                }
                if received + data.len() as u64 > expected {
                    range_ignored = true;
                    return Ok(0);
                }
                if out.is_none() {
                    match store.create_part(range.index) {
                        Ok(file) => out = Some(BufWriter::new(file)),
                        Err(e) => {
                            storage_error = Some(e);
                            return Ok(0);
                        }
                    }
                }
                if let Some(Err(e)) = out.as_mut().map(|w| w.write_all(data)) {
                    storage_error = Some(e);
                    return Ok(0);
                }
                received += data.len() as u64;
                Ok(data.len())
            })
            .map_err(SegmentError::Curl)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(SegmentError::Curl)?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if let Some(io_err) = storage_error {
            return Err(SegmentError::Storage(io_err));
        }
        if range_ignored {
            return Err(SegmentError::RangeIgnored {
                status: status.get().unwrap_or(0),
                expected,
            });
        }
        if e.is_aborted_by_callback() {
            return Err(SegmentError::Cancelled);
        }
        return Err(SegmentError::Curl(e));
    }

    let code = easy.response_code().map_err(SegmentError::Curl)?;
    if code != 200 && code != 206 {
        return Err(SegmentError::Http(code));
    }
    if received != expected {
        return Err(SegmentError::PartialTransfer { expected, received });
    }
    if let Some(mut w) = out {
        w.flush().map_err(SegmentError::Storage)?;
    }
    Ok(())
}

/// Status code from `HTTP/1.1 206 Partial Content` or `HTTP/2 206`.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// First byte offset from a `Content-Range: bytes 100-199/1000` value.
fn parse_content_range_start(value: &str) -> Option<u64> {
    let spec = value.trim().strip_prefix("bytes")?.trim_start();
    let (start, _) = spec.split_once('-')?;
    start.trim().parse().ok()
}
