//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to learn the total size and naming hints
//! (`Content-Type`, `Content-Disposition`) of the remote resource without
//! transferring the body.

mod parse;

pub use parse::{parse_headers, HeadResult};

use std::collections::HashMap;
use std::str;
use std::time::Duration;

use crate::control::CancelToken;
use crate::error::DownloadError;

/// Connect timeout used when the caller does not supply one.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Hard cap on the HEAD exchange itself.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// What the engine knows about the remote resource after the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Total size in bytes from `Content-Length`.
    pub total_size: u64,
    /// Raw `Content-Type` value, if the server sent one.
    pub content_type: Option<String>,
    /// Raw `Content-Disposition` value, if the server sent one.
    pub content_disposition: Option<String>,
    /// True if the server advertised `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

impl ResourceDescriptor {
    /// Validates parsed headers into a descriptor. Fails with `SizeUnknown`
    /// when no usable `Content-Length` was present.
    pub fn from_head(url: &str, head: HeadResult) -> Result<Self, DownloadError> {
        let total_size = head.content_length.ok_or_else(|| DownloadError::SizeUnknown {
            url: url.to_string(),
        })?;
        if head.content_type.is_none() {
            tracing::warn!(url, "Content-Type header is missing; no extension will be inferred");
        }
        if head.content_disposition.is_none() {
            tracing::debug!(url, "Content-Disposition header is missing; naming from URL");
        }
        if head.accept_ranges == Some(false) {
            tracing::warn!(url, "server advertises Accept-Ranges: none; range requests may be refused");
        }
        Ok(Self {
            total_size,
            content_type: head.content_type,
            content_disposition: head.content_disposition,
            accept_ranges: head.accept_ranges.unwrap_or(false),
        })
    }
}

/// Performs a HEAD request and returns the resource descriptor.
///
/// Follows redirects. Extra request headers are sent as-is. The probe runs in
/// the current thread and aborts once `cancel` fires.
pub fn probe(
    url: &str,
    custom_headers: &HashMap<String, String>,
    connect_timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<ResourceDescriptor, DownloadError> {
    if cancel.is_cancelled() {
        return Err(DownloadError::ContextCancelled);
    }
    let unavailable = |source: curl::Error| DownloadError::MetadataUnavailable {
        url: url.to_string(),
        source,
    };
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(unavailable)?;
    easy.nobody(true).map_err(unavailable)?; // HEAD request
    easy.follow_location(true).map_err(unavailable)?;
    easy.connect_timeout(connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
        .map_err(unavailable)?;
    easy.timeout(PROBE_TIMEOUT).map_err(unavailable)?;
    easy.progress(true).map_err(unavailable)?;

    let mut list = curl::easy::List::new();
    for (k, v) in custom_headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(unavailable)?;
    }
    if !custom_headers.is_empty() {
        easy.http_headers(list).map_err(unavailable)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(unavailable)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(unavailable)?;
        if let Err(e) = transfer.perform() {
            if e.is_aborted_by_callback() {
                return Err(DownloadError::ContextCancelled);
            }
            return Err(unavailable(e));
        }
    }

    let code = easy.response_code().map_err(unavailable)?;
    if !(200..300).contains(&code) {
        return Err(DownloadError::UnexpectedStatus {
            url: url.to_string(),
            status: code,
        });
    }

    let descriptor = ResourceDescriptor::from_head(url, parse_headers(&headers))?;
    tracing::debug!(
        url,
        total_size = descriptor.total_size,
        content_type = descriptor.content_type.as_deref().unwrap_or("-"),
        "probed remote resource"
    );
    Ok(descriptor)
}
