//! Chunked download engine.
//!
//! Probes the resource, plans N byte ranges, fetches them concurrently into a
//! run-scoped staging directory (each part with bounded retry) and, once every
//! part has succeeded, assembles them in index order into the output file.

mod run;
mod segment;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::control::CancelToken;
use crate::error::DownloadError;
use crate::fetch_head;
use crate::progress::ProgressStats;
use crate::retry::RetryPolicy;
use crate::segmenter::plan_ranges;
use crate::storage::{self, PartStore};
use crate::url_model::output_file_name;

/// Default number of parts.
pub const DEFAULT_PARTS: usize = 4;

/// Per-request curl settings shared by every part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort an attempt if throughput stays below this many bytes/s ...
    pub low_speed_limit: u32,
    /// ... for this long.
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// Everything the engine needs besides the URL, destination and cancel token.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Number of byte ranges to fetch concurrently.
    pub parts: usize,
    pub retry: RetryPolicy,
    pub curl: CurlOptions,
    /// Extra request headers sent with the probe and every part GET.
    pub headers: HashMap<String, String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            parts: DEFAULT_PARTS,
            retry: RetryPolicy::default(),
            curl: CurlOptions::default(),
            headers: HashMap::new(),
        }
    }
}

/// Shared, read-only inputs of every part fetch.
pub(crate) struct FetchContext<'a> {
    pub url: &'a str,
    pub headers: &'a HashMap<String, String>,
    pub retry: RetryPolicy,
    pub curl: CurlOptions,
}

/// Downloads `url` into `dest_dir` and returns the path of the output file.
///
/// Blocking: runs one OS thread per part. Either exactly one correctly sized
/// file appears in `dest_dir`, or none does and a single error is returned.
/// If several parts fail, the error of the lowest-index failing part is
/// reported; if `cancel` fired (explicitly or by deadline) the result is
/// [`DownloadError::ContextCancelled`].
///
/// Progress snapshots go to `progress_tx` as parts complete. Intermediate ones
/// are skipped if the channel is full, but the final snapshot waits for room,
/// so the receiver must be drained concurrently. Do not call this from inside
/// an async task; use [`download_file_async`] there.
pub fn download_file(
    url: &str,
    dest_dir: &Path,
    opts: &DownloadOptions,
    cancel: &CancelToken,
    progress_tx: Option<&tokio::sync::mpsc::Sender<ProgressStats>>,
) -> Result<PathBuf, DownloadError> {
    tracing::info!(url, dest = %dest_dir.display(), parts = opts.parts, "starting download");

    let descriptor = fetch_head::probe(
        url,
        &opts.headers,
        Some(opts.curl.connect_timeout),
        cancel,
    )?;
    let ranges = plan_ranges(descriptor.total_size, opts.parts)?;
    let final_path = dest_dir.join(output_file_name(url, &descriptor));
    tracing::debug!(
        total_size = descriptor.total_size,
        parts = ranges.len(),
        output = %final_path.display(),
        "planned ranges"
    );

    let store = PartStore::create_in(dest_dir).map_err(|source| DownloadError::StagingFailed {
        path: dest_dir.to_path_buf(),
        source,
    })?;
    let ctx = FetchContext {
        url,
        headers: &opts.headers,
        retry: opts.retry,
        curl: opts.curl,
    };

    let parts = run::fetch_all(&ctx, &ranges, &store, cancel, progress_tx, descriptor.total_size)?;
    if cancel.is_cancelled() {
        return Err(DownloadError::ContextCancelled);
    }
    storage::assemble(&parts, descriptor.total_size, &final_path)?;

    tracing::info!(url, path = %final_path.display(), bytes = descriptor.total_size, "download complete");
    Ok(final_path)
}

/// Runs [`download_file`] on tokio's blocking pool.
pub async fn download_file_async(
    url: String,
    dest_dir: PathBuf,
    opts: DownloadOptions,
    cancel: CancelToken,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
) -> Result<PathBuf, DownloadError> {
    let joined = tokio::task::spawn_blocking(move || {
        download_file(&url, &dest_dir, &opts, &cancel, progress_tx.as_ref())
    })
    .await;
    match joined {
        Ok(res) => res,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(DownloadError::ContextCancelled),
    }
}
