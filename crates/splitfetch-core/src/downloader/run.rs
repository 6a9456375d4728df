//! Fan-out/fan-in of part fetches.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use super::segment;
use super::FetchContext;
use crate::control::CancelToken;
use crate::error::DownloadError;
use crate::progress::ProgressStats;
use crate::segmenter::ByteRange;
use crate::storage::PartStore;

type PartOutcome = Result<PathBuf, DownloadError>;

/// Fetches every range on its own thread and waits for all of them.
///
/// Returns the artifact paths in range order, or a single error. When part
/// `i` fails, parts with a higher index are cancelled; lower ones keep
/// running, so the reported error is always the lowest failing index.
pub(super) fn fetch_all(
    ctx: &FetchContext<'_>,
    ranges: &[ByteRange],
    store: &PartStore,
    cancel: &CancelToken,
    progress_tx: Option<&tokio::sync::mpsc::Sender<ProgressStats>>,
    total_size: u64,
) -> Result<Vec<PathBuf>, DownloadError> {
    let count = ranges.len();
    let tokens: Vec<CancelToken> = ranges.iter().map(|_| cancel.child()).collect();
    let started = Instant::now();

    let outcomes: Vec<PartOutcome> = std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<(usize, PartOutcome)>();
        for (slot, range) in ranges.iter().enumerate() {
            let tx = tx.clone();
            let token = &tokens[slot];
            scope.spawn(move || {
                let res = segment::fetch_part(ctx, range, store, token);
                let _ = tx.send((slot, res));
            });
        }
        drop(tx);

        let mut outcomes: Vec<PartOutcome> = (0..count)
            .map(|_| Err(DownloadError::ContextCancelled))
            .collect();
        let mut bytes_done = 0u64;
        let mut parts_done = 0usize;
        // Ends once every worker has reported and dropped its sender.
        for (slot, res) in rx {
            match &res {
                Ok(_) => {
                    bytes_done += ranges[slot].len();
                    parts_done += 1;
                    if let Some(tx) = progress_tx {
                        let stats = ProgressStats {
                            bytes_done,
                            total_bytes: total_size,
                            elapsed_secs: started.elapsed().as_secs_f64(),
                            parts_done,
                            part_count: count,
                        };
                        // Intermediate snapshots may be dropped when the
                        // consumer lags; the final one always gets through.
                        if stats.is_complete() {
                            let _ = tx.blocking_send(stats);
                        } else {
                            let _ = tx.try_send(stats);
                        }
                    }
                }
                Err(e) if !e.is_cancelled() => {
                    tracing::warn!(part = ranges[slot].index, "part failed: {}", e);
                    for token in &tokens[slot + 1..] {
                        token.cancel();
                    }
                }
                Err(_) => {
                    tracing::debug!(part = ranges[slot].index, "part cancelled");
                }
            }
            outcomes[slot] = res;
        }
        outcomes
    });

    if outcomes.iter().all(Result::is_ok) {
        return Ok(outcomes.into_iter().flatten().collect());
    }
    if cancel.is_cancelled() {
        return Err(DownloadError::ContextCancelled);
    }
    outcomes
        .into_iter()
        .filter_map(Result::err)
        .find(|e| !e.is_cancelled())
        .map_or(Err(DownloadError::ContextCancelled), Err)
}
