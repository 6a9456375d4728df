//! Error taxonomy for a chunked download.
//!
//! Every public entry point of the engine returns `DownloadError`. Per-attempt
//! failures of a single part are modelled separately as
//! [`SegmentError`](crate::retry::SegmentError) so the retry layer can
//! classify them before they are folded into one of these variants.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::retry::SegmentError;

/// Planner policy errors: inputs for which no valid range plan exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The remote resource reported a size of zero bytes.
    #[error("remote resource is empty (0 bytes)")]
    EmptyResource,
    /// A part count of zero was requested.
    #[error("part count must be at least 1")]
    ZeroParts,
}

/// Terminal outcome of a failed download. Exactly one of these is reported
/// per run, even when several parts fail concurrently.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HEAD probe could not be sent or the transport failed.
    #[error("metadata probe for {url} failed: {source}")]
    MetadataUnavailable {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// The HEAD probe completed with a non-success status.
    #[error("metadata probe for {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u32 },

    /// No usable `Content-Length` in the probe response.
    #[error("server did not report a usable Content-Length for {url}")]
    SizeUnknown { url: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The run-scoped staging directory for part artifacts could not be created.
    #[error("failed to create staging directory in {}: {source}", .path.display())]
    StagingFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A part exhausted its retry budget (or failed with a non-retryable error).
    #[error("part {index} failed after {attempts} attempt(s): {source}")]
    PartRetrievalFailed {
        index: usize,
        attempts: u32,
        #[source]
        source: SegmentError,
    },

    /// Writing a part artifact to local storage failed. Never retried.
    #[error("part {index} could not be written to disk: {source}")]
    PartWriteFailed {
        index: usize,
        #[source]
        source: io::Error,
    },

    /// The caller cancelled the run or its deadline passed.
    #[error("download cancelled or deadline exceeded")]
    ContextCancelled,

    /// Concatenating the part artifacts into the final file failed.
    #[error("failed to assemble {}: {source}", .path.display())]
    AssemblyFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    /// True for [`DownloadError::ContextCancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::ContextCancelled)
    }

    /// Part index (1-based) this error belongs to, if it is a per-part failure.
    pub fn part_index(&self) -> Option<usize> {
        match self {
            DownloadError::PartRetrievalFailed { index, .. }
            | DownloadError::PartWriteFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_index_only_for_part_errors() {
        let e = DownloadError::PartWriteFailed {
            index: 3,
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(e.part_index(), Some(3));
        assert_eq!(DownloadError::ContextCancelled.part_index(), None);
        assert!(DownloadError::ContextCancelled.is_cancelled());
    }

    #[test]
    fn plan_error_is_transparent() {
        let e: DownloadError = PlanError::EmptyResource.into();
        assert_eq!(e.to_string(), "remote resource is empty (0 bytes)");
    }

    #[test]
    fn retrieval_message_names_part_and_attempts() {
        let e = DownloadError::PartRetrievalFailed {
            index: 2,
            attempts: 3,
            source: SegmentError::Http(503),
        };
        assert_eq!(e.to_string(), "part 2 failed after 3 attempt(s): HTTP 503");
    }
}
