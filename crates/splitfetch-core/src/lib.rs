pub mod config;
pub mod logging;

pub mod control;
pub mod downloader;
pub mod error;
pub mod fetch_head;
pub mod progress;
pub mod retry;
pub mod segmenter;
pub mod storage;
pub mod url_model;

pub use control::CancelToken;
pub use downloader::{download_file, download_file_async, CurlOptions, DownloadOptions};
pub use error::{DownloadError, PlanError};
pub use fetch_head::ResourceDescriptor;
pub use progress::ProgressStats;
pub use retry::RetryPolicy;
pub use segmenter::{plan_ranges, ByteRange};
