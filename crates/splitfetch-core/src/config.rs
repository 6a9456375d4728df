//! Configuration loaded from `~/.config/splitfetch/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::{CurlOptions, DownloadOptions, DEFAULT_PARTS};
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per part (including the first).
    pub max_attempts: u32,
    /// Delay unit in seconds; the wait after attempt k is k * delay_step_secs.
    pub delay_step_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_step_secs: 1.0,
        }
    }
}

/// Upper bound for `delay_step_secs`; larger (or infinite) values are clamped.
pub const MAX_DELAY_STEP: Duration = Duration::from_secs(3600);

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        // f64::max maps NaN to 0.0.
        let delay_step = Duration::try_from_secs_f64(self.delay_step_secs.max(0.0))
            .unwrap_or(MAX_DELAY_STEP)
            .min(MAX_DELAY_STEP);
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            delay_step,
        }
    }
}

/// Global configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitfetchConfig {
    /// Number of byte ranges fetched concurrently.
    pub parts: usize,
    /// Deadline for the whole download, in seconds.
    pub timeout_secs: u64,
    /// TCP connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Extra request headers sent with every request.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl Default for SplitfetchConfig {
    fn default() -> Self {
        Self {
            parts: DEFAULT_PARTS,
            timeout_secs: 300,
            connect_timeout_secs: 30,
            retry: None,
            headers: HashMap::new(),
        }
    }
}

impl SplitfetchConfig {
    /// Overall deadline for one download.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Engine options derived from this config.
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            parts: self.parts,
            retry: self.retry.clone().unwrap_or_default().policy(),
            curl: CurlOptions {
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                ..CurlOptions::default()
            },
            headers: self.headers.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("splitfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SplitfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SplitfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: SplitfetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
