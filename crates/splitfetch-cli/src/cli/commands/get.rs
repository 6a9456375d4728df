//! `splitfetch get <url>` – chunked download of one file.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use splitfetch_core::config::SplitfetchConfig;
use splitfetch_core::{download_file_async, CancelToken, DownloadOptions, ProgressStats};

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Parsed `get` arguments; `None` means "use the config value".
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub url: String,
    pub dest: PathBuf,
    pub parts: Option<usize>,
    pub retries: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub headers: Vec<(String, String)>,
}

impl GetRequest {
    /// Config values with command-line overrides applied.
    pub fn options(&self, cfg: &SplitfetchConfig) -> (DownloadOptions, Duration) {
        let mut opts = cfg.download_options();
        if let Some(parts) = self.parts {
            opts.parts = parts;
        }
        if let Some(retries) = self.retries {
            opts.retry.max_attempts = retries.max(1);
        }
        for (name, value) in &self.headers {
            opts.headers.insert(name.clone(), value.clone());
        }
        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| cfg.timeout());
        (opts, timeout)
    }
}

/// Only absolute http(s) URLs are handed to the engine.
pub fn validate_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw).with_context(|| format!("invalid URL: {}", raw))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported URL scheme `{}` (expected http or https)", other),
    }
    if parsed.host_str().is_none() {
        bail!("URL has no host: {}", raw);
    }
    Ok(parsed)
}

pub async fn run_get(cfg: &SplitfetchConfig, req: GetRequest) -> Result<()> {
    let url = validate_url(&req.url)?;
    if !req.dest.is_dir() {
        bail!("destination is not a directory: {}", req.dest.display());
    }
    let (opts, timeout) = req.options(cfg);
    if opts.parts == 0 {
        bail!("--parts must be at least 1");
    }

    let token = CancelToken::with_timeout(timeout);
    let ctrl_c_token = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling download");
            ctrl_c_token.cancel();
        }
    });

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let progress_handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            let due = last_print
                .map(|t| now.duration_since(t).as_millis() as u64 >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            if due || stats.is_complete() {
                println!("{}", format_progress(&stats));
                last_print = Some(now);
            }
        }
    });

    println!(
        "Downloading {} in {} part(s) into {}",
        url,
        opts.parts,
        req.dest.display()
    );
    let result = download_file_async(
        url.to_string(),
        req.dest.clone(),
        opts,
        token,
        Some(progress_tx),
    )
    .await;
    ctrl_c.abort();
    let _ = progress_handle.await;

    let path = result.with_context(|| format!("download of {} failed", url))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn format_progress(stats: &ProgressStats) -> String {
    let done_mib = stats.bytes_done as f64 / 1_048_576.0;
    let total_mib = stats.total_bytes as f64 / 1_048_576.0;
    let rate_mib = stats.bytes_per_sec() / 1_048_576.0;
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "  [{}/{}] {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ETA {}",
        stats.parts_done,
        stats.part_count,
        done_mib,
        total_mib,
        stats.fraction() * 100.0,
        rate_mib,
        eta
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GetRequest {
        GetRequest {
            url: "https://example.com/a.iso".to_string(),
            dest: PathBuf::from("."),
            parts: None,
            retries: None,
            timeout_secs: None,
            headers: Vec::new(),
        }
    }

    #[test]
    fn config_values_used_without_overrides() {
        let cfg = SplitfetchConfig::default();
        let (opts, timeout) = request().options(&cfg);
        assert_eq!(opts.parts, 4);
        assert_eq!(opts.retry.max_attempts, 3);
        assert_eq!(timeout, Duration::from_secs(300));
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = SplitfetchConfig::default();
        cfg.headers
            .insert("User-Agent".to_string(), "cfg".to_string());
        let req = GetRequest {
            parts: Some(8),
            retries: Some(5),
            timeout_secs: Some(10),
            headers: vec![("User-Agent".to_string(), "cli".to_string())],
            ..request()
        };
        let (opts, timeout) = req.options(&cfg);
        assert_eq!(opts.parts, 8);
        assert_eq!(opts.retry.max_attempts, 5);
        assert_eq!(timeout, Duration::from_secs(10));
        assert_eq!(opts.headers.get("User-Agent").map(String::as_str), Some("cli"));
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("https://example.com/file.iso").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/x").is_ok());
        assert!(validate_url("ftp://example.com/file").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("/relative/path").is_err());
    }

    #[test]
    fn progress_line() {
        let stats = ProgressStats {
            bytes_done: 1_048_576,
            total_bytes: 2_097_152,
            elapsed_secs: 1.0,
            parts_done: 2,
            part_count: 4,
        };
        let line = format_progress(&stats);
        assert!(line.contains("[2/4]"), "{}", line);
        assert!(line.contains("1.0 / 2.0 MiB (50.0%)"), "{}", line);
        assert!(line.contains("ETA 1s"), "{}", line);
    }
}
