//! `splitfetch config` – print config location and effective values.

use anyhow::Result;
use splitfetch_core::config::{self, SplitfetchConfig};

pub fn show_config(cfg: &SplitfetchConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
