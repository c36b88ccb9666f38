//! `failsafe config` – show where settings and logs live.

use anyhow::Result;
use failsafe_core::config::{config_path, FailsafeConfig};
use failsafe_core::logging::log_path;

pub fn run_config(cfg: &FailsafeConfig) -> Result<()> {
    println!("config: {}", config_path()?.display());
    println!("log:    {}", log_path()?.display());
    println!();
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
