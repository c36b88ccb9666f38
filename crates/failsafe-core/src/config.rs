use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Back-off and error-chain defaults for policies built from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries per outcome category that happen with no delay.
    pub initial_retries: u32,
    /// First non-zero back-off delay, in milliseconds.
    pub initial_delay_ms: u64,
    /// Back-off cap, in milliseconds.
    pub max_delay_ms: u64,
    /// Jitter as a fraction of each delay (0.0 to 1.0).
    pub jitter_factor: f64,
    /// Most earlier failures kept on the final error.
    pub max_exception_chain: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5_000,
            jitter_factor: 0.2,
            max_exception_chain: 10,
        }
    }
}

/// Settings for `failsafe run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Exit codes that trigger a retry. Empty means any non-zero code.
    pub retry_exit_codes: Vec<i32>,
    /// Retries after the first run.
    pub max_retries: u32,
    /// Overall time budget for all attempts, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            retry_exit_codes: Vec::new(),
            max_retries: 5,
            timeout_secs: None,
        }
    }
}

impl CommandConfig {
    pub fn should_retry(&self, code: i32) -> bool {
        if self.retry_exit_codes.is_empty() {
            code != 0
        } else {
            self.retry_exit_codes.contains(&code)
        }
    }
}

/// Global configuration loaded from `~/.config/failsafe/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailsafeConfig {
    pub retry: RetryConfig,
    pub command: CommandConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("failsafe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FailsafeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FailsafeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take defaults.
pub fn load_from_path(path: &Path) -> Result<FailsafeConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: FailsafeConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FailsafeConfig::default();
        assert_eq!(cfg.retry.initial_retries, 3);
        assert_eq!(cfg.retry.initial_delay_ms, 1);
        assert_eq!(cfg.retry.max_delay_ms, 5_000);
        assert_eq!(cfg.retry.max_exception_chain, 10);
        assert_eq!(cfg.command.max_retries, 5);
        assert!(cfg.command.timeout_secs.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FailsafeConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FailsafeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_sections_take_defaults() {
        let toml = r#"
            [retry]
            initial_retries = 0
            jitter_factor = 0.5

            [command]
            retry_exit_codes = [75, 111]
            timeout_secs = 30
        "#;
        let cfg: FailsafeConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry.initial_retries, 0);
        assert!((cfg.retry.jitter_factor - 0.5).abs() < 1e-9);
        assert_eq!(cfg.retry.max_delay_ms, 5_000);
        assert_eq!(cfg.command.retry_exit_codes, vec![75, 111]);
        assert_eq!(cfg.command.max_retries, 5);
        assert_eq!(cfg.command.timeout_secs, Some(30));
    }

    #[test]
    fn retry_exit_codes_filter() {
        let any = CommandConfig::default();
        assert!(any.should_retry(1));
        assert!(!any.should_retry(0));

        let listed = CommandConfig {
            retry_exit_codes: vec![75],
            ..CommandConfig::default()
        };
        assert!(listed.should_retry(75));
        assert!(!listed.should_retry(1));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retry]\nmax_exception_chain = 4\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.retry.max_exception_chain, 4);
        assert_eq!(cfg.command, CommandConfig::default());
    }

    #[test]
    fn load_from_path_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "retry = 3").unwrap();
        assert!(load_from_path(&path).is_err());
    }
}
