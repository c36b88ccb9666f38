//! CLI for the failsafe retry engine.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use failsafe_core::config::{self, FailsafeConfig, RetryConfig};

use commands::{run_command, run_config, run_delays};

/// Top-level CLI for failsafe.
#[derive(Debug, Parser)]
#[command(name = "failsafe")]
#[command(about = "failsafe: re-run a flaky command with Fibonacci back-off", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Back-off knobs shared by `run` and `delays`. Unset flags keep the config file values.
#[derive(Debug, Clone, Default, Args)]
pub struct BackoffArgs {
    /// Retries that happen immediately before back-off starts.
    #[arg(long, value_name = "N")]
    pub initial_retries: Option<u32>,
    /// First non-zero delay in milliseconds.
    #[arg(long, value_name = "MS")]
    pub initial_delay_ms: Option<u64>,
    /// Delay cap in milliseconds.
    #[arg(long, value_name = "MS")]
    pub max_delay_ms: Option<u64>,
    /// Jitter as a fraction of each delay (0.0 to 1.0).
    #[arg(long, value_name = "F")]
    pub jitter: Option<f64>,
}

impl BackoffArgs {
    pub fn apply(&self, retry: &mut RetryConfig) {
        if let Some(n) = self.initial_retries {
            retry.initial_retries = n;
        }
        if let Some(ms) = self.initial_delay_ms {
            retry.initial_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            retry.max_delay_ms = ms;
        }
        if let Some(f) = self.jitter {
            retry.jitter_factor = f;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a command, retrying it while it fails.
    Run {
        /// Retries after the first run, counting exit-code and spawn failures together.
        #[arg(long, value_name = "N")]
        max_retries: Option<u32>,
        /// Exit code that triggers a retry (repeatable). Default: any non-zero code.
        #[arg(long = "retry-exit-code", value_name = "CODE")]
        retry_exit_codes: Vec<i32>,
        /// Give up once this many seconds have passed since the first run.
        #[arg(long, value_name = "S")]
        timeout_secs: Option<u64>,
        #[command(flatten)]
        backoff: BackoffArgs,
        /// Program and arguments, after `--`.
        #[arg(last = true, required = true, value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Print the delay sequence the current settings produce.
    Delays {
        /// Number of delays to print.
        #[arg(long, default_value = "10", value_name = "N")]
        count: usize,
        #[command(flatten)]
        backoff: BackoffArgs,
    },

    /// Show config and log file locations and the effective config.
    Config,
}

impl CliCommand {
    /// Dispatch and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        cli.command.dispatch(cfg).await
    }

    async fn dispatch(self, mut cfg: FailsafeConfig) -> Result<i32> {
        match self {
            CliCommand::Run {
                max_retries,
                retry_exit_codes,
                timeout_secs,
                backoff,
                command,
            } => {
                backoff.apply(&mut cfg.retry);
                if let Some(n) = max_retries {
                    cfg.command.max_retries = n;
                }
                if !retry_exit_codes.is_empty() {
                    cfg.command.retry_exit_codes = retry_exit_codes;
                }
                if timeout_secs.is_some() {
                    cfg.command.timeout_secs = timeout_secs;
                }
                run_command(&cfg, command).await
            }
            CliCommand::Delays { count, backoff } => {
                backoff.apply(&mut cfg.retry);
                run_delays(&cfg.retry, count)?;
                Ok(0)
            }
            CliCommand::Config => {
                run_config(&cfg)?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
