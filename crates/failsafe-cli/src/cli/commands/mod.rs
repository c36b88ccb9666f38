//! CLI command handlers, one file per subcommand.

mod config;
mod delays;
mod run;

pub use config::run_config;
pub use delays::run_delays;
pub use run::run_command;
