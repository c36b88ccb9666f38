//! `failsafe run -- <program> [args...]` – re-run a command until it succeeds.

use anyhow::{Context, Result};
use failsafe_core::config::{CommandConfig, FailsafeConfig, RetryConfig};
use failsafe_core::predicate::{CountLimited, PartialPredicate};
use failsafe_core::{
    classify_io_error, deadline_in, Interrupt, Operation, RetryDecision, RetryError, RetryPolicy,
    WithDeadline,
};
use std::io;
use std::process::Command;
use std::time::Duration;

/// Exit code reported when Ctrl-C stopped the retry loop.
const EXIT_INTERRUPTED: i32 = 130;

/// One run of the child process. The output is its exit code; spawn failures are errors.
#[derive(Debug, Clone)]
pub struct CommandOperation {
    program: String,
    args: Vec<String>,
    attempt: u32,
}

impl CommandOperation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            attempt: 0,
        }
    }
}

impl Operation for CommandOperation {
    type Output = i32;
    type Error = io::Error;

    fn call(&mut self) -> io::Result<i32> {
        self.attempt += 1;
        tracing::info!(attempt = self.attempt, program = %self.program, "starting command");
        let status = Command::new(&self.program).args(&self.args).status()?;
        // Killed by a signal: no code, count it as a plain failure.
        Ok(status.code().unwrap_or(1))
    }
}

/// Spawn errors worth another try. Everything else (e.g. program not found) fails at once.
fn is_transient_spawn_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::OutOfMemory
    )
}

/// Retries a run that exited with a retryable code or failed to spawn transiently.
#[derive(Debug, Clone)]
struct RetryableRun {
    command: CommandConfig,
}

impl<C> PartialPredicate<i32, io::Error, C> for RetryableRun {
    fn decide(
        &mut self,
        outcome: &io::Result<i32>,
        _operation: &C,
    ) -> Option<RetryDecision<i32, io::Error, C>> {
        let retry = match outcome {
            Ok(code) => self.command.should_retry(*code),
            Err(e) => is_transient_spawn_error(e),
        };
        retry.then(RetryDecision::retry_default)
    }
}

/// Back-off category: the exit code, or the spawn error kind.
fn run_outcome_key(outcome: &io::Result<i32>) -> Result<i32, io::ErrorKind> {
    match outcome {
        Ok(code) => Ok(*code),
        Err(e) => Err(e.kind()),
    }
}

/// `max_retries` bounds exit-code and spawn-error retries together.
pub(crate) fn build_policy<C: 'static>(
    command: &CommandConfig,
    retry: &RetryConfig,
) -> Result<RetryPolicy<i32, io::Error, C>> {
    let rule = RetryableRun {
        command: command.clone(),
    };
    let max_retries = command.max_retries;
    let policy = RetryPolicy::builder()
        .with_config(retry)
        .with_partial_predicate(move || CountLimited::new(max_retries, rule.clone()))
        .with_delay_key(run_outcome_key)
        .build()?;
    Ok(policy)
}

async fn execute<C>(
    operation: C,
    cfg: &FailsafeConfig,
    interrupt: Interrupt,
) -> Result<Result<i32, RetryError<io::Error>>>
where
    C: Operation<Output = i32, Error = io::Error> + Send + 'static,
{
    let policy = build_policy::<C>(&cfg.command, &cfg.retry)?;
    tokio::task::spawn_blocking(move || {
        policy.call_interruptible(operation, &classify_io_error, &interrupt)
    })
    .await
    .context("retry task join")
}

pub async fn run_command(cfg: &FailsafeConfig, argv: Vec<String>) -> Result<i32> {
    let (program, args) = argv.split_first().context("no command given")?;
    let operation = CommandOperation::new(program.clone(), args.to_vec());

    let interrupt = Interrupt::new();
    let watcher = tokio::spawn({
        let interrupt = interrupt.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("ctrl-c received, stopping retries");
                interrupt.interrupt();
            }
        }
    });

    let deadline = cfg.command.timeout_secs.and_then(|secs| {
        let deadline = deadline_in(Duration::from_secs(secs));
        if deadline.is_none() {
            tracing::warn!(secs, "timeout too large to represent, running without one");
        }
        deadline
    });
    let outcome = match deadline {
        Some(deadline) => execute(WithDeadline::new(operation, deadline), cfg, interrupt).await,
        None => execute(operation, cfg, interrupt).await,
    };
    watcher.abort();

    match outcome? {
        Ok(code) => {
            tracing::info!(code, program = %program, "command finished");
            Ok(code)
        }
        Err(RetryError::Interrupted) => {
            eprintln!("failsafe: interrupted");
            Ok(EXIT_INTERRUPTED)
        }
        Err(err) => Err(err).with_context(|| format!("running {program}")),
    }
}
