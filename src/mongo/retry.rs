//! Exponential backoff for servers that are not accepting connections yet.
//!
//! The first wait is 2 seconds and every retry doubles it. A retry is allowed
//! while the wait about to be slept is at most `2^max_retries` seconds, so
//! `max_retries = 2` sleeps 2s and 4s and then gives up. The bound is checked
//! before sleeping; the cumulative wait can therefore exceed it.

use std::time::Duration;
use tokio::time::sleep;

use super::shell::CommandRunner;
use crate::error::{ErrorCode, Result, ShardctlError};

pub const DEFAULT_INITIAL_WAIT: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Backoff state for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    wait: Duration,
    limit: Duration,
    retries: u32,
}

impl RetryState {
    pub fn new(initial_wait: Duration, max_retries: u32) -> Self {
        let limit_secs = 2u64.checked_pow(max_retries).unwrap_or(u64::MAX);
        Self {
            wait: initial_wait,
            limit: Duration::from_secs(limit_secs),
            retries: 0,
        }
    }

    /// The wait to sleep before the next retry, or `None` once it would
    /// exceed the budget. Each call doubles the following wait.
    pub fn next_wait(&mut self) -> Option<Duration> {
        if self.wait > self.limit {
            return None;
        }
        let wait = self.wait;
        self.wait = self.wait.saturating_mul(2);
        self.retries += 1;
        Some(wait)
    }

    /// Retries granted so far
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// Outcome of a single attempt, as seen by the backoff loop.
#[derive(Debug)]
pub enum Attempt {
    Success(String),
    /// Server not ready; worth retrying while the budget lasts
    Retry(ShardctlError),
    Fatal(ShardctlError),
}

impl From<Result<String>> for Attempt {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(output) => Attempt::Success(output),
            Err(err) if err.is_retryable() => Attempt::Retry(err),
            Err(err) => Attempt::Fatal(err),
        }
    }
}

/// Progress line shown before each backoff sleep
fn wait_notice(wait: Duration) -> String {
    format!("Waiting {:?} for mongod to become available", wait)
}

/// Wraps a [`CommandRunner`] with bounded exponential backoff.
pub struct RetryingInvoker<R> {
    runner: R,
    initial_wait: Duration,
}

impl<R: CommandRunner> RetryingInvoker<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            initial_wait: DEFAULT_INITIAL_WAIT,
        }
    }

    pub fn with_initial_wait(mut self, initial_wait: Duration) -> Self {
        self.initial_wait = initial_wait;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `command` until it succeeds, fails for a reason other than the
    /// server not being ready, or the backoff budget runs out.
    pub async fn invoke(
        &self,
        command: &str,
        context: &str,
        host: &str,
        max_retries: u32,
    ) -> Result<String> {
        let mut state = RetryState::new(self.initial_wait, max_retries);

        loop {
            let result = self.runner.run_command(command, context, host).await;

            match Attempt::from(result) {
                Attempt::Success(output) => return Ok(output),
                Attempt::Fatal(err) => return Err(err),
                Attempt::Retry(err) => match state.next_wait() {
                    Some(wait) => {
                        tracing::info!("{}", wait_notice(wait));
                        sleep(wait).await;
                    }
                    None => {
                        tracing::error!(
                            "{} still unreachable after {} retries",
                            host,
                            state.retries()
                        );
                        return Err(ShardctlError::connection_with_code(
                            ErrorCode::CONNECTION_RETRIES_EXHAUSTED,
                            err.message(),
                            Some(host.to_string()),
                        )
                        .with_source(err));
                    }
                },
            }
        }
    }
}
