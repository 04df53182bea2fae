use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ErrorCode, Result, ShardctlError};
use crate::subprocess::{ExitStatus, ProcessCommand, ProcessRunner};

/// Text the shell prints while the server is not accepting connections yet.
static NOT_READY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)could(?:n't| not) connect to server").expect("Valid regex pattern")
});

/// Whether shell output says the server is not accepting connections yet
pub fn is_not_ready(output: &str) -> bool {
    NOT_READY.is_match(output)
}

/// Runs one shell expression against an admin context on a host endpoint.
///
/// A server that is still starting must surface as a connection error with
/// code [`ErrorCode::CONNECTION_NOT_READY`] so the invoker can retry it.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run_command(&self, expression: &str, context: &str, endpoint: &str) -> Result<String>;
}

/// [`CommandRunner`] backed by the `mongo` shell client.
#[derive(Clone)]
pub struct MongoShell {
    runner: Arc<dyn ProcessRunner>,
    binary: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl MongoShell {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            binary: "mongo".to_string(),
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn failure(
        expression: &str,
        endpoint: &str,
        status: &ExitStatus,
        stdout: &str,
        stderr: &str,
    ) -> ShardctlError {
        // The legacy shell reports connection failures on stdout
        let mut message = stderr.trim().to_string();
        if !stdout.trim().is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(stdout.trim());
        }
        if message.is_empty() {
            message = format!("{} exited with {:?}", expression, status);
        }

        if is_not_ready(&message) {
            return ShardctlError::connection_with_code(
                ErrorCode::CONNECTION_NOT_READY,
                message,
                Some(endpoint.to_string()),
            );
        }

        let code = match status {
            ExitStatus::Signal(_) => ErrorCode::EXEC_SIGNAL_RECEIVED,
            _ => ErrorCode::EXEC_SUBPROCESS_FAILED,
        };
        let err = ShardctlError::execution_with_code(code, message, Some(expression.to_string()));
        match status.code() {
            Some(code) => err.with_exit_code(code),
            None => err,
        }
    }
}

#[async_trait]
impl CommandRunner for MongoShell {
    async fn run_command(
        &self,
        expression: &str,
        context: &str,
        endpoint: &str,
    ) -> Result<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 6);
        args.push("--quiet".to_string());
        args.extend(self.extra_args.iter().cloned());
        args.extend(
            ["--host", endpoint, context, "--eval", expression].map(str::to_string),
        );
        let command = ProcessCommand::new(&self.binary, args).with_timeout(self.timeout);

        let output = self.runner.run(command).await?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(Self::failure(
                expression,
                endpoint,
                &output.status,
                &output.stdout,
                &output.stderr,
            ))
        }
    }
}
