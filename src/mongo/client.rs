use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::retry::{RetryingInvoker, DEFAULT_MAX_RETRIES};
use super::shell::{CommandRunner, MongoShell};
use crate::config::ShardctlConfig;
use crate::error::{ErrorCode, Result, ShardctlError};
use crate::normalize::normalize_output;
use crate::report::{find_shard, parse_status_report, shard_properties};
use crate::report::{ShardProperties, StatusReport};
use crate::subprocess::ProcessRunner;

/// The expression whose output goes through the status report parser
pub const STATUS_COMMAND: &str = "sh.status()";

pub fn is_status_command(command: &str) -> bool {
    command.trim() == STATUS_COMMAND
}

/// Structured result of a shell command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Status(StatusReport),
    Document(Value),
}

/// Issues commands against one cluster endpoint and parses what comes back.
pub struct ClusterClient<R> {
    invoker: RetryingInvoker<R>,
    host: String,
    context: String,
    max_retries: u32,
}

impl ClusterClient<MongoShell> {
    /// Client that shells out to the configured `mongo` binary
    pub fn from_config(config: &ShardctlConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let shell = MongoShell::new(runner)
            .with_binary(config.mongo_binary.clone())
            .with_extra_args(config.extra_args.clone())
            .with_timeout(config.command_timeout);

        let invoker = RetryingInvoker::new(shell).with_initial_wait(config.initial_wait);

        Self::new(invoker, &config.host, &config.context).with_max_retries(config.max_retries)
    }
}

impl<R: CommandRunner> ClusterClient<R> {
    pub fn new(invoker: RetryingInvoker<R>, host: &str, context: &str) -> Self {
        Self {
            invoker,
            host: host.to_string(),
            context: context.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run any command; `sh.status()` yields a report, everything else JSON.
    pub async fn run(&self, command: &str) -> Result<CommandOutput> {
        let raw = self
            .invoker
            .invoke(command, &self.context, &self.host, self.max_retries)
            .await?;

        if is_status_command(command) {
            Ok(CommandOutput::Status(parse_status_report(&raw)))
        } else {
            normalize_output(&raw)
                .map(CommandOutput::Document)
                .map_err(|e| e.with_context(format!("output of {}", command)))
        }
    }

    pub async fn status(&self) -> Result<StatusReport> {
        let raw = self
            .invoker
            .invoke(STATUS_COMMAND, &self.context, &self.host, self.max_retries)
            .await?;
        Ok(parse_status_report(&raw))
    }

    /// Run a command whose output is expected to be a JSON document
    pub async fn eval_json(&self, command: &str) -> Result<Value> {
        match self.run(command).await? {
            CommandOutput::Document(value) => Ok(value),
            CommandOutput::Status(report) => Ok(serde_json::to_value(report)?),
        }
    }

    pub async fn shards(&self) -> Result<Vec<ShardProperties>> {
        Ok(shard_properties(&self.status().await?))
    }

    pub async fn shard(&self, name: &str) -> Result<Option<ShardProperties>> {
        Ok(find_shard(&self.status().await?, name))
    }
}

/// Check the `ok` flag of a command result document.
///
/// A missing flag, `0` or `false` is a failure carrying the document's
/// `errmsg`.
pub fn ensure_ok(result: &Value, operation: &str) -> Result<()> {
    let ok = match result.get("ok") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => {
            return Err(ShardctlError::command_failed(
                ErrorCode::COMMAND_MISSING_STATUS,
                format!("{} returned no ok field", operation),
                Some(operation.to_string()),
            ))
        }
    };

    if ok {
        return Ok(());
    }

    let errmsg = result
        .get("errmsg")
        .and_then(Value::as_str)
        .unwrap_or("no error message");
    Err(ShardctlError::command_failed(
        ErrorCode::COMMAND_NOT_OK,
        errmsg,
        Some(operation.to_string()),
    ))
}
