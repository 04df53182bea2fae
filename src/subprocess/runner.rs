use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};

use super::error::ProcessError;

/// One shell client invocation: the executable, its argv and an optional
/// deadline. Stdin is always closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render the command line for logs and error messages
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, shell_words::join(&self.args))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

/// Executes one external command to completion.
///
/// The child process is spawned, drained and reaped within a single call;
/// no handle outlives `run`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

/// [`ProcessRunner`] that spawns real processes on the tokio runtime.
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn spawn(command: &ProcessCommand) -> Result<tokio::process::Child, ProcessError> {
        tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out shell must not linger once the future is dropped
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| map_spawn_error(e, &command.program))
    }

    fn decode_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            return ExitStatus::Success;
        }
        if let Some(code) = status.code() {
            return ExitStatus::Error(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }
        ExitStatus::Error(1)
    }
}

fn map_spawn_error(error: std::io::Error, program: &str) -> ProcessError {
    if error.kind() == std::io::ErrorKind::NotFound {
        ProcessError::CommandNotFound(program.to_string())
    } else {
        ProcessError::Io(error)
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        let rendered = command.display();
        tracing::debug!("Executing subprocess: {}", rendered);

        let child = Self::spawn(&command)?;
        let output = match command.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    tracing::warn!("Subprocess timed out after {:?}: {}", limit, rendered);
                    ProcessError::Timeout(limit)
                })??,
            None => child.wait_with_output().await?,
        };

        let result = ProcessOutput {
            status: Self::decode_status(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        };

        match result.status {
            ExitStatus::Success => tracing::debug!(
                "Subprocess completed in {:?} ({} bytes of output)",
                result.duration,
                result.stdout.len()
            ),
            ExitStatus::Error(code) => {
                tracing::debug!("Subprocess exited with {} in {:?}", code, result.duration);
                if !result.stderr.is_empty() {
                    tracing::trace!("Stderr: {}", result.stderr);
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!("Subprocess terminated by signal {}: {}", signal, rendered)
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_arguments() {
        let command = ProcessCommand::new("mongo", ["--eval", "sh.addShard(\"rs0/h1:27018\")"]);

        let rendered = command.display();
        assert!(rendered.starts_with("mongo --eval "));
        assert!(rendered.contains("sh.addShard"));
        assert_eq!(ProcessCommand::new("mongo", Vec::<String>::new()).display(), "mongo");
    }

    #[test]
    fn test_with_timeout() {
        let command = ProcessCommand::new("mongo", ["--quiet"]);
        assert!(command.timeout.is_none());

        let command = command.with_timeout(Some(Duration::from_secs(30)));
        assert_eq!(command.timeout, Some(Duration::from_secs(30)));
        assert_eq!(command.args, vec!["--quiet"]);
    }

    #[test]
    fn test_map_spawn_error_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(
            map_spawn_error(err, "mongo"),
            ProcessError::CommandNotFound(ref p) if p == "mongo"
        ));

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(map_spawn_error(err, "mongo"), ProcessError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_decode_status() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(0);
        assert_eq!(TokioProcessRunner::decode_status(status), ExitStatus::Success);

        // Exit code 1
        let status = std::process::ExitStatus::from_raw(256);
        assert_eq!(TokioProcessRunner::decode_status(status), ExitStatus::Error(1));

        // SIGKILL
        let status = std::process::ExitStatus::from_raw(9);
        assert_eq!(TokioProcessRunner::decode_status(status), ExitStatus::Signal(9));
        assert_eq!(ExitStatus::Signal(9).code(), None);
    }
}
