use crate::error::{ErrorCode, ShardctlError};
use std::time::Duration;

/// Failure to run the shell client at all, as opposed to the client
/// running and exiting non-zero.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Process timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessError> for ShardctlError {
    fn from(err: ProcessError) -> Self {
        let (code, command) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::EXEC_COMMAND_NOT_FOUND, Some(cmd.clone()))
            }
            ProcessError::Timeout(_) => (ErrorCode::EXEC_TIMEOUT, None),
            ProcessError::Io(_) => (ErrorCode::EXEC_SPAWN_FAILED, None),
        };

        ShardctlError::execution_with_code(code, err.to_string(), command).with_source(err)
    }
}
